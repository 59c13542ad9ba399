//! Window options.

/// How big the window is, and whether it covers the primary monitor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WindowDim {
  /// A regular window of the given size.
  Windowed {
    /// Width of the window.
    width: u32,
    /// Height of the window.
    height: u32,
  },
  /// Fullscreen on the primary monitor, at its current video mode.
  Fullscreen,
  /// Fullscreen on the primary monitor, at the given resolution.
  FullscreenRestricted {
    /// Width of the window.
    width: u32,
    /// Height of the window.
    height: u32,
  },
}

/// What happens to the cursor over the window.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CursorMode {
  /// Shown.
  Visible,
  /// Hidden while over the window.
  Invisible,
  /// Hidden and locked to the window.
  Disabled,
}

/// Options used when opening a window.
///
/// Built from [`WindowOpt::default`] and adjusted with the `set_*` methods.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WindowOpt {
  dim: WindowDim,
  cursor_mode: CursorMode,
  num_samples: Option<u32>,
  vsync: bool,
}

impl Default for WindowOpt {
  /// Defaults:
  ///
  /// - `dim` set to `WindowDim::Windowed { width: 1280, height: 720 }`.
  /// - `cursor_mode` set to `CursorMode::Visible`.
  /// - `num_samples` set to `None`.
  /// - `vsync` set to `true`.
  fn default() -> Self {
    WindowOpt {
      dim: WindowDim::Windowed {
        width: 1280,
        height: 720,
      },
      cursor_mode: CursorMode::Visible,
      num_samples: None,
      vsync: true,
    }
  }
}

impl WindowOpt {
  /// Set the dimension of the window.
  #[inline]
  pub fn set_dim(self, dim: WindowDim) -> Self {
    WindowOpt { dim, ..self }
  }

  /// Get the dimension of the window.
  #[inline]
  pub fn dim(&self) -> &WindowDim {
    &self.dim
  }

  /// Hide, unhide or disable the cursor. Default to `CursorMode::Visible`.
  #[inline]
  pub fn set_cursor_mode(self, mode: CursorMode) -> Self {
    WindowOpt {
      cursor_mode: mode,
      ..self
    }
  }

  /// Get the cursor mode.
  #[inline]
  pub fn cursor_mode(&self) -> CursorMode {
    self.cursor_mode
  }

  /// Set the number of samples to use for multisampling.
  ///
  /// Pass `None` to disable multisampling.
  #[inline]
  pub fn set_num_samples<S>(self, samples: S) -> Self
  where
    S: Into<Option<u32>>,
  {
    WindowOpt {
      num_samples: samples.into(),
      ..self
    }
  }

  /// Get the number of samples to use in multisampling, if any.
  #[inline]
  pub fn num_samples(&self) -> Option<u32> {
    self.num_samples
  }

  /// Synchronize buffer swaps with the monitor refresh rate.
  #[inline]
  pub fn set_vsync(self, vsync: bool) -> Self {
    WindowOpt { vsync, ..self }
  }

  /// Whether buffer swaps are synchronized with the monitor.
  #[inline]
  pub fn vsync(&self) -> bool {
    self.vsync
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let opt = WindowOpt::default();

    assert_eq!(
      opt.dim(),
      &WindowDim::Windowed {
        width: 1280,
        height: 720
      }
    );
    assert_eq!(opt.cursor_mode(), CursorMode::Visible);
    assert_eq!(opt.num_samples(), None);
    assert!(opt.vsync());
  }

  #[test]
  fn setters_only_touch_their_option() {
    let opt = WindowOpt::default()
      .set_num_samples(4)
      .set_vsync(false)
      .set_dim(WindowDim::Fullscreen);

    assert_eq!(opt.num_samples(), Some(4));
    assert!(!opt.vsync());
    assert_eq!(opt.dim(), &WindowDim::Fullscreen);
    assert_eq!(opt.cursor_mode(), CursorMode::Visible);

    let opt = opt.set_num_samples(None);
    assert_eq!(opt.num_samples(), None);
    assert_eq!(opt.dim(), &WindowDim::Fullscreen);
  }
}
