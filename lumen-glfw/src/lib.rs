//! [GLFW](https://crates.io/crates/glfw) backend for lumen.

#![deny(missing_docs)]

mod window;

pub use crate::window::{CursorMode, WindowDim, WindowOpt};

use gl::types::*;
use glfw::{self, Context as _, Glfw, InitError, SwapInterval, Window, WindowEvent, WindowMode};
use lumen::context::GraphicsContext;
pub use lumen_gl::gl33::StateQueryError;
use lumen_gl::GL33;
use std::{error, ffi::CStr, fmt, os::raw::c_void, ptr, sync::mpsc::Receiver};

/// Error that can be risen while creating a surface.
#[non_exhaustive]
#[derive(Debug)]
pub enum GlfwSurfaceError {
  /// Initialization of the surface went wrong.
  ///
  /// This variant exposes a **glfw** error for further information about what went wrong.
  InitError(InitError),

  /// Window creation failed.
  WindowCreationFailed,

  /// No primary monitor detected.
  NoPrimaryMonitor,

  /// No available video mode.
  NoVideoMode,

  /// The graphics state is not available.
  ///
  /// This error is generated when the initialization code is called on a thread on which the
  /// graphics state has already been acquired, or when OpenGL functions could not be loaded.
  GraphicsStateError(StateQueryError),
}

impl fmt::Display for GlfwSurfaceError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      GlfwSurfaceError::InitError(ref e) => write!(f, "initialization error: {}", e),
      GlfwSurfaceError::WindowCreationFailed => f.write_str("failed to create window"),
      GlfwSurfaceError::NoPrimaryMonitor => f.write_str("no primary monitor"),
      GlfwSurfaceError::NoVideoMode => f.write_str("no video mode"),
      GlfwSurfaceError::GraphicsStateError(ref e) => {
        write!(f, "failed to get graphics state: {}", e)
      }
    }
  }
}

impl From<InitError> for GlfwSurfaceError {
  fn from(e: InitError) -> Self {
    GlfwSurfaceError::InitError(e)
  }
}

impl From<StateQueryError> for GlfwSurfaceError {
  fn from(e: StateQueryError) -> Self {
    GlfwSurfaceError::GraphicsStateError(e)
  }
}

impl error::Error for GlfwSurfaceError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      GlfwSurfaceError::InitError(e) => Some(e),
      GlfwSurfaceError::GraphicsStateError(e) => Some(e),
      _ => None,
    }
  }
}

/// GLFW surface.
///
/// This type is a helper that exposes two important concepts: the GLFW event receiver that you can
/// use to poll events and the [`GL33Context`], which allows you to perform the rendering part.
#[derive(Debug)]
pub struct GlfwSurface {
  /// Wrapped GLFW events queue.
  pub events_rx: Receiver<(f64, WindowEvent)>,

  /// Wrapped lumen context.
  pub context: GL33Context,
}

impl GlfwSurface {
  /// Initialize GLFW and open a window with an OpenGL 3.3 core context.
  ///
  /// The context is made current on the calling thread, OpenGL functions are loaded and driver
  /// debug messages are forwarded to the log when the driver supports it.
  pub fn new_gl33(title: &str, win_opt: WindowOpt) -> Result<Self, GlfwSurfaceError> {
    let mut glfw = glfw::init(error_callback())?;

    // OpenGL hints
    glfw.window_hint(glfw::WindowHint::OpenGlProfile(
      glfw::OpenGlProfileHint::Core,
    ));
    glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
    glfw.window_hint(glfw::WindowHint::ContextVersionMajor(3));
    glfw.window_hint(glfw::WindowHint::ContextVersionMinor(3));
    glfw.window_hint(glfw::WindowHint::Samples(win_opt.num_samples()));

    let (mut window, events_rx) = create_window(&mut glfw, title, win_opt.dim())?;

    window.make_current();

    match win_opt.cursor_mode() {
      CursorMode::Visible => window.set_cursor_mode(glfw::CursorMode::Normal),
      CursorMode::Invisible => window.set_cursor_mode(glfw::CursorMode::Hidden),
      CursorMode::Disabled => window.set_cursor_mode(glfw::CursorMode::Disabled),
    }

    window.set_all_polling(true);

    if win_opt.vsync() {
      glfw.set_swap_interval(SwapInterval::Sync(1));
    } else {
      glfw.set_swap_interval(SwapInterval::None);
    }

    // init OpenGL
    gl::load_with(|s| window.get_proc_address(s) as *const c_void);
    enable_debug_output();

    let gl = GL33::new()?;
    let context = GL33Context { window, gl };
    let surface = GlfwSurface { events_rx, context };

    Ok(surface)
  }
}

// Failures surface as `InitError` or `WindowCreationFailed`; the callback only reports them.
#[cfg(not(feature = "fail-on-errors"))]
fn error_callback() -> Option<glfw::ErrorCallback<()>> {
  Some(glfw::Callback {
    f: on_glfw_error as fn(glfw::Error, String, &()),
    data: (),
  })
}

#[cfg(feature = "fail-on-errors")]
fn error_callback() -> Option<glfw::ErrorCallback<()>> {
  glfw::FAIL_ON_ERRORS
}

fn on_glfw_error(error: glfw::Error, description: String, _: &()) {
  log::error!("GLFW error ({:?}): {}", error, description);
}

fn create_window(
  glfw: &mut Glfw,
  title: &str,
  dim: &WindowDim,
) -> Result<(Window, Receiver<(f64, WindowEvent)>), GlfwSurfaceError> {
  match *dim {
    WindowDim::Windowed { width, height } => glfw
      .create_window(width, height, title, WindowMode::Windowed)
      .ok_or(GlfwSurfaceError::WindowCreationFailed),

    WindowDim::Fullscreen => glfw.with_primary_monitor(|glfw, monitor| {
      let monitor = monitor.ok_or(GlfwSurfaceError::NoPrimaryMonitor)?;
      let vmode = monitor
        .get_video_mode()
        .ok_or(GlfwSurfaceError::NoVideoMode)?;
      let (w, h) = (vmode.width, vmode.height);

      glfw
        .create_window(w, h, title, WindowMode::FullScreen(monitor))
        .ok_or(GlfwSurfaceError::WindowCreationFailed)
    }),

    WindowDim::FullscreenRestricted { width, height } => {
      glfw.with_primary_monitor(|glfw, monitor| {
        let monitor = monitor.ok_or(GlfwSurfaceError::NoPrimaryMonitor)?;

        glfw
          .create_window(width, height, title, WindowMode::FullScreen(monitor))
          .ok_or(GlfwSurfaceError::WindowCreationFailed)
      })
    }
  }
}

// Route driver messages to the log. GL_DEBUG_OUTPUT is core in 4.3 only; on 3.3 contexts it
// depends on KHR_debug, hence the check on the callback entry point.
fn enable_debug_output() {
  if !gl::DebugMessageCallback::is_loaded() {
    log::debug!("OpenGL debug output unavailable");
    return;
  }

  unsafe {
    gl::Enable(gl::DEBUG_OUTPUT);
    gl::DebugMessageCallback(Some(on_debug_message), ptr::null());
  }
}

extern "system" fn on_debug_message(
  _source: GLenum,
  gltype: GLenum,
  _id: GLuint,
  severity: GLenum,
  _length: GLsizei,
  message: *const GLchar,
  _user_param: *mut c_void,
) {
  if message.is_null() {
    return;
  }

  let msg = unsafe { CStr::from_ptr(message) }.to_string_lossy();

  if gltype == gl::DEBUG_TYPE_ERROR {
    log::error!(
      "GL CALLBACK: ** GL ERROR ** type = 0x{:x}, severity = 0x{:x}, message = {}",
      gltype,
      severity,
      msg
    );
  } else {
    let level = match severity {
      gl::DEBUG_SEVERITY_HIGH => log::Level::Warn,
      gl::DEBUG_SEVERITY_MEDIUM => log::Level::Info,
      gl::DEBUG_SEVERITY_NOTIFICATION => log::Level::Trace,
      _ => log::Level::Debug,
    };

    log::log!(
      level,
      "GL CALLBACK: type = 0x{:x}, severity = 0x{:x}, message = {}",
      gltype,
      severity,
      msg
    );
  }
}

/// Lumen OpenGL 3.3 context.
///
/// This type also re-exports the GLFW window, if you need access to it.
#[derive(Debug)]
pub struct GL33Context {
  /// Wrapped GLFW window.
  pub window: Window,

  /// OpenGL 3.3 state.
  gl: GL33,
}

impl GL33Context {
  /// Size of the back buffer, in pixels.
  pub fn framebuffer_size(&self) -> [u32; 2] {
    let (w, h) = self.window.get_framebuffer_size();
    [w.max(0) as u32, h.max(0) as u32]
  }
}

unsafe impl GraphicsContext for GL33Context {
  type Backend = GL33;

  fn backend(&mut self) -> &mut Self::Backend {
    &mut self.gl
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn glfw_errors_are_reported_without_unwinding() {
    on_glfw_error(glfw::Error::PlatformError, "no display".to_owned(), &());
  }

  #[cfg(not(feature = "fail-on-errors"))]
  #[test]
  fn default_callback_reports_errors() {
    let callback = error_callback().map(|cb| cb.f as usize);
    assert_eq!(callback, Some(on_glfw_error as fn(glfw::Error, String, &()) as usize));
  }

  #[test]
  fn surface_errors_keep_their_cause() {
    let err = GlfwSurfaceError::from(StateQueryError::UnavailableGLState);
    assert!(error::Error::source(&err).is_some());
    assert_eq!(GlfwSurfaceError::WindowCreationFailed.to_string(), "failed to create window");
  }
}
