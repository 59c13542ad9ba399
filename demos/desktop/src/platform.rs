//! Platform services implementation.

use crate::ResolvedOpts;
use lumen::mesh::{Mesh, MeshError};
use lumen_demos::{Features, PlatformServices};
use std::{error::Error, fmt, path::PathBuf};

/// Desktop implementation of the [`PlatformServices`] API.
///
/// Resources are read eagerly, when the step is picked, so that a missing asset is reported before
/// any window is opened.
#[derive(Debug)]
pub struct DesktopPlatformServices {
  shader_root: PathBuf,
  mesh: Option<Mesh>,
}

impl DesktopPlatformServices {
  pub fn new(opts: &ResolvedOpts, features: &Features) -> Result<Self, DesktopFetchError> {
    let shader_root = opts.shaders.clone();

    for name in features.shaders() {
      let path = shader_root.join(name);
      if !path.is_file() {
        // not fatal here: building the program reports it with the full context
        log::warn!("shader source {} not found", path.display());
      }
    }

    let mesh = if features.needs_mesh() {
      let path = opts.assets.join(&opts.mesh);
      log::info!("loading mesh {}", path.display());

      let mesh = Mesh::load(&path).map_err(|source| DesktopFetchError::Mesh { path, source })?;
      log::info!(
        "{} triangles, {} bytes of vertex data",
        mesh.triangle_count(),
        mesh.byte_len()
      );

      Some(mesh)
    } else {
      None
    };

    Ok(Self { shader_root, mesh })
  }
}

#[derive(Debug)]
pub enum DesktopFetchError {
  /// The step asked for the mesh without declaring it in its features.
  UndeclaredMesh,
  Mesh { path: PathBuf, source: MeshError },
}

impl fmt::Display for DesktopFetchError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      DesktopFetchError::UndeclaredMesh => f.write_str("mesh requested but not declared"),
      DesktopFetchError::Mesh { ref path, ref source } => {
        write!(f, "cannot fetch mesh {}: {}", path.display(), source)
      }
    }
  }
}

impl Error for DesktopFetchError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      DesktopFetchError::Mesh { ref source, .. } => Some(source),
      _ => None,
    }
  }
}

impl PlatformServices for DesktopPlatformServices {
  type FetchError = DesktopFetchError;

  fn shader_path(&self, name: &str) -> PathBuf {
    self.shader_root.join(name)
  }

  fn fetch_mesh(&mut self) -> Result<&Mesh, Self::FetchError> {
    self.mesh.as_ref().ok_or(DesktopFetchError::UndeclaredMesh)
  }
}
