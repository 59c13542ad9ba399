//! Lumen tutorial steps.
//!
//! This crate provides the steps of a small OpenGL tutorial: a triangle, a cube, a Blinn-Phong lit
//! scene, the same scene with shadows, and with a post-processing pass. Steps are independent
//! from each other: each one owns its geometry, its shaders and its draw code. Only a handful of
//! helpers (vertex arrays, materials, the interactive controls) live in a shared module.
//!
//! # Step architecture
//!
//! Steps do not depend on any platform-specific concepts, such as system events or system window
//! capacities. Whenever a step requires user interaction, an abstract [`InputAction`] is used,
//! which the platform code running the step produces from its own events. Files (shaders and
//! meshes) are located through [`PlatformServices`].
//!
//! # Error handling
//!
//! Shader programs are built with [`ProgramBuilder::from_paths_or_exit`]: a program that doesn’t
//! link terminates the process after its log has been printed. A missing or malformed mesh is
//! reported as an error to the platform code through [`Example::bootstrap`].
//!
//! [`ProgramBuilder::from_paths_or_exit`]: lumen::shader::ProgramBuilder::from_paths_or_exit

use lumen::context::GraphicsContext;
use lumen::mesh::Mesh;
use lumen_gl::GL33;
use std::error::Error;
use std::path::PathBuf;

pub mod cube;
pub mod hello_triangle;
pub mod phong;
pub mod post_process;
pub mod shadow;
mod shared;

/// Platform services.
///
/// Steps use these to locate their resources, whatever the platform they run on.
pub trait PlatformServices {
  /// Error that can occur while fetching a resource.
  type FetchError: Error + 'static;

  /// Path of the shader source called `name`.
  fn shader_path(&self, name: &str) -> PathBuf;

  /// The mesh of the scene.
  ///
  /// Only available if the step asked for it in its [`Features`].
  fn fetch_mesh(&mut self) -> Result<&Mesh, Self::FetchError>;
}

/// Resources a step needs.
///
/// Platforms read them before bootstrapping a step, so that missing files are detected before
/// any window shows up.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Features {
  shaders: Vec<String>,
  mesh: bool,
}

impl Features {
  /// No resource needed.
  pub fn none() -> Self {
    Self::default()
  }

  /// Require a shader source.
  pub fn shader(mut self, name: impl Into<String>) -> Self {
    self.shaders.push(name.into());
    self
  }

  /// Require the scene mesh.
  pub fn mesh(self) -> Self {
    Features { mesh: true, ..self }
  }

  /// Shader sources required.
  pub fn shaders(&self) -> &[String] {
    &self.shaders
  }

  /// Whether the scene mesh is required.
  pub fn needs_mesh(&self) -> bool {
    self.mesh
  }
}

/// Tutorial step interface.
pub trait Example: Sized {
  /// Resources used by the step.
  fn features() -> Features;

  /// Bootstrap the step.
  ///
  /// The OpenGL context is current when this is called.
  fn bootstrap<P>(
    platform: &mut P,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> Result<Self, P::FetchError>
  where
    P: PlatformServices;

  /// Render a frame of the step.
  fn render_frame(
    self,
    time: f32,
    actions: impl Iterator<Item = InputAction>,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> LoopFeedback<Self>;
}

/// A type used to pass “inputs” to steps.
#[derive(Clone, Debug, PartialEq)]
pub enum InputAction {
  /// Quit the application.
  Quit,

  /// Main action. Typically used to switch an effect on and off or to cycle through it.
  MainToggle,

  /// Auxiliary action. Switches what the directional actions move (camera or light).
  AuxiliaryToggle,

  /// Put the tweakable parameters back to their initial values.
  Reset,

  /// Up direction.
  Up,

  /// Down direction.
  Down,

  /// Left direction.
  Left,

  /// Right direction.
  Right,

  /// Forward direction.
  Forward,

  /// Backward direction.
  Backward,

  /// Vertical scrolling.
  VScroll { amount: f32 },

  /// Framebuffer size changed.
  Resized { width: u32, height: u32 },
}

/// What to do after a frame.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum LoopFeedback<T> {
  /// Keep going with the updated step.
  Continue(T),
  /// Stop the loop.
  Exit,
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::path::Path;

  fn all_features() -> Vec<(&'static str, Features)> {
    vec![
      ("hello-triangle", hello_triangle::LocalExample::features()),
      ("cube", cube::LocalExample::features()),
      ("phong", phong::LocalExample::features()),
      ("shadow", shadow::LocalExample::features()),
      ("post-process", post_process::LocalExample::features()),
    ]
  }

  #[test]
  fn every_required_shader_ships_with_the_crate() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders");

    for (step, features) in all_features() {
      assert!(!features.shaders().is_empty(), "{} uses no shader", step);

      for name in features.shaders() {
        let path = root.join(name);
        assert!(path.is_file(), "{}: missing {}", step, path.display());
      }
    }
  }

  #[test]
  fn only_lit_steps_need_the_mesh() {
    let needing: Vec<_> = all_features()
      .into_iter()
      .filter(|(_, features)| features.needs_mesh())
      .map(|(step, _)| step)
      .collect();

    assert_eq!(needing, vec!["phong", "shadow", "post-process"]);
  }

  #[test]
  fn features_accumulate() {
    let features = Features::none().shader("a.glsl").shader("b.glsl");

    assert_eq!(features.shaders(), ["a.glsl".to_owned(), "b.glsl".to_owned()]);
    assert!(!features.needs_mesh());
    assert!(features.mesh().needs_mesh());
  }
}
