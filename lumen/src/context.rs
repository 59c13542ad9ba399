//! Graphics context.
//!
//! A graphics context is an object that abstracts all the low-level operations that happen on a
//! graphics device. This crate doesn’t create contexts; windowing crates do.
//!
//! # On context and threads
//!
//!   - An object which type implements [`GraphicsContext`] must be `!Send` and `!Sync`: graphics
//!     contexts are bound to the thread that created them.
//!   - Only a single context can exist per thread. Backends enforce it when they are created.
//!   - Every shader build, uniform upload and draw happens on that thread, inside the render loop.

use crate::backend::shader::Shader;
use crate::shader::ProgramBuilder;

/// Class of graphics context.
///
/// Such a context must not be Send nor Sync, which means that you cannot share it between
/// threads in any way (move / borrow).
pub unsafe trait GraphicsContext {
  /// Backend used by this context.
  type Backend: ?Sized;

  /// Access the underlying backend.
  fn backend(&mut self) -> &mut Self::Backend;

  /// Start building a new shader program.
  fn new_shader_program(&mut self) -> ProgramBuilder<'_, Self>
  where
    Self::Backend: Shader,
  {
    ProgramBuilder::new(self)
  }
}
