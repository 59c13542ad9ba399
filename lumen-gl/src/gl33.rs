//! OpenGL 3.3 backend.
//!
//! This module implements an OpenGL 3.3 backend for lumen. The backend type is [`GL33`].

mod shader;
mod state;

pub use self::shader::{Program, Stage};
pub use self::state::StateQueryError;
use self::state::GLState;
use std::rc::Rc;

/// An OpenGL 3.3 backend.
///
/// This type is to be used as a lumen backend type. Only one can exist per thread, and the OpenGL
/// context must be current on that thread for as long as the backend lives.
#[derive(Debug)]
pub struct GL33 {
  state: Rc<GLState>,
}

impl GL33 {
  /// Create a new OpenGL 3.3 backend.
  pub fn new() -> Result<Self, StateQueryError> {
    GLState::new().map(|state| GL33 {
      state: Rc::new(state),
    })
  }
}
