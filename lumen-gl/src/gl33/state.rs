//! Graphics state.

use gl::types::*;
use std::cell::{Cell, RefCell};
use std::error;
use std::ffi::CStr;
use std::fmt;
use std::marker::PhantomData;

// TLS synchronization barrier for `GLState`.
thread_local!(static TLS_ACQUIRE_GFX_STATE: RefCell<Option<()>> = RefCell::new(Some(())));

/// The graphics state.
///
/// This type represents the current state of the OpenGL context bound to the current thread. It
/// remembers the program in use so that activating the same program twice in a row issues a
/// single `glUseProgram`. The cache lives in a `Cell`: every program shares the state and
/// updates it without borrowing, so it never misses an activation or a deletion.
#[derive(Debug)]
pub(crate) struct GLState {
  _a: PhantomData<*const ()>, // !Send and !Sync

  // shader program; `None` when unknown
  current_program: Cell<Option<GLuint>>,

  vendor_name: Option<String>,
  renderer_name: Option<String>,
  gl_version: Option<String>,
  glsl_version: Option<String>,
}

impl GLState {
  /// Create a new `GLState`.
  ///
  /// > Note: keep in mind you can create only one per thread.
  pub(crate) fn new() -> Result<Self, StateQueryError> {
    TLS_ACQUIRE_GFX_STATE.with(|rc| {
      let mut inner = rc.borrow_mut();

      match *inner {
        Some(_) => {
          let state = Self::get_from_context()?;
          inner.take();
          Ok(state)
        }

        None => Err(StateQueryError::UnavailableGLState),
      }
    })
  }

  fn get_from_context() -> Result<Self, StateQueryError> {
    check_loaded()?;

    unsafe {
      let state = GLState {
        _a: PhantomData,
        current_program: Cell::new(Some(get_ctx_current_program())),
        vendor_name: get_string(gl::VENDOR),
        renderer_name: get_string(gl::RENDERER),
        gl_version: get_string(gl::VERSION),
        glsl_version: get_string(gl::SHADING_LANGUAGE_VERSION),
      };

      log::info!(
        "OpenGL {} on {} ({}), GLSL {}",
        state.gl_version.as_deref().unwrap_or("?"),
        state.renderer_name.as_deref().unwrap_or("?"),
        state.vendor_name.as_deref().unwrap_or("?"),
        state.glsl_version.as_deref().unwrap_or("?"),
      );

      Ok(state)
    }
  }

  pub(crate) unsafe fn use_program(&self, handle: GLuint) {
    if self.select_program(handle) {
      gl::UseProgram(handle);
    }
  }

  // Record `handle` as the program in use; `true` if the driver has to be told.
  fn select_program(&self, handle: GLuint) -> bool {
    if self.current_program.get() == Some(handle) {
      false
    } else {
      self.current_program.set(Some(handle));
      true
    }
  }

  // A deleted program stays in use until another one replaces it, but its name can be reused by
  // the next glCreateProgram; the cache must not match that new program.
  pub(crate) fn program_deleted(&self, handle: GLuint) {
    if self.current_program.get() == Some(handle) {
      self.current_program.set(None);
    }
  }
}

/// An error that might happen when the context is queried.
#[non_exhaustive]
#[derive(Debug)]
pub enum StateQueryError {
  /// The graphics state is unavailable.
  ///
  /// That occurs when a backend already exists on the current thread.
  UnavailableGLState,
  /// An OpenGL function the backend relies on was not loaded.
  ///
  /// The OpenGL function pointers must be loaded (`gl::load_with`) before creating the backend.
  UnloadedFunction(&'static str),
}

impl fmt::Display for StateQueryError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StateQueryError::UnavailableGLState => write!(f, "unavailable graphics state"),
      StateQueryError::UnloadedFunction(name) => write!(f, "OpenGL function {} not loaded", name),
    }
  }
}

impl error::Error for StateQueryError {}

fn check_loaded() -> Result<(), StateQueryError> {
  macro_rules! ensure_loaded {
    ($($f:ident),* $(,)?) => {
      $(
        if !gl::$f::is_loaded() {
          return Err(StateQueryError::UnloadedFunction(concat!("gl", stringify!($f))));
        }
      )*
    }
  }

  ensure_loaded!(
    GetIntegerv,
    GetString,
    CreateShader,
    CompileShader,
    CreateProgram,
    LinkProgram,
    UseProgram,
    GetActiveUniform,
    GetUniformLocation,
  );

  Ok(())
}

unsafe fn get_ctx_current_program() -> GLuint {
  let mut used = 0 as GLint;
  gl::GetIntegerv(gl::CURRENT_PROGRAM, &mut used);
  used as GLuint
}

unsafe fn get_string(name: GLenum) -> Option<String> {
  let s = gl::GetString(name);

  if s.is_null() {
    None
  } else {
    Some(
      CStr::from_ptr(s as *const _)
        .to_string_lossy()
        .into_owned(),
    )
  }
}
