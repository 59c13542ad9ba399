//! Shader API.
//!
//! A shader [`Program`] is made of two stages, a vertex shader and a fragment shader, linked
//! together. Programs are built through a [`ProgramBuilder`]:
//!
//! ```ignore
//! let mut program = context
//!   .new_shader_program()
//!   .from_paths_or_exit("shaders/vertex_phong.glsl", "shaders/fragment_blinn_phong.glsl");
//!
//! program.activate();
//! program.set_float("material.shininess", 12.8);
//! ```
//!
//! # Failures
//!
//! A stage that fails to compile is _not_ a build error: its log, path and source are written to
//! the builder’s diagnostic stream and it is simply not attached. The resulting program will
//! probably render garbage, but it exists. A program that fails to link is an error
//! ([`ProgramError::LinkFailed`]).
//!
//! Compiler and linker logs are bounded to [`INFO_LOG_LEN`] bytes.

mod program;
pub mod types;

pub use self::program::{BuiltProgram, Program, ProgramBuilder, BUILD_FAILURE_EXIT_CODE};

use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Maximum length, in bytes, of a compiler or linker log, terminating NUL included.
///
/// Longer logs are cut; at most `INFO_LOG_LEN - 1` bytes of text are kept.
pub const INFO_LOG_LEN: usize = 1024;

/// Cut a compiler or linker log so that it fits [`INFO_LOG_LEN`].
///
/// The cut happens on a character boundary and trailing NUL bytes are removed.
pub fn truncate_info_log(mut log: String) -> String {
  let max = INFO_LOG_LEN - 1;

  if log.len() > max {
    let mut end = max;
    while !log.is_char_boundary(end) {
      end -= 1;
    }

    log.truncate(end);
  }

  let trimmed = log.trim_end_matches('\0').len();
  log.truncate(trimmed);
  log
}

/// A shader stage type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StageType {
  /// Vertex shader.
  VertexShader,
  /// Fragment shader.
  FragmentShader,
}

impl fmt::Display for StageType {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageType::VertexShader => f.write_str("vertex shader"),
      StageType::FragmentShader => f.write_str("fragment shader"),
    }
  }
}

/// Errors that shader stages can emit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StageError {
  /// Occurs when a shader fails to compile. Contains the compiler log.
  CompilationFailed(StageType, String),
}

impl StageError {
  /// Shorthand for [`StageError::CompilationFailed`]; the log is cut to [`INFO_LOG_LEN`].
  pub fn compilation_failed(ty: StageType, log: impl Into<String>) -> Self {
    StageError::CompilationFailed(ty, truncate_info_log(log.into()))
  }

  /// Type of the stage that failed.
  pub fn stage_type(&self) -> StageType {
    match *self {
      StageError::CompilationFailed(ty, _) => ty,
    }
  }
}

impl fmt::Display for StageError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageError::CompilationFailed(ref ty, ref r) => write!(f, "{} compilation error: {}", ty, r),
    }
  }
}

impl error::Error for StageError {}

/// Errors that a [`Program`] can generate.
#[non_exhaustive]
#[derive(Debug)]
pub enum ProgramError {
  /// A shader source file could not be read.
  SourceUnreadable {
    /// Path of the file.
    path: PathBuf,
    /// Underlying I/O error.
    source: io::Error,
  },
  /// The backend could not allocate a program object.
  CreationFailed(String),
  /// Program link failed. You can inspect the reason by looking at the contained `String`.
  LinkFailed(String),
}

impl ProgramError {
  /// Shorthand for [`ProgramError::LinkFailed`]; the log is cut to [`INFO_LOG_LEN`].
  pub fn link_failed(log: impl Into<String>) -> Self {
    ProgramError::LinkFailed(truncate_info_log(log.into()))
  }
}

impl fmt::Display for ProgramError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ProgramError::SourceUnreadable {
        ref path,
        ref source,
      } => write!(f, "cannot read shader source {}: {}", path.display(), source),
      ProgramError::CreationFailed(ref s) => write!(f, "cannot create shader program: {}", s),
      ProgramError::LinkFailed(ref s) => write!(f, "shader program failed to link: {}", s),
    }
  }
}

impl error::Error for ProgramError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      ProgramError::SourceUnreadable { source, .. } => Some(source),
      _ => None,
    }
  }
}

/// Types a uniform can be declared with in the shading language.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UniformType {
  /// `int`.
  Int,
  /// `uint`.
  UInt,
  /// `float`.
  Float,
  /// `bool`.
  Bool,
  /// `ivec2`.
  IVec2,
  /// `ivec3`.
  IVec3,
  /// `ivec4`.
  IVec4,
  /// `vec2`.
  Vec2,
  /// `vec3`.
  Vec3,
  /// `vec4`.
  Vec4,
  /// `mat3`.
  M33,
  /// `mat4`.
  M44,
  /// `sampler2D`.
  Sampler2D,
  /// `sampler2DShadow`.
  Sampler2DShadow,
  /// `samplerCube`.
  Cubemap,
}

impl UniformType {
  /// Whether a value uploaded as `self` can be stored in a uniform declared as `declared`.
  ///
  /// Samplers are set with integers (texture units); booleans accept integer uploads too.
  pub fn accepts(self, declared: UniformType) -> bool {
    match (self, declared) {
      (a, b) if a == b => true,
      (UniformType::Int, UniformType::Sampler2D)
      | (UniformType::Int, UniformType::Sampler2DShadow)
      | (UniformType::Int, UniformType::Cubemap)
      | (UniformType::Int, UniformType::Bool) => true,
      _ => false,
    }
  }
}

impl fmt::Display for UniformType {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      UniformType::Int => f.write_str("int"),
      UniformType::UInt => f.write_str("uint"),
      UniformType::Float => f.write_str("float"),
      UniformType::Bool => f.write_str("bool"),
      UniformType::IVec2 => f.write_str("ivec2"),
      UniformType::IVec3 => f.write_str("ivec3"),
      UniformType::IVec4 => f.write_str("ivec4"),
      UniformType::Vec2 => f.write_str("vec2"),
      UniformType::Vec3 => f.write_str("vec3"),
      UniformType::Vec4 => f.write_str("vec4"),
      UniformType::M33 => f.write_str("mat3"),
      UniformType::M44 => f.write_str("mat4"),
      UniformType::Sampler2D => f.write_str("sampler2D"),
      UniformType::Sampler2DShadow => f.write_str("sampler2DShadow"),
      UniformType::Cubemap => f.write_str("samplerCube"),
    }
  }
}
