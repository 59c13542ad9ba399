//! Shader backend interface.
//!
//! This interface defines the low-level API shader stages and programs must implement to be
//! usable.

use crate::shader::{ProgramError, StageError, StageType, UniformType};

/// An active uniform, as reflected by a linked program.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UniformSlot {
  /// Location of the uniform in the program.
  pub location: i32,
  /// Type the uniform was declared with in the sources.
  pub ty: UniformType,
}

/// Shader stages and programs.
///
/// # Unsafety
///
/// Implementors must ensure that the representations they hand out stay valid until the matching
/// `destroy_*` function is called, and that uploads through [`Uniformable`] target the program
/// last passed to [`Shader::use_program`].
pub unsafe trait Shader {
  /// Representation of a compiled shader stage.
  type StageRepr;

  /// Representation of a shader program.
  type ProgramRepr;

  /// Create and compile a stage of the given type.
  ///
  /// On failure, the backend must release whatever it allocated and return the compiler log in
  /// [`StageError::CompilationFailed`].
  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError>;

  /// Release a stage.
  ///
  /// Stages attached to a program can be released before the program is: the program keeps them
  /// alive as long as it needs them.
  unsafe fn destroy_stage(stage: &mut Self::StageRepr);

  /// Create an empty program object.
  unsafe fn new_program(&mut self) -> Result<Self::ProgramRepr, ProgramError>;

  /// Attach a compiled stage to a program.
  unsafe fn attach_stage(program: &mut Self::ProgramRepr, stage: &Self::StageRepr);

  /// Link a program, returning the linker log on failure.
  unsafe fn link_program(program: &mut Self::ProgramRepr) -> Result<(), ProgramError>;

  /// Release a program.
  unsafe fn destroy_program(program: &mut Self::ProgramRepr);

  /// Opaque handle of the program, as given by the driver.
  unsafe fn program_handle(program: &Self::ProgramRepr) -> u32;

  /// Make the program the current one for subsequent uploads and draws.
  unsafe fn use_program(program: &Self::ProgramRepr);

  /// Look up an active uniform by name.
  ///
  /// Returns `None` if the linked program has no active uniform with that name.
  unsafe fn ask_uniform(program: &Self::ProgramRepr, name: &str) -> Option<UniformSlot>;
}

/// Types that can be uploaded as uniforms by a backend.
pub unsafe trait Uniformable<T>: Shader {
  /// Uniform type `T` maps to.
  unsafe fn ty() -> UniformType;

  /// Upload `value` at `location` in the currently used program.
  unsafe fn update(program: &Self::ProgramRepr, location: i32, value: T);
}
