//! Shader programs and how to build them.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use crate::backend::shader::{Shader, UniformSlot, Uniformable};
use crate::context::GraphicsContext;
use crate::shader::types::{Mat44, Vec3};
use crate::shader::{ProgramError, StageError, StageType};

/// Exit status of the process when [`ProgramBuilder::from_paths_or_exit`] gives up.
pub const BUILD_FAILURE_EXIT_CODE: i32 = 1;

// A compiled stage. Released when dropped; linked programs keep their own reference.
struct Stage<S>
where
  S: ?Sized + Shader,
{
  repr: S::StageRepr,
}

impl<S> Stage<S>
where
  S: ?Sized + Shader,
{
  fn new(backend: &mut S, ty: StageType, src: &str) -> Result<Self, StageError> {
    unsafe { backend.new_stage(ty, src).map(|repr| Stage { repr }) }
  }
}

impl<S> Drop for Stage<S>
where
  S: ?Sized + Shader,
{
  fn drop(&mut self) {
    unsafe { S::destroy_stage(&mut self.repr) }
  }
}

// A shader source along with where it was read from.
struct Source {
  origin: String,
  text: String,
}

/// A built program with potential warnings.
///
/// Warnings are the stages that failed to compile and were left out of the program.
pub struct BuiltProgram<S>
where
  S: ?Sized + Shader,
{
  /// Built program.
  pub program: Program<S>,
  /// Stages that didn’t make it into the program.
  pub warnings: Vec<StageError>,
}

impl<S> BuiltProgram<S>
where
  S: ?Sized + Shader,
{
  /// Get the program and ignore the warnings.
  pub fn ignore_warnings(self) -> Program<S> {
    self.program
  }
}

/// Program builder.
///
/// Obtained with [`GraphicsContext::new_shader_program`]. Diagnostics (compiler logs, offending
/// sources, linker logs) go to stderr unless another sink is given with
/// [`ProgramBuilder::diagnostics`].
pub struct ProgramBuilder<'a, C>
where
  C: ?Sized,
{
  ctx: &'a mut C,
  diagnostics: Box<dyn Write + 'a>,
}

impl<'a, C> ProgramBuilder<'a, C>
where
  C: ?Sized + GraphicsContext,
  C::Backend: Shader,
{
  /// Create a builder writing its diagnostics to stderr.
  pub fn new(ctx: &'a mut C) -> Self {
    ProgramBuilder {
      ctx,
      diagnostics: Box::new(io::stderr()),
    }
  }

  /// Write diagnostics to `diagnostics` instead of stderr.
  pub fn diagnostics<W>(self, diagnostics: W) -> Self
  where
    W: Write + 'a,
  {
    ProgramBuilder {
      ctx: self.ctx,
      diagnostics: Box::new(diagnostics),
    }
  }

  /// Build a program from a vertex shader file and a fragment shader file.
  ///
  /// Both files are read entirely before anything is compiled. A stage that doesn’t compile is
  /// reported and skipped; see [`BuiltProgram::warnings`].
  pub fn from_paths<V, F>(
    mut self,
    vertex: V,
    fragment: F,
  ) -> Result<BuiltProgram<C::Backend>, ProgramError>
  where
    V: AsRef<Path>,
    F: AsRef<Path>,
  {
    let vertex = self.read(vertex.as_ref())?;
    let fragment = self.read(fragment.as_ref())?;
    self.build(&vertex, &fragment)
  }

  /// Build a program from in-memory sources.
  pub fn from_strings<V, F>(
    mut self,
    vertex: V,
    fragment: F,
  ) -> Result<BuiltProgram<C::Backend>, ProgramError>
  where
    V: Into<String>,
    F: Into<String>,
  {
    let vertex = Source {
      origin: "<vertex source>".to_owned(),
      text: vertex.into(),
    };
    let fragment = Source {
      origin: "<fragment source>".to_owned(),
      text: fragment.into(),
    };

    self.build(&vertex, &fragment)
  }

  /// Same as [`ProgramBuilder::from_paths`], but terminates the process if the program cannot be
  /// built.
  ///
  /// The linker log has already been written to the diagnostic stream at that point. The exit
  /// status is [`BUILD_FAILURE_EXIT_CODE`].
  pub fn from_paths_or_exit<V, F>(self, vertex: V, fragment: F) -> Program<C::Backend>
  where
    V: AsRef<Path>,
    F: AsRef<Path>,
  {
    match self.from_paths(vertex, fragment) {
      Ok(built) => built.ignore_warnings(),
      Err(err) => {
        log::error!("{}", err);
        process::exit(BUILD_FAILURE_EXIT_CODE);
      }
    }
  }

  fn read(&mut self, path: &Path) -> Result<Source, ProgramError> {
    match fs::read_to_string(path) {
      Ok(text) => Ok(Source {
        origin: path.display().to_string(),
        text,
      }),

      Err(source) => {
        let err = ProgramError::SourceUnreadable {
          path: path.to_owned(),
          source,
        };
        self.report(&format!("{}\n", err));
        Err(err)
      }
    }
  }

  fn build(
    &mut self,
    vertex: &Source,
    fragment: &Source,
  ) -> Result<BuiltProgram<C::Backend>, ProgramError> {
    let mut warnings = Vec::new();
    let vs = self.compile(StageType::VertexShader, vertex, &mut warnings);
    let fs = self.compile(StageType::FragmentShader, fragment, &mut warnings);

    let repr = unsafe { self.ctx.backend().new_program()? };
    let mut program = Program::from_repr(repr);

    for stage in vs.iter().chain(fs.iter()) {
      unsafe { <C::Backend as Shader>::attach_stage(&mut program.repr, &stage.repr) };
    }

    let linked = unsafe { <C::Backend as Shader>::link_program(&mut program.repr) };
    if let Err(err) = linked {
      if let ProgramError::LinkFailed(ref log) = err {
        self.report(&format!(
          "{}\n** shader link error: {} + {} **\n",
          log.trim_end(),
          vertex.origin,
          fragment.origin
        ));
      }

      return Err(err);
    }

    log::debug!(
      "linked shader program {} from {} and {}",
      program.handle(),
      vertex.origin,
      fragment.origin
    );

    Ok(BuiltProgram { program, warnings })
  }

  fn compile(
    &mut self,
    ty: StageType,
    source: &Source,
    warnings: &mut Vec<StageError>,
  ) -> Option<Stage<C::Backend>> {
    match Stage::new(self.ctx.backend(), ty, &source.text) {
      Ok(stage) => Some(stage),

      Err(err) => {
        let StageError::CompilationFailed(_, ref log) = err;

        self.report(&format!(
          "{}\n** shader error: {}: {} **\n{}\n",
          log.trim_end(),
          ty,
          source.origin,
          source.text
        ));
        warnings.push(err);

        None
      }
    }
  }

  fn report(&mut self, text: &str) {
    let written = self
      .diagnostics
      .write_all(text.as_bytes())
      .and_then(|_| self.diagnostics.flush());

    if let Err(err) = written {
      log::warn!("cannot write shader diagnostics: {}", err);
    }
  }
}

// Resolution of a uniform name, cached for the lifetime of the program.
struct CachedUniform {
  slot: Option<UniformSlot>,
  mismatch_reported: bool,
}

/// A linked shader program.
///
/// The GPU object is released when the program is dropped.
///
/// Uniforms are addressed by name. The first upload to a given name resolves it against the
/// linked program; later uploads reuse that resolution. Uploading to a name the program doesn’t
/// declare (or optimized away) does nothing.
///
/// Uploads target the program currently in use, so [`Program::activate`] must be called first.
pub struct Program<S>
where
  S: ?Sized + Shader,
{
  repr: S::ProgramRepr,
  uniforms: HashMap<String, CachedUniform>,
}

impl<S> Drop for Program<S>
where
  S: ?Sized + Shader,
{
  fn drop(&mut self) {
    unsafe { S::destroy_program(&mut self.repr) }
  }
}

impl<S> Program<S>
where
  S: ?Sized + Shader,
{
  fn from_repr(repr: S::ProgramRepr) -> Self {
    Program {
      repr,
      uniforms: HashMap::new(),
    }
  }

  /// Opaque handle of the program.
  pub fn handle(&self) -> u32 {
    unsafe { S::program_handle(&self.repr) }
  }

  /// Use this program for the next uniform uploads and draw calls.
  pub fn activate(&self) {
    unsafe { S::use_program(&self.repr) }
  }

  /// Upload a value to the uniform called `name`.
  ///
  /// Unknown names are ignored. If the uniform exists with a type that cannot hold `T`, a warning
  /// is logged the first time and the upload is skipped.
  pub fn set<T>(&mut self, name: &str, value: T)
  where
    S: Uniformable<T>,
  {
    if let Some(slot) = self.resolve::<T>(name) {
      unsafe { <S as Uniformable<T>>::update(&self.repr, slot.location, value) }
    }
  }

  /// Upload a 4×4 matrix.
  pub fn set_mat4(&mut self, name: &str, value: impl Into<[[f32; 4]; 4]>)
  where
    S: Uniformable<Mat44<f32>>,
  {
    self.set(name, Mat44(value.into()))
  }

  /// Upload a 3 dimensional vector.
  pub fn set_vec3(&mut self, name: &str, value: impl Into<[f32; 3]>)
  where
    S: Uniformable<Vec3<f32>>,
  {
    self.set(name, Vec3(value.into()))
  }

  /// Upload a scalar.
  pub fn set_float(&mut self, name: &str, value: f32)
  where
    S: Uniformable<f32>,
  {
    self.set(name, value)
  }

  /// Upload an integer; this is also how samplers get their texture unit.
  pub fn set_int(&mut self, name: &str, value: i32)
  where
    S: Uniformable<i32>,
  {
    self.set(name, value)
  }

  fn resolve<T>(&mut self, name: &str) -> Option<UniformSlot>
  where
    S: Uniformable<T>,
  {
    if !self.uniforms.contains_key(name) {
      let slot = unsafe { S::ask_uniform(&self.repr, name) };
      self.uniforms.insert(
        name.to_owned(),
        CachedUniform {
          slot,
          mismatch_reported: false,
        },
      );
    }

    let cached = self.uniforms.get_mut(name)?;
    let slot = cached.slot?;
    let requested = unsafe { <S as Uniformable<T>>::ty() };

    if requested.accepts(slot.ty) {
      Some(slot)
    } else {
      if !cached.mismatch_reported {
        log::warn!(
          "uniform {} is declared as {} but {} values are uploaded to it; ignoring",
          name,
          slot.ty,
          requested
        );
        cached.mismatch_reported = true;
      }

      None
    }
  }
}
