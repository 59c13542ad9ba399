use crate::gl33::state::GLState;
use crate::gl33::GL33;
use gl::{self, types::*};
use lumen::{
  backend::shader::{Shader, UniformSlot, Uniformable},
  shader::{
    types::{Mat33, Mat44, Vec2, Vec3, Vec4},
    ProgramError, StageError, StageType, UniformType, INFO_LOG_LEN,
  },
};
use std::{
  ffi::CString,
  ptr::{null, null_mut},
  rc::Rc,
};

/// A compiled OpenGL shader object.
#[derive(Debug)]
pub struct Stage {
  handle: GLuint,
}

/// An OpenGL program object.
#[derive(Debug)]
pub struct Program {
  handle: GLuint,
  state: Rc<GLState>,
}

unsafe impl Shader for GL33 {
  type StageRepr = Stage;

  type ProgramRepr = Program;

  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError> {
    let c_src = CString::new(src.as_bytes())
      .map_err(|e| {
        StageError::compilation_failed(ty, format!("source contains a NUL byte: {}", e))
      })?;

    let handle = gl::CreateShader(opengl_shader_type(ty));

    if handle == 0 {
      return Err(StageError::compilation_failed(
        ty,
        "unable to create shader stage",
      ));
    }

    gl::ShaderSource(handle, 1, [c_src.as_ptr()].as_ptr(), null());
    gl::CompileShader(handle);

    let mut compiled: GLint = gl::FALSE.into();
    gl::GetShaderiv(handle, gl::COMPILE_STATUS, &mut compiled);

    if compiled == gl::TRUE.into() {
      Ok(Stage { handle })
    } else {
      let log = info_log(|len, written, buf| gl::GetShaderInfoLog(handle, len, written, buf));
      gl::DeleteShader(handle);

      Err(StageError::compilation_failed(ty, log))
    }
  }

  unsafe fn destroy_stage(stage: &mut Self::StageRepr) {
    gl::DeleteShader(stage.handle);
  }

  unsafe fn new_program(&mut self) -> Result<Self::ProgramRepr, ProgramError> {
    let handle = gl::CreateProgram();

    if handle == 0 {
      return Err(ProgramError::CreationFailed(
        "glCreateProgram returned 0".to_owned(),
      ));
    }

    Ok(Program {
      handle,
      state: self.state.clone(),
    })
  }

  unsafe fn attach_stage(program: &mut Self::ProgramRepr, stage: &Self::StageRepr) {
    gl::AttachShader(program.handle, stage.handle);
  }

  unsafe fn link_program(program: &mut Self::ProgramRepr) -> Result<(), ProgramError> {
    let handle = program.handle;

    gl::LinkProgram(handle);

    let mut linked: GLint = gl::FALSE.into();
    gl::GetProgramiv(handle, gl::LINK_STATUS, &mut linked);

    if linked == gl::TRUE.into() {
      Ok(())
    } else {
      let log = info_log(|len, written, buf| gl::GetProgramInfoLog(handle, len, written, buf));
      Err(ProgramError::link_failed(log))
    }
  }

  unsafe fn destroy_program(program: &mut Self::ProgramRepr) {
    gl::DeleteProgram(program.handle);
    program.state.program_deleted(program.handle);
  }

  unsafe fn program_handle(program: &Self::ProgramRepr) -> u32 {
    program.handle
  }

  unsafe fn use_program(program: &Self::ProgramRepr) {
    program.state.use_program(program.handle);
  }

  unsafe fn ask_uniform(program: &Self::ProgramRepr, name: &str) -> Option<UniformSlot> {
    let c_name = CString::new(name.as_bytes()).ok()?;
    let location = gl::GetUniformLocation(program.handle, c_name.as_ptr() as *const GLchar);

    // inactive or not declared at all
    if location < 0 {
      return None;
    }

    let glty = active_uniform_type(program.handle, &c_name)?;

    match uniform_type_from_gl(glty) {
      Some(ty) => Some(UniformSlot { location, ty }),
      None => {
        log::debug!(
          "uniform {} has an unsupported OpenGL type (0x{:x})",
          name,
          glty
        );
        None
      }
    }
  }
}

fn opengl_shader_type(t: StageType) -> GLenum {
  match t {
    StageType::VertexShader => gl::VERTEX_SHADER,
    StageType::FragmentShader => gl::FRAGMENT_SHADER,
  }
}

// Read an info log through one of the glGet*InfoLog functions, bounded to INFO_LOG_LEN.
unsafe fn info_log(get: impl FnOnce(GLsizei, *mut GLsizei, *mut GLchar)) -> String {
  let mut log = vec![0u8; INFO_LOG_LEN];
  let mut written: GLsizei = 0;

  get(
    INFO_LOG_LEN as GLsizei,
    &mut written,
    log.as_mut_ptr() as *mut GLchar,
  );

  log.truncate(written.max(0) as usize);
  String::from_utf8_lossy(&log).into_owned()
}

unsafe fn active_uniform_type(program: GLuint, c_name: &CString) -> Option<GLenum> {
  let mut index = gl::INVALID_INDEX;
  gl::GetUniformIndices(
    program,
    1,
    [c_name.as_ptr() as *const GLchar].as_ptr(),
    &mut index,
  );

  if index == gl::INVALID_INDEX {
    return None;
  }

  // only the type is needed; the name is not read back
  let mut size: GLint = 0;
  let mut glty: GLenum = 0;
  let mut name = [0 as GLchar; 1];
  gl::GetActiveUniform(
    program,
    index,
    1,
    null_mut(),
    &mut size,
    &mut glty,
    name.as_mut_ptr(),
  );

  Some(glty)
}

fn uniform_type_from_gl(glty: GLenum) -> Option<UniformType> {
  // helper macro mapping OpenGL type tokens to uniform types
  macro_rules! milkcheck {
    ($( ( $v:tt, $t:tt ) ),* $(,)?) => {
      match glty {
        $(
          gl::$t => Some(UniformType::$v),
        )*

        _ => None,
      }
    }
  }

  milkcheck!(
    // scalars
    (Int, INT),
    (UInt, UNSIGNED_INT),
    (Float, FLOAT),
    (Bool, BOOL),
    // vectors
    (IVec2, INT_VEC2),
    (IVec3, INT_VEC3),
    (IVec4, INT_VEC4),
    (Vec2, FLOAT_VEC2),
    (Vec3, FLOAT_VEC3),
    (Vec4, FLOAT_VEC4),
    // matrices
    (M33, FLOAT_MAT3),
    (M44, FLOAT_MAT4),
    // textures
    (Sampler2D, SAMPLER_2D),
    (Sampler2DShadow, SAMPLER_2D_SHADOW),
    (Cubemap, SAMPLER_CUBE),
  )
}

macro_rules! impl_Uniformable {
  (vec $t:ty, $uty:tt, $f:tt) => {
    unsafe impl Uniformable<$t> for GL33 {
      unsafe fn ty() -> UniformType {
        UniformType::$uty
      }

      unsafe fn update(_: &Program, location: i32, value: $t) {
        gl::$f(location, 1, value.as_ptr());
      }
    }
  };

  (mat $t:ty, $uty:tt, $f:tt) => {
    unsafe impl Uniformable<$t> for GL33 {
      unsafe fn ty() -> UniformType {
        UniformType::$uty
      }

      unsafe fn update(_: &Program, location: i32, value: $t) {
        gl::$f(location, 1, gl::FALSE, value.as_ptr() as _);
      }
    }
  };

  ($t:ty, $uty:tt, $f:tt) => {
    unsafe impl Uniformable<$t> for GL33 {
      unsafe fn ty() -> UniformType {
        UniformType::$uty
      }

      unsafe fn update(_: &Program, location: i32, value: $t) {
        gl::$f(location, value);
      }
    }
  };
}

impl_Uniformable!(i32, Int, Uniform1i);
impl_Uniformable!(vec Vec2<i32>, IVec2, Uniform2iv);
impl_Uniformable!(vec Vec3<i32>, IVec3, Uniform3iv);
impl_Uniformable!(vec Vec4<i32>, IVec4, Uniform4iv);

impl_Uniformable!(u32, UInt, Uniform1ui);

impl_Uniformable!(f32, Float, Uniform1f);
impl_Uniformable!(vec Vec2<f32>, Vec2, Uniform2fv);
impl_Uniformable!(vec Vec3<f32>, Vec3, Uniform3fv);
impl_Uniformable!(vec Vec4<f32>, Vec4, Uniform4fv);

impl_Uniformable!(mat Mat33<f32>, M33, UniformMatrix3fv);
impl_Uniformable!(mat Mat44<f32>, M44, UniformMatrix4fv);

unsafe impl Uniformable<bool> for GL33 {
  unsafe fn ty() -> UniformType {
    UniformType::Bool
  }

  unsafe fn update(_: &Program, location: i32, value: bool) {
    gl::Uniform1i(location, value as GLint);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn gl_types_map_to_uniform_types() {
    assert_eq!(uniform_type_from_gl(gl::FLOAT), Some(UniformType::Float));
    assert_eq!(uniform_type_from_gl(gl::FLOAT_VEC3), Some(UniformType::Vec3));
    assert_eq!(uniform_type_from_gl(gl::FLOAT_MAT4), Some(UniformType::M44));
    assert_eq!(
      uniform_type_from_gl(gl::SAMPLER_2D_SHADOW),
      Some(UniformType::Sampler2DShadow)
    );
  }

  #[test]
  fn unsupported_gl_types_are_rejected() {
    assert_eq!(uniform_type_from_gl(gl::SAMPLER_3D), None);
    assert_eq!(uniform_type_from_gl(gl::DOUBLE), None);
  }

  #[test]
  fn stage_types_map_to_gl_tokens() {
    assert_eq!(opengl_shader_type(StageType::VertexShader), gl::VERTEX_SHADER);
    assert_eq!(opengl_shader_type(StageType::FragmentShader), gl::FRAGMENT_SHADER);
  }
}
