//! A CPU-only backend standing in for a GPU driver.
//!
//! It understands just enough GLSL to behave like a driver on the paths the tests care about:
//!
//! - a stage compiles if its braces and parentheses are balanced and it declares `main`;
//! - `uniform`, `in` and `out` declarations are collected from each stage;
//! - linking checks that every fragment input is a vertex output of the same type, and that
//!   uniforms shared by both stages agree on their type;
//! - uploads land in the slots of the program in use.

#![allow(dead_code)]

use lumen::backend::shader::{Shader, UniformSlot, Uniformable};
use lumen::context::GraphicsContext;
use lumen::shader::types::{Mat44, Vec3};
use lumen::shader::{ProgramError, StageError, StageType, UniformType};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A value stored in a uniform slot.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
  Float(f32),
  Int(i32),
  Vec3([f32; 3]),
  Mat44([[f32; 4]; 4]),
}

#[derive(Clone, Debug, Default)]
struct Interface {
  uniforms: Vec<(String, UniformType)>,
  inputs: Vec<(String, String)>,
  outputs: Vec<(String, String)>,
}

#[derive(Debug, Default)]
pub struct LinkedProgram {
  attached: Vec<(StageType, Interface)>,
  pub uniforms: HashMap<String, UniformSlot>,
  pub values: HashMap<i32, Value>,
  pub linked: bool,
}

#[derive(Debug, Default)]
pub struct StubState {
  next_handle: u32,
  pub live_stages: usize,
  pub current_program: u32,
  pub programs: HashMap<u32, LinkedProgram>,
  pub deleted_programs: Vec<u32>,
}

impl StubState {
  fn next_handle(&mut self) -> u32 {
    self.next_handle += 1;
    self.next_handle
  }

  /// Value stored at the slot called `name` in `program`, if any.
  pub fn value(&self, program: u32, name: &str) -> Option<Value> {
    let program = self.programs.get(&program)?;
    let slot = program.uniforms.get(name)?;
    program.values.get(&slot.location).cloned()
  }
}

#[derive(Debug)]
pub struct Stub {
  state: Rc<RefCell<StubState>>,
}

pub struct StubStage {
  state: Rc<RefCell<StubState>>,
  ty: StageType,
  interface: Interface,
}

pub struct StubProgram {
  state: Rc<RefCell<StubState>>,
  handle: u32,
}

#[derive(Debug)]
pub struct StubContext {
  backend: Stub,
}

impl StubContext {
  pub fn new() -> Self {
    StubContext {
      backend: Stub {
        state: Rc::new(RefCell::new(StubState::default())),
      },
    }
  }

  /// Shared view on the backend state.
  pub fn state(&self) -> Rc<RefCell<StubState>> {
    self.backend.state.clone()
  }
}

unsafe impl GraphicsContext for StubContext {
  type Backend = Stub;

  fn backend(&mut self) -> &mut Self::Backend {
    &mut self.backend
  }
}

fn glsl_type(ty: &str) -> Option<UniformType> {
  match ty {
    "int" => Some(UniformType::Int),
    "uint" => Some(UniformType::UInt),
    "float" => Some(UniformType::Float),
    "bool" => Some(UniformType::Bool),
    "vec2" => Some(UniformType::Vec2),
    "vec3" => Some(UniformType::Vec3),
    "vec4" => Some(UniformType::Vec4),
    "mat3" => Some(UniformType::M33),
    "mat4" => Some(UniformType::M44),
    "sampler2D" => Some(UniformType::Sampler2D),
    _ => None,
  }
}

fn compile(src: &str) -> Result<Interface, String> {
  let mut depth = 0i32;
  let mut parens = 0i32;

  for (line_nb, line) in src.lines().enumerate() {
    for c in line.chars() {
      match c {
        '{' => depth += 1,
        '}' => depth -= 1,
        '(' => parens += 1,
        ')' => parens -= 1,
        _ => (),
      }

      if depth < 0 || parens < 0 {
        return Err(format!("0:{}(1): error: syntax error, unexpected '{}'", line_nb + 1, c));
      }
    }
  }

  if depth != 0 || parens != 0 {
    return Err("0:0(0): error: syntax error, unexpected end of file".to_owned());
  }

  if !src.contains("void main") {
    return Err("error: entry point main() not found".to_owned());
  }

  let mut interface = Interface::default();

  for line in src.lines() {
    let line = line.trim();
    let line = match line.find(')') {
      Some(i) if line.starts_with("layout") => line[i + 1..].trim(),
      _ => line,
    };

    let decl: Vec<&str> = line.trim_end_matches(';').split_whitespace().collect();
    if !line.ends_with(';') || decl.len() != 3 {
      continue;
    }

    let (qualifier, ty, name) = (decl[0], decl[1], decl[2]);
    match qualifier {
      "uniform" => {
        let ty = glsl_type(ty).ok_or_else(|| format!("error: unknown type {}", ty))?;
        interface.uniforms.push((name.to_owned(), ty));
      }
      "in" => interface.inputs.push((name.to_owned(), ty.to_owned())),
      "out" => interface.outputs.push((name.to_owned(), ty.to_owned())),
      _ => (),
    }
  }

  Ok(interface)
}

fn link(attached: &[(StageType, Interface)]) -> Result<HashMap<String, UniformSlot>, String> {
  if attached.is_empty() {
    return Err("error: no shader stage attached".to_owned());
  }

  let vertex = attached.iter().find(|(ty, _)| *ty == StageType::VertexShader);
  let fragment = attached.iter().find(|(ty, _)| *ty == StageType::FragmentShader);

  if let (Some((_, vertex)), Some((_, fragment))) = (vertex, fragment) {
    for (name, ty) in &fragment.inputs {
      let matching = vertex.outputs.iter().any(|(n, t)| n == name && t == ty);
      if !matching {
        return Err(format!(
          "error: fragment shader input `{}` ({}) does not match any vertex shader output",
          name, ty
        ));
      }
    }
  }

  let mut uniforms: HashMap<String, UniformSlot> = HashMap::new();
  for (_, interface) in attached {
    for (name, ty) in &interface.uniforms {
      match uniforms.get(name) {
        Some(slot) if slot.ty != *ty => {
          return Err(format!("error: uniform `{}` declared with different types", name));
        }
        Some(_) => (),
        None => {
          let location = uniforms.len() as i32;
          uniforms.insert(name.clone(), UniformSlot { location, ty: *ty });
        }
      }
    }
  }

  Ok(uniforms)
}

unsafe impl Shader for Stub {
  type StageRepr = StubStage;

  type ProgramRepr = StubProgram;

  unsafe fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError> {
    let interface = compile(src).map_err(|log| StageError::compilation_failed(ty, log))?;
    self.state.borrow_mut().live_stages += 1;

    Ok(StubStage {
      state: self.state.clone(),
      ty,
      interface,
    })
  }

  unsafe fn destroy_stage(stage: &mut Self::StageRepr) {
    stage.state.borrow_mut().live_stages -= 1;
  }

  unsafe fn new_program(&mut self) -> Result<Self::ProgramRepr, ProgramError> {
    let mut state = self.state.borrow_mut();
    let handle = state.next_handle();
    state.programs.insert(handle, LinkedProgram::default());

    Ok(StubProgram {
      state: self.state.clone(),
      handle,
    })
  }

  unsafe fn attach_stage(program: &mut Self::ProgramRepr, stage: &Self::StageRepr) {
    let mut state = program.state.borrow_mut();
    if let Some(linked) = state.programs.get_mut(&program.handle) {
      linked.attached.push((stage.ty, stage.interface.clone()));
    }
  }

  unsafe fn link_program(program: &mut Self::ProgramRepr) -> Result<(), ProgramError> {
    let mut state = program.state.borrow_mut();
    let linked = state
      .programs
      .get_mut(&program.handle)
      .ok_or_else(|| ProgramError::link_failed("error: unknown program"))?;

    let uniforms = link(&linked.attached).map_err(|log| ProgramError::link_failed(log))?;
    linked.uniforms = uniforms;
    linked.linked = true;

    Ok(())
  }

  unsafe fn destroy_program(program: &mut Self::ProgramRepr) {
    let mut state = program.state.borrow_mut();
    state.programs.remove(&program.handle);
    state.deleted_programs.push(program.handle);

    if state.current_program == program.handle {
      state.current_program = 0;
    }
  }

  unsafe fn program_handle(program: &Self::ProgramRepr) -> u32 {
    program.handle
  }

  unsafe fn use_program(program: &Self::ProgramRepr) {
    program.state.borrow_mut().current_program = program.handle;
  }

  unsafe fn ask_uniform(program: &Self::ProgramRepr, name: &str) -> Option<UniformSlot> {
    let state = program.state.borrow();
    state.programs.get(&program.handle)?.uniforms.get(name).copied()
  }
}

impl StubProgram {
  // Like glUniform*: the value goes to the program in use, whichever it is.
  fn upload(&self, location: i32, value: Value) {
    let mut state = self.state.borrow_mut();
    let current = state.current_program;

    if let Some(linked) = state.programs.get_mut(&current) {
      linked.values.insert(location, value);
    }
  }
}

macro_rules! impl_stub_uniformable {
  ($t:ty, $uty:ident, |$v:ident| $value:expr) => {
    unsafe impl Uniformable<$t> for Stub {
      unsafe fn ty() -> UniformType {
        UniformType::$uty
      }

      unsafe fn update(program: &Self::ProgramRepr, location: i32, $v: $t) {
        program.upload(location, $value);
      }
    }
  };
}

impl_stub_uniformable!(f32, Float, |v| Value::Float(v));
impl_stub_uniformable!(i32, Int, |v| Value::Int(v));
impl_stub_uniformable!(Vec3<f32>, Vec3, |v| Value::Vec3(v.0));
impl_stub_uniformable!(Mat44<f32>, M44, |v| Value::Mat44(v.0));
