mod stub;

use lumen::context::GraphicsContext;
use lumen::shader::types::Mat44;
use lumen::shader::{ProgramError, StageError, StageType, BUILD_FAILURE_EXIT_CODE};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::{self, Command};
use stub::{StubContext, Value};

const VS: &str = "
layout (location = 0) in vec3 position;
layout (location = 1) in vec3 normal;

uniform mat4 model;
uniform mat4 view;
uniform mat4 projection;

out vec3 v_normal;

void main() {
  v_normal = normal;
  gl_Position = projection * view * model * vec4(position, 1.);
}
";

const FS: &str = "
in vec3 v_normal;

uniform float shininess;
uniform vec3 light_color;

out vec4 frag;

void main() {
  frag = vec4(light_color * max(v_normal.z, 0.) * shininess, 1.);
}
";

// missing closing brace
const VS_SYNTAX_ERROR: &str = "
layout (location = 0) in vec3 position;

void main() {
  gl_Position = vec4(position, 1.);
";

// valid on its own, but doesn’t provide the v_normal the fragment stage reads
const VS_NO_NORMAL: &str = "
layout (location = 0) in vec3 position;

out vec3 v_color;

void main() {
  v_color = vec3(1.);
  gl_Position = vec4(position, 1.);
}
";

const CHILD_ENV: &str = "LUMEN_TEST_CHILD";

// Write a shader file private to a test.
fn shader_file(test: &str, name: &str, src: &str) -> PathBuf {
  let dir = env::temp_dir().join(format!("lumen-{}-{}", process::id(), test));
  fs::create_dir_all(&dir).unwrap();

  let path = dir.join(name);
  fs::write(&path, src).unwrap();
  path
}

#[test]
fn valid_sources_build_silently() {
  let vs = shader_file("valid", "vs.glsl", VS);
  let fs = shader_file("valid", "fs.glsl", FS);
  let mut ctx = StubContext::new();
  let mut diagnostics = Vec::new();

  let built = ctx
    .new_shader_program()
    .diagnostics(&mut diagnostics)
    .from_paths(&vs, &fs)
    .unwrap();

  assert!(built.warnings.is_empty());
  assert_ne!(built.program.handle(), 0);
  assert!(diagnostics.is_empty());
  assert!(ctx.state().borrow().programs[&built.program.handle()].linked);
}

#[test]
fn broken_stage_is_reported_and_skipped() {
  let vs = shader_file("broken", "vs.glsl", VS_SYNTAX_ERROR);
  let fs = shader_file("broken", "fs.glsl", FS);
  let mut ctx = StubContext::new();
  let mut diagnostics = Vec::new();

  let built = ctx
    .new_shader_program()
    .diagnostics(&mut diagnostics)
    .from_paths(&vs, &fs)
    .unwrap();

  assert_eq!(built.warnings.len(), 1);
  assert_eq!(built.warnings[0].stage_type(), StageType::VertexShader);
  assert!(matches!(
    built.warnings[0],
    StageError::CompilationFailed(StageType::VertexShader, _)
  ));

  let diagnostics = String::from_utf8(diagnostics).unwrap();
  assert!(diagnostics.contains("unexpected end of file"));
  assert!(diagnostics.contains(&vs.display().to_string()));
  assert!(diagnostics.contains(VS_SYNTAX_ERROR));
  assert!(!diagnostics.contains(&fs.display().to_string()));

  // the program exists, made of the fragment stage only
  assert!(ctx.state().borrow().programs[&built.program.handle()].linked);
}

#[test]
fn link_failure_is_reported() {
  let vs = shader_file("link", "vs.glsl", VS_NO_NORMAL);
  let fs = shader_file("link", "fs.glsl", FS);
  let mut ctx = StubContext::new();
  let mut diagnostics = Vec::new();

  let result = ctx
    .new_shader_program()
    .diagnostics(&mut diagnostics)
    .from_paths(&vs, &fs);

  match result {
    Err(ProgramError::LinkFailed(log)) => assert!(log.contains("v_normal")),
    Err(e) => panic!("unexpected error: {}", e),
    Ok(_) => panic!("mismatched stages linked"),
  }

  let diagnostics = String::from_utf8(diagnostics).unwrap();
  assert!(diagnostics.contains("does not match any vertex shader output"));

  // neither the stages nor the program outlive the failure
  let state = ctx.state();
  let state = state.borrow();
  assert_eq!(state.live_stages, 0);
  assert!(state.programs.is_empty());
  assert_eq!(state.deleted_programs.len(), 1);
}

#[test]
fn link_failure_terminates_the_process() {
  if env::var_os(CHILD_ENV).is_some() {
    let vs = shader_file("exit", "vs.glsl", VS_NO_NORMAL);
    let fs = shader_file("exit", "fs.glsl", FS);
    let mut ctx = StubContext::new();
    let _program = ctx.new_shader_program().from_paths_or_exit(&vs, &fs);

    // reaching this point makes the child exit successfully, failing the parent
    return;
  }

  let output = Command::new(env::current_exe().unwrap())
    .args(&[
      "--exact",
      "link_failure_terminates_the_process",
      "--nocapture",
      "--test-threads=1",
    ])
    .env(CHILD_ENV, "1")
    .output()
    .unwrap();

  assert_eq!(output.status.code(), Some(BUILD_FAILURE_EXIT_CODE));

  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("does not match any vertex shader output"));
}

#[test]
fn unreadable_source_is_an_error() {
  let fs = shader_file("unreadable", "fs.glsl", FS);
  let missing = fs.with_file_name("missing.glsl");
  let mut ctx = StubContext::new();
  let mut diagnostics = Vec::new();

  let result = ctx
    .new_shader_program()
    .diagnostics(&mut diagnostics)
    .from_paths(&missing, &fs);

  match result {
    Err(ProgramError::SourceUnreadable { path, .. }) => assert_eq!(path, missing),
    Err(e) => panic!("unexpected error: {}", e),
    Ok(_) => panic!("program built from a missing file"),
  }

  assert!(String::from_utf8(diagnostics).unwrap().contains("missing.glsl"));
  assert!(ctx.state().borrow().programs.is_empty());
}

#[test]
fn stages_are_released_after_build() {
  let mut ctx = StubContext::new();

  let _program = ctx
    .new_shader_program()
    .from_strings(VS, FS)
    .unwrap()
    .ignore_warnings();

  assert_eq!(ctx.state().borrow().live_stages, 0);
}

#[test]
fn uniform_upload_after_activation() {
  let mut ctx = StubContext::new();
  let mut program = ctx
    .new_shader_program()
    .from_strings(VS, FS)
    .unwrap()
    .ignore_warnings();

  program.activate();
  program.set_float("shininess", 12.8);
  program.set_vec3("light_color", [0.9, 0.9, 0.9]);
  program.set_mat4("model", Mat44::IDENTITY);

  let state = ctx.state();
  let state = state.borrow();
  let handle = program.handle();

  assert_eq!(state.current_program, handle);
  assert_eq!(state.value(handle, "shininess"), Some(Value::Float(12.8)));
  assert_eq!(
    state.value(handle, "light_color"),
    Some(Value::Vec3([0.9, 0.9, 0.9]))
  );
  assert_eq!(
    state.value(handle, "model"),
    Some(Value::Mat44(Mat44::IDENTITY.0))
  );
}

#[test]
fn unknown_uniform_is_ignored() {
  let mut ctx = StubContext::new();
  let mut program = ctx
    .new_shader_program()
    .from_strings(VS, FS)
    .unwrap()
    .ignore_warnings();

  program.activate();
  program.set_vec3("camera_pos", [0., 4., 8.]);
  program.set_vec3("camera_pos", [0., 4., 9.]);

  let state = ctx.state();
  assert!(state.borrow().programs[&program.handle()].values.is_empty());
}

#[test]
fn mistyped_upload_is_skipped() {
  let mut ctx = StubContext::new();
  let mut program = ctx
    .new_shader_program()
    .from_strings(VS, FS)
    .unwrap()
    .ignore_warnings();

  program.activate();
  program.set_int("light_color", 3);
  program.set_float("view", 1.);

  let state = ctx.state();
  assert!(state.borrow().programs[&program.handle()].values.is_empty());
}

#[test]
fn programs_from_the_same_files_are_independent() {
  let vs = shader_file("twice", "vs.glsl", VS);
  let fs = shader_file("twice", "fs.glsl", FS);
  let mut ctx = StubContext::new();

  let mut a = ctx
    .new_shader_program()
    .from_paths(&vs, &fs)
    .unwrap()
    .ignore_warnings();
  let mut b = ctx
    .new_shader_program()
    .from_paths(&vs, &fs)
    .unwrap()
    .ignore_warnings();

  assert_ne!(a.handle(), b.handle());

  {
    let state = ctx.state();
    let state = state.borrow();
    assert_eq!(
      state.programs[&a.handle()].uniforms,
      state.programs[&b.handle()].uniforms
    );
  }

  a.activate();
  a.set_float("shininess", 1.);
  b.activate();
  b.set_float("shininess", 2.);

  let state = ctx.state();
  assert_eq!(state.borrow().value(a.handle(), "shininess"), Some(Value::Float(1.)));
  assert_eq!(state.borrow().value(b.handle(), "shininess"), Some(Value::Float(2.)));

  let b_handle = b.handle();
  drop(b);

  let state = state.borrow();
  assert_eq!(state.deleted_programs, vec![b_handle]);
  assert!(state.programs.contains_key(&a.handle()));
}

#[test]
fn last_activation_wins() {
  let mut ctx = StubContext::new();
  let mut a = ctx
    .new_shader_program()
    .from_strings(VS, FS)
    .unwrap()
    .ignore_warnings();
  let b = ctx
    .new_shader_program()
    .from_strings(VS, FS)
    .unwrap()
    .ignore_warnings();

  a.activate();
  b.activate();
  // both programs share the same layout, so the upload lands in b
  a.set_float("shininess", 3.);

  let state = ctx.state();
  let state = state.borrow();
  assert_eq!(state.current_program, b.handle());
  assert_eq!(state.value(b.handle(), "shininess"), Some(Value::Float(3.)));
  assert_eq!(state.value(a.handle(), "shininess"), None);
}

#[test]
fn dropping_the_active_program_clears_the_selection() {
  let mut ctx = StubContext::new();
  let program = ctx
    .new_shader_program()
    .from_strings(VS, FS)
    .unwrap()
    .ignore_warnings();

  program.activate();
  drop(program);

  assert_eq!(ctx.state().borrow().current_program, 0);
}
