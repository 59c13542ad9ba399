//! A rotating cube.
//!
//! The cube is indexed (8 corners, 36 indices) and placed in the world with model, view and
//! projection matrices uploaded as uniforms every frame.
//!
//! Press <space> to pause the rotation.
//! Press <a>, <d>, <w>, <s>, <f> and <r> to move the camera; <shift+space> to switch between
//! moving the eye, the point it looks at and the light (unused here); scroll to zoom;
//! <backspace> to reset.
//! Press <escape> to quit or close the window.

use crate::{
  shared::{self, Controls, VertexArray, CUBE_CORNERS, CUBE_INDICES},
  Example, Features, InputAction, LoopFeedback, PlatformServices,
};
use cgmath::{InnerSpace, Matrix4, Rad, Vector3};
use lumen::{context::GraphicsContext, shader::Program};
use lumen_gl::GL33;

const VS: &str = "vertex_cube.glsl";
const FS: &str = "fragment_cube.glsl";

const CUBE_COLOR: [f32; 3] = [0.7038, 0.27048, 0.0828];

// radians per second
const ROTATION_SPEED: f32 = 0.8;

pub struct LocalExample {
  program: Program<GL33>,
  cube: VertexArray,
  controls: Controls,
  paused: bool,
  // rotation accumulated while not paused
  angle: f32,
  last_t: f32,
}

impl Example for LocalExample {
  fn features() -> Features {
    Features::none().shader(VS).shader(FS)
  }

  fn bootstrap<P>(
    platform: &mut P,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> Result<Self, P::FetchError>
  where
    P: PlatformServices,
  {
    let program = context
      .new_shader_program()
      .from_paths_or_exit(platform.shader_path(VS), platform.shader_path(FS));

    let cube = VertexArray::indexed(&CUBE_CORNERS, &[3], &CUBE_INDICES);

    unsafe { gl::Enable(gl::DEPTH_TEST) };

    Ok(Self {
      program,
      cube,
      controls: Controls::default(),
      paused: false,
      angle: 0.,
      last_t: 0.,
    })
  }

  fn render_frame(
    mut self,
    t: f32,
    actions: impl Iterator<Item = InputAction>,
    _: &mut impl GraphicsContext<Backend = GL33>,
  ) -> LoopFeedback<Self> {
    for action in actions {
      if self.controls.handle(&action) {
        continue;
      }

      match action {
        InputAction::Quit => return LoopFeedback::Exit,
        InputAction::MainToggle => self.paused = !self.paused,
        InputAction::Resized { width, height } => shared::set_viewport(width, height),
        _ => (),
      }
    }

    if !self.paused {
      self.angle += (t - self.last_t) * ROTATION_SPEED;
    }
    self.last_t = t;

    let model = Matrix4::from_axis_angle(Vector3::new(0.6, 1., 0.2).normalize(), Rad(self.angle));

    shared::clear(shared::CLEAR_COLOR);

    self.program.activate();
    self.program.set_mat4("model", model);
    self.program.set_mat4("view", self.controls.view());
    self.program.set_mat4("projection", self.controls.projection());
    self.program.set_vec3("color", CUBE_COLOR);

    self.cube.draw();

    LoopFeedback::Continue(self)
  }
}
