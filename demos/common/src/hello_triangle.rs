//! The first step: a single RGB triangle.
//!
//! Each vertex carries a color; the fragment stage gets them interpolated across the triangle.
//!
//! Press <escape> to quit or close the window.

use crate::{
  shared::{self, VertexArray},
  Example, Features, InputAction, LoopFeedback, PlatformServices,
};
use lumen::{context::GraphicsContext, shader::Program};
use lumen_gl::GL33;

const VS: &str = "vertex_triangle.glsl";
const FS: &str = "fragment_triangle.glsl";

// position (2), color (3)
#[rustfmt::skip]
const TRI_VERTICES: [f32; 15] = [
   0.5, -0.5,  0., 1., 0.,
   0.0,  0.5,  0., 0., 1.,
  -0.5, -0.5,  1., 0., 0.,
];

pub struct LocalExample {
  program: Program<GL33>,
  triangle: VertexArray,
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

    let triangle = VertexArray::new(&TRI_VERTICES, &[2, 3]);

    Ok(Self { program, triangle })
  }

  fn render_frame(
    self,
    _: f32,
    actions: impl Iterator<Item = InputAction>,
    _: &mut impl GraphicsContext<Backend = GL33>,
  ) -> LoopFeedback<Self> {
    for action in actions {
      match action {
        InputAction::Quit => return LoopFeedback::Exit,
        InputAction::Resized { width, height } => shared::set_viewport(width, height),
        _ => (),
      }
    }

    shared::clear(shared::CLEAR_COLOR);

    self.program.activate();
    self.triangle.draw();

    LoopFeedback::Continue(self)
  }
}
