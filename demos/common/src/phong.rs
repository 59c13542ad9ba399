//! A Blinn-Phong lit scene.
//!
//! The scene mesh is rendered in copper on top of a white plastic ground slab. The light is
//! represented by a small cube drawn with its own program. Material and light parameters are
//! uploaded as uniforms (`material.*`, `light.*`), along with the camera position needed by the
//! specular term.
//!
//! Press <a>, <d>, <w>, <s>, <f> and <r> to move the current target; <shift+space> to cycle the
//! target between the camera eye, the point it looks at and the light; scroll to change the field
//! of view; <backspace> to reset.
//! Press <escape> to quit or close the window.

use crate::{
  shared::{
    self, Controls, VertexArray, COPPER, CUBE_CORNERS, CUBE_INDICES, CUBE_WITH_NORMALS,
    WHITE_PLASTIC,
  },
  Example, Features, InputAction, LoopFeedback, PlatformServices,
};
use lumen::{context::GraphicsContext, shader::Program};
use lumen_gl::GL33;

const PHONG_VS: &str = "vertex_phong.glsl";
const PHONG_FS: &str = "fragment_blinn_phong.glsl";
const LIGHTCUBE_VS: &str = "vertex_lightcube.glsl";
const LIGHTCUBE_FS: &str = "fragment_lightcube.glsl";

pub struct LocalExample {
  phong: Program<GL33>,
  lightcube: Program<GL33>,
  mesh: VertexArray,
  ground: VertexArray,
  light: VertexArray,
  controls: Controls,
}

impl Example for LocalExample {
  fn features() -> Features {
    Features::none()
      .shader(PHONG_VS)
      .shader(PHONG_FS)
      .shader(LIGHTCUBE_VS)
      .shader(LIGHTCUBE_FS)
      .mesh()
  }

  fn bootstrap<P>(
    platform: &mut P,
    context: &mut impl GraphicsContext<Backend = GL33>,
  ) -> Result<Self, P::FetchError>
  where
    P: PlatformServices,
  {
    let mesh = VertexArray::from_mesh(platform.fetch_mesh()?);
    let ground = VertexArray::new(&CUBE_WITH_NORMALS, &[3, 3]);
    let light = VertexArray::indexed(&CUBE_CORNERS, &[3], &CUBE_INDICES);

    let phong = context
      .new_shader_program()
      .from_paths_or_exit(platform.shader_path(PHONG_VS), platform.shader_path(PHONG_FS));
    let lightcube = context.new_shader_program().from_paths_or_exit(
      platform.shader_path(LIGHTCUBE_VS),
      platform.shader_path(LIGHTCUBE_FS),
    );

    unsafe { gl::Enable(gl::DEPTH_TEST) };

    Ok(Self {
      phong,
      lightcube,
      mesh,
      ground,
      light,
      controls: Controls::default(),
    })
  }

  fn render_frame(
    mut self,
    _: f32,
    actions: impl Iterator<Item = InputAction>,
    _: &mut impl GraphicsContext<Backend = GL33>,
  ) -> LoopFeedback<Self> {
    for action in actions {
      if self.controls.handle(&action) {
        continue;
      }

      match action {
        InputAction::Quit => return LoopFeedback::Exit,
        InputAction::Resized { width, height } => shared::set_viewport(width, height),
        _ => (),
      }
    }

    shared::clear(shared::CLEAR_COLOR);

    self.phong.activate();
    shared::configure_phong(&mut self.phong, shared::mesh_model(), &self.controls, &COPPER);
    self.mesh.draw();

    shared::configure_phong(
      &mut self.phong,
      shared::ground_model(),
      &self.controls,
      &WHITE_PLASTIC,
    );
    self.ground.draw();

    self.lightcube.activate();
    shared::configure_lightcube(&mut self.lightcube, &self.controls);
    self.light.draw();

    LoopFeedback::Continue(self)
  }
}
