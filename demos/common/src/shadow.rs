//! The Blinn-Phong scene with shadows.
//!
//! The scene is rendered twice per frame. The first pass renders depth only, from the light, into
//! a depth texture. The second pass renders the lit scene and compares each fragment’s depth as
//! seen from the light against that texture. Shadow edges are softened by percentage-closer
//! filtering (PCF) over a 3×3 neighborhood.
//!
//! Press <space> to switch PCF on and off.
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
use cgmath::{ortho, Matrix4, Point3, Vector3};
use gl::types::*;
use lumen::{context::GraphicsContext, shader::Program};
use lumen_gl::GL33;
use std::ptr;

const DEPTH_VS: &str = "vertex_simple_depth.glsl";
const DEPTH_FS: &str = "fragment_empty.glsl";
const SHADOW_VS: &str = "vertex_shadow_phong.glsl";
const SHADOW_FS: &str = "fragment_shadow_blinn_phong.glsl";
const LIGHTCUBE_VS: &str = "vertex_lightcube.glsl";
const LIGHTCUBE_FS: &str = "fragment_lightcube.glsl";

const SHADOW_WIDTH: u32 = 1280;
const SHADOW_HEIGHT: u32 = 720;

// texture unit the depth map is bound to during the lit pass
const SHADOW_MAP_UNIT: GLuint = 0;

// Depth-only framebuffer the scene is rendered into from the light.
struct DepthMap {
  fbo: GLuint,
  texture: GLuint,
}

impl DepthMap {
  fn new(width: u32, height: u32) -> Self {
    let mut fbo = 0;
    let mut texture = 0;

    unsafe {
      gl::GenTextures(1, &mut texture);
      gl::BindTexture(gl::TEXTURE_2D, texture);
      gl::TexImage2D(
        gl::TEXTURE_2D,
        0,
        gl::DEPTH_COMPONENT as GLint,
        width as GLsizei,
        height as GLsizei,
        0,
        gl::DEPTH_COMPONENT,
        gl::FLOAT,
        ptr::null(),
      );
      gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::NEAREST as GLint);
      gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::NEAREST as GLint);

      // everything outside of the light frustum is lit
      let border = [1f32, 1., 1., 1.];
      gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_BORDER as GLint);
      gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_BORDER as GLint);
      gl::TexParameterfv(gl::TEXTURE_2D, gl::TEXTURE_BORDER_COLOR, border.as_ptr());

      gl::GenFramebuffers(1, &mut fbo);
      gl::BindFramebuffer(gl::FRAMEBUFFER, fbo);
      gl::FramebufferTexture2D(
        gl::FRAMEBUFFER,
        gl::DEPTH_ATTACHMENT,
        gl::TEXTURE_2D,
        texture,
        0,
      );
      gl::DrawBuffer(gl::NONE);
      gl::ReadBuffer(gl::NONE);

      let status = gl::CheckFramebufferStatus(gl::FRAMEBUFFER);
      if status != gl::FRAMEBUFFER_COMPLETE {
        log::error!("incomplete depth map framebuffer (status 0x{:x})", status);
      }

      gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
    }

    DepthMap { fbo, texture }
  }
}

impl Drop for DepthMap {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteFramebuffers(1, &self.fbo);
      gl::DeleteTextures(1, &self.texture);
    }
  }
}

pub struct LocalExample {
  depth: Program<GL33>,
  lit: Program<GL33>,
  lightcube: Program<GL33>,
  depth_map: DepthMap,
  mesh: VertexArray,
  ground: VertexArray,
  light: VertexArray,
  controls: Controls,
  pcf: bool,
  viewport: [u32; 2],
}

impl LocalExample {
  // Projection and view of the light, as a single matrix.
  fn light_space(&self) -> Matrix4<f32> {
    let projection = ortho(-10., 10., -10., 10., 1., 20.);
    let view = Matrix4::look_at_rh(
      self.controls.light_pos,
      Point3::new(0., 0., 0.),
      Vector3::unit_y(),
    );

    projection * view
  }

  fn depth_pass(&mut self, light_space: Matrix4<f32>) {
    unsafe {
      gl::BindFramebuffer(gl::FRAMEBUFFER, self.depth_map.fbo);
      gl::Clear(gl::DEPTH_BUFFER_BIT);
    }
    shared::set_viewport(SHADOW_WIDTH, SHADOW_HEIGHT);

    self.depth.activate();
    self.depth.set_mat4("light_space", light_space);

    self.depth.set_mat4("model", shared::mesh_model());
    self.mesh.draw();

    self.depth.set_mat4("model", shared::ground_model());
    self.ground.draw();

    unsafe { gl::BindFramebuffer(gl::FRAMEBUFFER, 0) };
  }

  fn lit_pass(&mut self, light_space: Matrix4<f32>) {
    let [width, height] = self.viewport;
    shared::set_viewport(width, height);
    shared::clear(shared::CLEAR_COLOR);

    unsafe {
      gl::ActiveTexture(gl::TEXTURE0 + SHADOW_MAP_UNIT);
      gl::BindTexture(gl::TEXTURE_2D, self.depth_map.texture);
    }

    self.lit.activate();
    self.lit.set_mat4("light_space", light_space);
    self.lit.set_int("shadow_map", SHADOW_MAP_UNIT as i32);
    self.lit.set("pcf", self.pcf);

    shared::configure_phong(&mut self.lit, shared::mesh_model(), &self.controls, &COPPER);
    self.mesh.draw();

    shared::configure_phong(
      &mut self.lit,
      shared::ground_model(),
      &self.controls,
      &WHITE_PLASTIC,
    );
    self.ground.draw();

    self.lightcube.activate();
    shared::configure_lightcube(&mut self.lightcube, &self.controls);
    self.light.draw();
  }
}

impl Example for LocalExample {
  fn features() -> Features {
    Features::none()
      .shader(DEPTH_VS)
      .shader(DEPTH_FS)
      .shader(SHADOW_VS)
      .shader(SHADOW_FS)
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

    let depth = context
      .new_shader_program()
      .from_paths_or_exit(platform.shader_path(DEPTH_VS), platform.shader_path(DEPTH_FS));
    let lit = context
      .new_shader_program()
      .from_paths_or_exit(platform.shader_path(SHADOW_VS), platform.shader_path(SHADOW_FS));
    let lightcube = context.new_shader_program().from_paths_or_exit(
      platform.shader_path(LIGHTCUBE_VS),
      platform.shader_path(LIGHTCUBE_FS),
    );

    let depth_map = DepthMap::new(SHADOW_WIDTH, SHADOW_HEIGHT);

    unsafe { gl::Enable(gl::DEPTH_TEST) };

    Ok(Self {
      depth,
      lit,
      lightcube,
      depth_map,
      mesh,
      ground,
      light,
      controls: Controls::default(),
      pcf: true,
      viewport: [1280, 720],
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

        InputAction::MainToggle => {
          self.pcf = !self.pcf;
          log::info!("PCF: {}", if self.pcf { "on" } else { "off" });
        }

        InputAction::Resized { width, height } => self.viewport = [width, height],

        _ => (),
      }
    }

    let light_space = self.light_space();
    self.depth_pass(light_space);
    self.lit_pass(light_space);

    LoopFeedback::Continue(self)
  }
}
