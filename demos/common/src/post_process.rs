//! Post-processing.
//!
//! The Blinn-Phong scene is rendered into an offscreen framebuffer (color texture and depth
//! renderbuffer), which is then drawn on a fullscreen quad through a fragment stage applying an
//! effect to the whole image.
//!
//! Press <space> to cycle through the effects (none, inversion, grayscale, sharpen).
//! Press <a>, <d>, <w>, <s>, <f> and <r> to move the current target; <shift+space> to cycle the
//! target; scroll to change the field of view; <backspace> to reset.
//! Press <escape> to quit or close the window.

use crate::{
  shared::{
    self, Controls, VertexArray, COPPER, CUBE_CORNERS, CUBE_INDICES, CUBE_WITH_NORMALS,
    WHITE_PLASTIC,
  },
  Example, Features, InputAction, LoopFeedback, PlatformServices,
};
use gl::types::*;
use lumen::{context::GraphicsContext, shader::Program};
use lumen_gl::GL33;
use std::ptr;

const PHONG_VS: &str = "vertex_phong.glsl";
const PHONG_FS: &str = "fragment_blinn_phong.glsl";
const LIGHTCUBE_VS: &str = "vertex_lightcube.glsl";
const LIGHTCUBE_FS: &str = "fragment_lightcube.glsl";
const QUAD_VS: &str = "vertex_screen_quad.glsl";
const POST_FS: &str = "fragment_post.glsl";

// position (2), texture coordinates (2); two triangles covering the screen
#[rustfmt::skip]
const QUAD_VERTICES: [f32; 24] = [
  -1.,  1.,  0., 1.,
  -1., -1.,  0., 0.,
   1., -1.,  1., 0.,

  -1.,  1.,  0., 1.,
   1., -1.,  1., 0.,
   1.,  1.,  1., 1.,
];

/// Effect applied to the offscreen image. The discriminant is what the fragment stage reads.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Effect {
  None = 0,
  Inversion = 1,
  Grayscale = 2,
  Sharpen = 3,
}

impl Effect {
  pub fn next(self) -> Self {
    match self {
      Effect::None => Effect::Inversion,
      Effect::Inversion => Effect::Grayscale,
      Effect::Grayscale => Effect::Sharpen,
      Effect::Sharpen => Effect::None,
    }
  }
}

// Color and depth framebuffer matching the window size.
struct Offscreen {
  fbo: GLuint,
  color: GLuint,
  depth: GLuint,
}

impl Offscreen {
  fn new(width: u32, height: u32) -> Self {
    let (width, height) = (width.max(1) as GLsizei, height.max(1) as GLsizei);
    let mut fbo = 0;
    let mut color = 0;
    let mut depth = 0;

    unsafe {
      gl::GenFramebuffers(1, &mut fbo);
      gl::BindFramebuffer(gl::FRAMEBUFFER, fbo);

      gl::GenTextures(1, &mut color);
      gl::BindTexture(gl::TEXTURE_2D, color);
      gl::TexImage2D(
        gl::TEXTURE_2D,
        0,
        gl::RGB as GLint,
        width,
        height,
        0,
        gl::RGB,
        gl::UNSIGNED_BYTE,
        ptr::null(),
      );
      gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
      gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
      gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as GLint);
      gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as GLint);
      gl::FramebufferTexture2D(
        gl::FRAMEBUFFER,
        gl::COLOR_ATTACHMENT0,
        gl::TEXTURE_2D,
        color,
        0,
      );

      gl::GenRenderbuffers(1, &mut depth);
      gl::BindRenderbuffer(gl::RENDERBUFFER, depth);
      gl::RenderbufferStorage(gl::RENDERBUFFER, gl::DEPTH24_STENCIL8, width, height);
      gl::FramebufferRenderbuffer(
        gl::FRAMEBUFFER,
        gl::DEPTH_STENCIL_ATTACHMENT,
        gl::RENDERBUFFER,
        depth,
      );

      let status = gl::CheckFramebufferStatus(gl::FRAMEBUFFER);
      if status != gl::FRAMEBUFFER_COMPLETE {
        log::error!("incomplete offscreen framebuffer (status 0x{:x})", status);
      }

      gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
    }

    Offscreen { fbo, color, depth }
  }
}

impl Drop for Offscreen {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteFramebuffers(1, &self.fbo);
      gl::DeleteRenderbuffers(1, &self.depth);
      gl::DeleteTextures(1, &self.color);
    }
  }
}

pub struct LocalExample {
  phong: Program<GL33>,
  lightcube: Program<GL33>,
  post: Program<GL33>,
  offscreen: Offscreen,
  mesh: VertexArray,
  ground: VertexArray,
  light: VertexArray,
  quad: VertexArray,
  controls: Controls,
  effect: Effect,
}

impl LocalExample {
  fn render_scene(&mut self) {
    unsafe {
      gl::BindFramebuffer(gl::FRAMEBUFFER, self.offscreen.fbo);
      gl::Enable(gl::DEPTH_TEST);
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
  }

  fn render_post(&mut self) {
    unsafe {
      gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
      gl::Disable(gl::DEPTH_TEST);
      gl::ActiveTexture(gl::TEXTURE0);
      gl::BindTexture(gl::TEXTURE_2D, self.offscreen.color);
    }
    shared::clear([1., 1., 1., 1.]);

    self.post.activate();
    self.post.set_int("screen", 0);
    self.post.set_int("effect", self.effect as i32);
    self.quad.draw();
  }
}

impl Example for LocalExample {
  fn features() -> Features {
    Features::none()
      .shader(PHONG_VS)
      .shader(PHONG_FS)
      .shader(LIGHTCUBE_VS)
      .shader(LIGHTCUBE_FS)
      .shader(QUAD_VS)
      .shader(POST_FS)
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
    let quad = VertexArray::new(&QUAD_VERTICES, &[2, 2]);

    let phong = context
      .new_shader_program()
      .from_paths_or_exit(platform.shader_path(PHONG_VS), platform.shader_path(PHONG_FS));
    let lightcube = context.new_shader_program().from_paths_or_exit(
      platform.shader_path(LIGHTCUBE_VS),
      platform.shader_path(LIGHTCUBE_FS),
    );
    let post = context
      .new_shader_program()
      .from_paths_or_exit(platform.shader_path(QUAD_VS), platform.shader_path(POST_FS));

    // replaced as soon as the first resize comes in
    let offscreen = Offscreen::new(1280, 720);

    Ok(Self {
      phong,
      lightcube,
      post,
      offscreen,
      mesh,
      ground,
      light,
      quad,
      controls: Controls::default(),
      effect: Effect::None,
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
          self.effect = self.effect.next();
          log::info!("effect: {:?}", self.effect);
        }

        InputAction::Resized { width, height } => {
          shared::set_viewport(width, height);
          self.offscreen = Offscreen::new(width, height);
        }

        _ => (),
      }
    }

    self.render_scene();
    self.render_post();

    LoopFeedback::Continue(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn effects_cycle_back_to_none() {
    let mut effect = Effect::None;
    let mut seen = Vec::new();

    for _ in 0..4 {
      seen.push(effect as i32);
      effect = effect.next();
    }

    assert_eq!(effect, Effect::None);
    assert_eq!(seen, vec![0, 1, 2, 3]);
  }
}
