//! Helpers shared by the steps.

use crate::InputAction;
use cgmath::{perspective, Deg, Matrix4, Point3, Vector3};
use gl::types::*;
use lumen::mesh::Mesh;
use lumen::shader::Program;
use lumen_gl::GL33;
use std::mem;

pub const CLEAR_COLOR: [f32; 4] = [0.043_137_25, 0.180_392_1, 0.160_784_3, 1.];

// near and far clipping planes of the camera
pub const Z_NEAR: f32 = 0.01;
pub const Z_FAR: f32 = 100.;

/// A vertex array object with its vertex buffer and, optionally, its index buffer.
///
/// Vertices are interleaved floats; the layout gives the number of floats of each attribute, in
/// attribute location order.
#[derive(Debug)]
pub struct VertexArray {
  vao: GLuint,
  vbo: GLuint,
  ebo: Option<GLuint>,
  count: GLsizei,
}

impl VertexArray {
  pub fn new(vertices: &[f32], layout: &[GLint]) -> Self {
    unsafe { Self::build(vertices, layout, None) }
  }

  pub fn indexed(vertices: &[f32], layout: &[GLint], indices: &[u32]) -> Self {
    unsafe { Self::build(vertices, layout, Some(indices)) }
  }

  /// Positions at location 0, normals at location 1.
  pub fn from_mesh(mesh: &Mesh) -> Self {
    let vertices: Vec<f32> = mesh
      .vertices()
      .iter()
      .flat_map(|v| v.position.iter().chain(v.normal.iter()).copied())
      .collect();

    Self::new(&vertices, &[3, 3])
  }

  unsafe fn build(vertices: &[f32], layout: &[GLint], indices: Option<&[u32]>) -> Self {
    let stride: GLint = layout.iter().sum::<GLint>().max(1);
    let float_size = mem::size_of::<f32>();

    let mut vao = 0;
    gl::GenVertexArrays(1, &mut vao);
    gl::BindVertexArray(vao);

    let mut vbo = 0;
    gl::GenBuffers(1, &mut vbo);
    gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
    gl::BufferData(
      gl::ARRAY_BUFFER,
      (vertices.len() * float_size) as GLsizeiptr,
      vertices.as_ptr() as *const _,
      gl::STATIC_DRAW,
    );

    let mut offset = 0;
    for (location, &size) in layout.iter().enumerate() {
      gl::VertexAttribPointer(
        location as GLuint,
        size,
        gl::FLOAT,
        gl::FALSE,
        stride * float_size as GLsizei,
        (offset as usize * float_size) as *const _,
      );
      gl::EnableVertexAttribArray(location as GLuint);
      offset += size;
    }

    // the element buffer binding is part of the vertex array state
    let (ebo, count) = match indices {
      Some(indices) => {
        let mut ebo = 0;
        gl::GenBuffers(1, &mut ebo);
        gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ebo);
        gl::BufferData(
          gl::ELEMENT_ARRAY_BUFFER,
          (indices.len() * mem::size_of::<u32>()) as GLsizeiptr,
          indices.as_ptr() as *const _,
          gl::STATIC_DRAW,
        );

        (Some(ebo), indices.len())
      }

      None => (None, vertices.len() / stride as usize),
    };

    gl::BindVertexArray(0);

    VertexArray {
      vao,
      vbo,
      ebo,
      count: count as GLsizei,
    }
  }

  pub fn draw(&self) {
    unsafe {
      gl::BindVertexArray(self.vao);

      if self.ebo.is_some() {
        gl::DrawElements(gl::TRIANGLES, self.count, gl::UNSIGNED_INT, std::ptr::null());
      } else {
        gl::DrawArrays(gl::TRIANGLES, 0, self.count);
      }

      gl::BindVertexArray(0);
    }
  }
}

impl Drop for VertexArray {
  fn drop(&mut self) {
    unsafe {
      if let Some(ebo) = self.ebo {
        gl::DeleteBuffers(1, &ebo);
      }

      gl::DeleteBuffers(1, &self.vbo);
      gl::DeleteVertexArrays(1, &self.vao);
    }
  }
}

// Cube of side 1 centered on the origin: 8 corners, 12 triangles.
#[rustfmt::skip]
pub const CUBE_CORNERS: [f32; 24] = [
  // front face
  -0.5, -0.5,  0.5,
   0.5, -0.5,  0.5,
   0.5,  0.5,  0.5,
  -0.5,  0.5,  0.5,
  // back face
  -0.5, -0.5, -0.5,
   0.5, -0.5, -0.5,
   0.5,  0.5, -0.5,
  -0.5,  0.5, -0.5,
];

#[rustfmt::skip]
pub const CUBE_INDICES: [u32; 36] = [
  0, 1, 2,  2, 3, 0, // front
  4, 5, 6,  6, 7, 4, // back
  3, 2, 6,  6, 7, 3, // top
  0, 1, 5,  5, 4, 0, // bottom
  0, 3, 7,  7, 4, 0, // left
  1, 2, 6,  6, 5, 1, // right
];

// Same cube, unindexed, with a normal per face.
#[rustfmt::skip]
pub const CUBE_WITH_NORMALS: [f32; 216] = [
  // front
  -0.5, -0.5,  0.5,  0.,  0.,  1.,
   0.5, -0.5,  0.5,  0.,  0.,  1.,
   0.5,  0.5,  0.5,  0.,  0.,  1.,
   0.5,  0.5,  0.5,  0.,  0.,  1.,
  -0.5,  0.5,  0.5,  0.,  0.,  1.,
  -0.5, -0.5,  0.5,  0.,  0.,  1.,
  // back
  -0.5, -0.5, -0.5,  0.,  0., -1.,
   0.5, -0.5, -0.5,  0.,  0., -1.,
   0.5,  0.5, -0.5,  0.,  0., -1.,
   0.5,  0.5, -0.5,  0.,  0., -1.,
  -0.5,  0.5, -0.5,  0.,  0., -1.,
  -0.5, -0.5, -0.5,  0.,  0., -1.,
  // top
  -0.5,  0.5,  0.5,  0.,  1.,  0.,
   0.5,  0.5,  0.5,  0.,  1.,  0.,
   0.5,  0.5, -0.5,  0.,  1.,  0.,
   0.5,  0.5, -0.5,  0.,  1.,  0.,
  -0.5,  0.5, -0.5,  0.,  1.,  0.,
  -0.5,  0.5,  0.5,  0.,  1.,  0.,
  // bottom
  -0.5, -0.5,  0.5,  0., -1.,  0.,
   0.5, -0.5,  0.5,  0., -1.,  0.,
   0.5, -0.5, -0.5,  0., -1.,  0.,
   0.5, -0.5, -0.5,  0., -1.,  0.,
  -0.5, -0.5, -0.5,  0., -1.,  0.,
  -0.5, -0.5,  0.5,  0., -1.,  0.,
  // left
  -0.5, -0.5,  0.5, -1.,  0.,  0.,
  -0.5,  0.5,  0.5, -1.,  0.,  0.,
  -0.5,  0.5, -0.5, -1.,  0.,  0.,
  -0.5,  0.5, -0.5, -1.,  0.,  0.,
  -0.5, -0.5, -0.5, -1.,  0.,  0.,
  -0.5, -0.5,  0.5, -1.,  0.,  0.,
  // right
   0.5, -0.5,  0.5,  1.,  0.,  0.,
   0.5,  0.5,  0.5,  1.,  0.,  0.,
   0.5,  0.5, -0.5,  1.,  0.,  0.,
   0.5,  0.5, -0.5,  1.,  0.,  0.,
   0.5, -0.5, -0.5,  1.,  0.,  0.,
   0.5, -0.5,  0.5,  1.,  0.,  0.,
];

/// Phong material. Shininess is a fraction of 128.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
  pub ambient: [f32; 3],
  pub diffuse: [f32; 3],
  pub specular: [f32; 3],
  pub shininess: f32,
}

pub const COPPER: Material = Material {
  ambient: [0.19125, 0.0735, 0.0225],
  diffuse: [0.7038, 0.27048, 0.0828],
  specular: [0.256777, 0.137622, 0.086014],
  shininess: 0.1,
};

pub const WHITE_PLASTIC: Material = Material {
  ambient: [0., 0., 0.],
  diffuse: [0.55, 0.55, 0.55],
  specular: [0.70, 0.70, 0.70],
  shininess: 0.25,
};

/// Light intensities; the position comes from the [`Controls`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
  pub ambient: [f32; 3],
  pub diffuse: [f32; 3],
  pub specular: [f32; 3],
}

// light lighting the scene
pub const SCENE_LIGHT: Light = Light {
  ambient: [0.6, 0.6, 0.6],
  diffuse: [0.9, 0.9, 0.9],
  specular: [4., 4., 4.],
};

// light as seen by the light cube itself
pub const CUBE_LIGHT: Light = Light {
  ambient: [0.2, 0.2, 0.2],
  diffuse: [0.5, 0.5, 0.5],
  specular: [1., 1., 1.],
};

/// Model matrix of the scene mesh: a unit mesh resting on the ground slab.
pub fn mesh_model() -> Matrix4<f32> {
  Matrix4::from_translation(Vector3::new(0., 0.05, -1.))
}

/// Model matrix of the ground slab: a flattened cube below the mesh.
pub fn ground_model() -> Matrix4<f32> {
  Matrix4::from_nonuniform_scale(10., 0.1, 10.)
    * Matrix4::from_translation(Vector3::new(0., -10., 0.))
}

pub fn upload_light(program: &mut Program<GL33>, position: Point3<f32>, light: &Light) {
  program.set_vec3("light.position", position);
  program.set_vec3("light.ambient", light.ambient);
  program.set_vec3("light.diffuse", light.diffuse);
  program.set_vec3("light.specular", light.specular);
}

pub fn upload_material(program: &mut Program<GL33>, material: &Material) {
  program.set_vec3("material.ambient", material.ambient);
  program.set_vec3("material.diffuse", material.diffuse);
  program.set_vec3("material.specular", material.specular);
  program.set_float("material.shininess", 128. * material.shininess);
}

/// Upload everything a Blinn-Phong program reads. The program must be active.
pub fn configure_phong(
  program: &mut Program<GL33>,
  model: Matrix4<f32>,
  controls: &Controls,
  material: &Material,
) {
  program.set_mat4("model", model);
  program.set_mat4("view", controls.view());
  program.set_mat4("projection", controls.projection());
  program.set_vec3("camera_pos", controls.camera_eye);

  upload_material(program, material);
  upload_light(program, controls.light_pos, &SCENE_LIGHT);
}

/// Draw the light cube at the light position. The program must be active.
pub fn configure_lightcube(program: &mut Program<GL33>, controls: &Controls) {
  program.set_mat4(
    "model",
    Matrix4::from_translation(controls.light_pos - Point3::new(0., 0., 0.)),
  );
  program.set_mat4("view", controls.view());
  program.set_mat4("projection", controls.projection());

  upload_light(program, controls.light_pos, &CUBE_LIGHT);
}

pub fn clear(color: [f32; 4]) {
  unsafe {
    gl::ClearColor(color[0], color[1], color[2], color[3]);
    gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
  }
}

pub fn set_viewport(width: u32, height: u32) {
  unsafe { gl::Viewport(0, 0, width as GLsizei, height as GLsizei) }
}

// distance covered by a single directional action
const MOVE_STEP: f32 = 0.05;
// field of view change for a single scroll unit, in degrees
const FOV_STEP: f32 = 1.;
const FOV_MIN: f32 = 1.;
const FOV_MAX: f32 = 120.;

/// What the directional actions move.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Target {
  CameraEye,
  CameraCenter,
  Light,
}

impl Target {
  fn next(self) -> Self {
    match self {
      Target::CameraEye => Target::CameraCenter,
      Target::CameraCenter => Target::Light,
      Target::Light => Target::CameraEye,
    }
  }
}

/// Scene parameters tweakable at runtime.
///
/// Directional actions move the current [`Target`]; the auxiliary toggle cycles through targets.
/// Vertical scrolling changes the field of view.
#[derive(Clone, Debug, PartialEq)]
pub struct Controls {
  pub camera_eye: Point3<f32>,
  pub camera_center: Point3<f32>,
  pub fov: f32,
  pub light_pos: Point3<f32>,
  pub target: Target,
  pub aspect_ratio: f32,
}

impl Default for Controls {
  fn default() -> Self {
    Controls {
      camera_eye: Point3::new(0., 4., 8.),
      camera_center: Point3::new(0., 0., 0.),
      fov: 45.,
      light_pos: Point3::new(2., 2., 3.5),
      target: Target::CameraEye,
      aspect_ratio: 1280. / 720.,
    }
  }
}

impl Controls {
  /// Apply an action.
  ///
  /// Returns `true` if the action was consumed.
  pub fn handle(&mut self, action: &InputAction) -> bool {
    let delta = match *action {
      InputAction::Left => Vector3::new(-MOVE_STEP, 0., 0.),
      InputAction::Right => Vector3::new(MOVE_STEP, 0., 0.),
      InputAction::Up => Vector3::new(0., MOVE_STEP, 0.),
      InputAction::Down => Vector3::new(0., -MOVE_STEP, 0.),
      InputAction::Forward => Vector3::new(0., 0., -MOVE_STEP),
      InputAction::Backward => Vector3::new(0., 0., MOVE_STEP),

      InputAction::AuxiliaryToggle => {
        self.target = self.target.next();
        log::info!("directional keys now move {:?}", self.target);
        return true;
      }

      InputAction::VScroll { amount } => {
        self.fov = (self.fov - amount * FOV_STEP).max(FOV_MIN).min(FOV_MAX);
        log::info!("fov: {}°", self.fov);
        return true;
      }

      InputAction::Reset => {
        *self = Controls {
          aspect_ratio: self.aspect_ratio,
          ..Controls::default()
        };
        log::info!("controls reset");
        return true;
      }

      InputAction::Resized { width, height } => {
        if width > 0 && height > 0 {
          self.aspect_ratio = width as f32 / height as f32;
        }

        // other consumers (viewport, framebuffers) also care about that one
        return false;
      }

      _ => return false,
    };

    let moved = match self.target {
      Target::CameraEye => &mut self.camera_eye,
      Target::CameraCenter => &mut self.camera_center,
      Target::Light => &mut self.light_pos,
    };
    *moved += delta;

    log::info!("{:?}: ({:.2}, {:.2}, {:.2})", self.target, moved.x, moved.y, moved.z);
    true
  }

  pub fn view(&self) -> Matrix4<f32> {
    Matrix4::look_at_rh(self.camera_eye, self.camera_center, Vector3::unit_y())
  }

  pub fn projection(&self) -> Matrix4<f32> {
    perspective(Deg(self.fov), self.aspect_ratio, Z_NEAR, Z_FAR)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn directional_actions_move_the_target() {
    let mut controls = Controls::default();

    assert!(controls.handle(&InputAction::Up));
    assert!(controls.handle(&InputAction::Up));
    assert!((controls.camera_eye.y - 4.1).abs() < 1e-5);

    controls.handle(&InputAction::AuxiliaryToggle);
    controls.handle(&InputAction::AuxiliaryToggle);
    assert_eq!(controls.target, Target::Light);

    controls.handle(&InputAction::Backward);
    assert!((controls.light_pos.z - 3.55).abs() < 1e-5);
    assert!((controls.camera_eye.y - 4.1).abs() < 1e-5);
  }

  #[test]
  fn fov_stays_in_range() {
    let mut controls = Controls::default();

    controls.handle(&InputAction::VScroll { amount: 2. });
    assert_eq!(controls.fov, 43.);

    controls.handle(&InputAction::VScroll { amount: -1000. });
    assert_eq!(controls.fov, FOV_MAX);

    controls.handle(&InputAction::VScroll { amount: 1000. });
    assert_eq!(controls.fov, FOV_MIN);
  }

  #[test]
  fn reset_keeps_the_aspect_ratio() {
    let mut controls = Controls::default();

    assert!(!controls.handle(&InputAction::Resized {
      width: 800,
      height: 800
    }));
    controls.handle(&InputAction::Left);
    controls.handle(&InputAction::VScroll { amount: 5. });
    controls.handle(&InputAction::Reset);

    assert_eq!(
      controls,
      Controls {
        aspect_ratio: 1.,
        ..Controls::default()
      }
    );
  }

  #[test]
  fn degenerate_sizes_are_ignored() {
    let mut controls = Controls::default();
    controls.handle(&InputAction::Resized {
      width: 0,
      height: 0,
    });

    assert_eq!(controls.aspect_ratio, 1280. / 720.);
  }

  #[test]
  fn unrelated_actions_are_not_consumed() {
    let mut controls = Controls::default();

    assert!(!controls.handle(&InputAction::MainToggle));
    assert!(!controls.handle(&InputAction::Quit));
    assert_eq!(controls, Controls::default());
  }

  #[test]
  fn cube_indices_address_the_corners() {
    assert!(CUBE_INDICES.iter().all(|&i| (i as usize) < CUBE_CORNERS.len() / 3));
    assert_eq!(CUBE_WITH_NORMALS.len() / 6, 36);
  }
}
