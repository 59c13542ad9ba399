//! Plain-text mesh assets.
//!
//! The format is whitespace-separated: a triangle count `N` comes first, followed by `3 × N`
//! vertices, each one being a position (three floats) followed by a normal (three floats). Line
//! breaks carry no meaning. Anything after the last announced vertex is ignored.
//!
//! ```text
//! 1
//! 0 0 0  0 0 1
//! 1 0 0  0 0 1
//! 0 1 0  0 0 1
//! ```

use std::error;
use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

/// Number of floats describing a single vertex (position, then normal).
pub const FLOATS_PER_VERTEX: usize = 6;

/// A mesh vertex, laid out as it is uploaded to vertex buffers.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshVertex {
  /// Position in model space.
  pub position: [f32; 3],
  /// Normal in model space.
  pub normal: [f32; 3],
}

/// A triangle soup read from a mesh asset.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
  vertices: Vec<MeshVertex>,
}

impl Mesh {
  /// Read a mesh asset from a file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, MeshError> {
    let content = fs::read_to_string(path)?;
    content.parse()
  }

  /// Read a mesh asset from any reader.
  pub fn from_reader(mut reader: impl Read) -> Result<Self, MeshError> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    content.parse()
  }

  /// All the vertices, three per triangle.
  pub fn vertices(&self) -> &[MeshVertex] {
    &self.vertices
  }

  /// Number of vertices.
  pub fn vertex_count(&self) -> usize {
    self.vertices.len()
  }

  /// Number of triangles.
  pub fn triangle_count(&self) -> usize {
    self.vertices.len() / 3
  }

  /// Size in bytes of the vertex data.
  pub fn byte_len(&self) -> usize {
    self.vertices.len() * std::mem::size_of::<MeshVertex>()
  }
}

impl FromStr for Mesh {
  type Err = MeshError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut tokens = s.split_whitespace();

    let count_token = tokens.next().ok_or(MeshError::MissingTriangleCount)?;
    let triangle_count = count_token
      .parse::<usize>()
      .map_err(|_| MeshError::InvalidTriangleCount(count_token.to_owned()))?;

    let expected = triangle_count
      .checked_mul(3)
      .ok_or_else(|| MeshError::InvalidTriangleCount(count_token.to_owned()))?;

    // a vertex takes at least 2 bytes per component (digit and separator)
    let fitting = s.len() / (2 * FLOATS_PER_VERTEX);
    let mut vertices = Vec::with_capacity(expected.min(fitting));
    let mut components = [0f32; FLOATS_PER_VERTEX];

    for vertex in 0..expected {
      for (i, component) in components.iter_mut().enumerate() {
        let token = tokens.next().ok_or(MeshError::Truncated {
          expected,
          found: vertex,
        })?;

        *component = token.parse().map_err(|_| MeshError::InvalidComponent {
          vertex,
          component: i,
          token: token.to_owned(),
        })?;
      }

      vertices.push(MeshVertex {
        position: [components[0], components[1], components[2]],
        normal: [components[3], components[4], components[5]],
      });
    }

    Ok(Mesh { vertices })
  }
}

/// Errors that can happen while reading a mesh asset.
#[non_exhaustive]
#[derive(Debug)]
pub enum MeshError {
  /// The asset could not be opened or read.
  Io(io::Error),
  /// The asset is empty.
  MissingTriangleCount,
  /// The first token is not a triangle count.
  InvalidTriangleCount(String),
  /// A vertex component is not a number.
  InvalidComponent {
    /// Index of the vertex.
    vertex: usize,
    /// Index of the component in the vertex (0–2 position, 3–5 normal).
    component: usize,
    /// Offending token.
    token: String,
  },
  /// The asset ends before the announced number of vertices.
  Truncated {
    /// Number of vertices announced by the triangle count.
    expected: usize,
    /// Number of complete vertices found.
    found: usize,
  },
}

impl fmt::Display for MeshError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      MeshError::Io(ref e) => write!(f, "cannot read mesh: {}", e),
      MeshError::MissingTriangleCount => f.write_str("empty mesh asset"),
      MeshError::InvalidTriangleCount(ref t) => write!(f, "invalid triangle count: {:?}", t),
      MeshError::InvalidComponent {
        vertex,
        component,
        ref token,
      } => write!(
        f,
        "invalid component {} of vertex {}: {:?}",
        component, vertex, token
      ),
      MeshError::Truncated { expected, found } => write!(
        f,
        "truncated mesh: {} vertices announced, {} found",
        expected, found
      ),
    }
  }
}

impl error::Error for MeshError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      MeshError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for MeshError {
  fn from(e: io::Error) -> Self {
    MeshError::Io(e)
  }
}
