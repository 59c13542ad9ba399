//! Shader type wrappers.
//!
//! These types are used, mostly, to be passed to shaders as uniform data. They are plain arrays
//! with a nominal type on top, so that backends know which GPU type to upload. Matrices are
//! column-major, as `cgmath` and GLSL store them.

use std::ops::{Deref, DerefMut};

macro_rules! impl_array_wrapper {
  ($(#[$attr:meta])* $name:ident, $repr:ty, $comp:ty, ($($arg:ident),+)) => {
    $(#[$attr])*
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct $name<T>(pub $repr);

    impl<T> $name<T> {
      /// Create a new value from its components.
      pub const fn new($($arg: $comp),+) -> Self {
        Self([$($arg),+])
      }
    }

    impl<T> From<$repr> for $name<T> {
      fn from(a: $repr) -> Self {
        $name(a)
      }
    }

    impl<T> From<$name<T>> for $repr {
      fn from($name(a): $name<T>) -> Self {
        a
      }
    }

    impl<T> AsRef<$repr> for $name<T> {
      fn as_ref(&self) -> &$repr {
        &self.0
      }
    }

    impl<T> Deref for $name<T> {
      type Target = $repr;

      fn deref(&self) -> &Self::Target {
        &self.0
      }
    }

    impl<T> DerefMut for $name<T> {
      fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
      }
    }
  };
}

impl_array_wrapper!(
  /// A 2 dimensional vector, akin to a `[T; 2]`.
  Vec2, [T; 2], T, (x, y)
);

impl_array_wrapper!(
  /// A 3 dimensional vector, akin to a `[T; 3]`.
  Vec3, [T; 3], T, (x, y, z)
);

impl_array_wrapper!(
  /// A 4 dimensional vector, akin to a `[T; 4]`.
  Vec4, [T; 4], T, (x, y, z, w)
);

impl_array_wrapper!(
  /// A 3×3 matrix, given as its three columns.
  Mat33, [[T; 3]; 3], [T; 3], (c0, c1, c2)
);

impl_array_wrapper!(
  /// A 4×4 matrix, given as its four columns.
  Mat44, [[T; 4]; 4], [T; 4], (c0, c1, c2, c3)
);

impl Mat44<f32> {
  /// The identity matrix.
  pub const IDENTITY: Self = Mat44([
    [1., 0., 0., 0.],
    [0., 1., 0., 0.],
    [0., 0., 1., 0.],
    [0., 0., 0., 1.],
  ]);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn vec3_derefs_to_array() {
    let mut v = Vec3::new(1., 2., 3.);
    v[2] = 4.;
    assert_eq!(*v, [1., 2., 4.]);
  }

  #[test]
  fn mat44_is_column_major() {
    let m: Mat44<f32> = [
      [1., 0., 0., 0.],
      [0., 1., 0., 0.],
      [0., 0., 1., 0.],
      [5., 6., 7., 1.],
    ]
    .into();

    // translation lives in the last column
    assert_eq!(m[3], [5., 6., 7., 1.]);
    assert_ne!(m, Mat44::IDENTITY);
  }
}
