//! OpenGL backends.
//!
//! This crate exports an [OpenGL](https://www.khronos.org/opengl/) backend for lumen. The backend
//! type is [`GL33`]; a windowing crate creates it once the OpenGL context is current and the
//! function pointers are loaded.

pub mod gl33;

pub use gl33::GL33;
