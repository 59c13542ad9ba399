//! # A thin shader-program core for OpenGL tutorial steps
//!
//! lumen is the small reusable part of a series of incremental rendering programs. Every step
//! (triangle, cube, Phong lighting, shadow mapping, post-processing…) is its own program that
//! talks to the graphics API directly; the only thing they all share is the way a shader program
//! is built from two source files and fed with uniforms. That part lives here.
//!
//! # What’s included?
//!
//! - **Graphics context**: [`context::GraphicsContext`] gives access to a _backend_, the object
//!   that actually speaks to the GPU. Contexts are created by windowing crates (see
//!   `lumen-glfw`).
//! - **Shader programs**: [`shader::Program`] owns a linked pipeline made of a vertex stage and a
//!   fragment stage. Programs are built with a [`shader::ProgramBuilder`], obtained with
//!   [`context::GraphicsContext::new_shader_program`].
//! - **Uniforms**: uniforms are looked up by name and uploaded with [`shader::Program::set`] and
//!   its typed helpers (`set_mat4`, `set_vec3`, `set_float`, `set_int`). Unknown names are
//!   silently ignored.
//! - **Mesh assets**: [`mesh::Mesh`] reads the plain-text geometry format used by the tutorial
//!   steps (a triangle count followed by position / normal triples).
//!
//! # Building a program
//!
//! Building a program never fails because a single stage doesn’t compile: the compiler log, the
//! offending file and its source are written to a diagnostic stream (stderr by default) and the
//! stage is left out of the program. Linking, however, must succeed. Use
//! [`shader::ProgramBuilder::from_paths`] if you want to handle link errors yourself or
//! [`shader::ProgramBuilder::from_paths_or_exit`] if a program that doesn’t link should end the
//! process.
//!
//! # Backends
//!
//! The [`backend`] module contains the traits a backend must implement. They are `unsafe` to
//! implement and to call, as they manipulate raw GPU objects. End users never need them;
//! `lumen-gl` implements them for OpenGL 3.3.

pub mod backend;
pub mod context;
pub mod mesh;
pub mod shader;
