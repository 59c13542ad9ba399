//! Backend interfacing.
//!
//! Almost everything declared in this module and its submodules is `unsafe`. An end-user **is not
//! supposed to implement any of this.** Library authors might use some traits from here, but
//! they are not supposed to use them directly either; the public API in [`crate::shader`] wraps
//! them.
//!
//! # Conventions
//!
//! Backend types expose *representation* types (the `*Repr` associated types). Those are the raw
//! GPU objects, without any lifetime management: the public wrappers call the `destroy_*`
//! functions from their `Drop` implementations.

pub mod shader;
