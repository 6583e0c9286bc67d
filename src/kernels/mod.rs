//! Computational kernels
//!
//! - `matvec`: group-quantized int8 matrix-vector product, the single
//!   operation this crate exists to make bit-reproducible.

pub mod matvec;

pub use matvec::{matvec, matvec_with_completion};
