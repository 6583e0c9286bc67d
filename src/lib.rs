//! DetForge - Bit-Reproducible Quantized Matvec Kernel
//!
//! The core operator of an integer-quantized inference step: a
//! group-quantized int8 matrix-vector product whose f32 output is
//! bit-identical whether the arithmetic runs on native hardware floating
//! point or through a software IEEE-754 implementation. The same
//! computation can then be independently re-executed and verified by a
//! third party inside a replayable compute environment.
//!
//! Three pieces:
//! - `backend`: multiply / fused-multiply-add / int-to-float, all
//!   round-to-nearest-even, with native and soft-float implementations
//! - `kernels::matvec`: the dot-product kernel, exact integer accumulation
//!   per scale group, strict group ordering, rayon across rows
//! - `completion`: the injected end-of-computation signal

#![allow(clippy::too_many_arguments)] // Kernel entry mirrors the flat buffer ABI
#![allow(clippy::needless_range_loop)] // Clearer for the accumulation loops

pub mod backend;
pub mod completion;
pub mod error;
pub mod kernels;
pub mod logging;

pub use backend::{
    ensure_round_to_nearest, rounding_mode_is_nearest_even, DefaultBackend, FloatBackend,
    NativeBackend, SoftBackend,
};
pub use completion::{CompletionSink, NoopSink};
pub use error::{DetForgeError, ErrorCategory, ForgeResult, MAX_GROUP_SIZE};
pub use kernels::matvec::{matvec, matvec_default, matvec_with_completion};
pub use logging::{init_logging_default, init_logging_from_env};

#[cfg(target_arch = "riscv64")]
pub use completion::HtifSink;
