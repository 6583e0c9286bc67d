//! Arithmetic backend module
//!
//! The kernel performs exactly three floating-point operations: multiply,
//! fused multiply-add, and int32-to-float32 conversion. All three round to
//! nearest, ties to even. Two interchangeable implementations exist:
//!
//! - `native`: the target processor's hardware floating-point instructions
//! - `soft`: software IEEE-754 arithmetic via `rustc_apfloat`
//!
//! The contract invariant is bit-for-bit equivalence: for every finite
//! operand triple reachable from int8 x int8 group accumulation, both
//! backends return identical bit patterns. The kernel depends only on the
//! [`FloatBackend`] trait; the concrete choice is a build-time decision via
//! the `soft-float` cargo feature.

pub mod native;
pub mod soft;

pub use native::{ensure_round_to_nearest, rounding_mode_is_nearest_even, NativeBackend};
pub use soft::SoftBackend;

/// The three floating-point primitives the kernel is built from.
///
/// Every operation is IEEE-754 single precision with round-to-nearest-even.
/// Implementations are stateless; the kernel invokes them through the type
/// parameter only.
pub trait FloatBackend {
    /// `a * b`, rounded once.
    fn mul(a: f32, b: f32) -> f32;

    /// `a * b + c` computed as a single rounding step.
    fn fma(a: f32, b: f32, c: f32) -> f32;

    /// Exact i32 widened to f32, rounded to nearest-even when the value
    /// has more than 24 significant bits.
    fn i32_to_f32(x: i32) -> f32;
}

/// Backend linked into the kernel for this build.
///
/// The default build uses hardware floating point (the guest/native side of
/// the execution environment); the `soft-float` feature switches the kernel
/// to the software implementation (the host/replay side). Both types are
/// always compiled so equivalence tests can compare them directly.
#[cfg(feature = "soft-float")]
pub type DefaultBackend = SoftBackend;

#[cfg(not(feature = "soft-float"))]
pub type DefaultBackend = NativeBackend;

#[cfg(test)]
mod tests {
    use super::*;

    // The fused multiply-add must round once, not twice. With
    // a = 1 + 2^-23 and b = 1 - 2^-23 the exact product is 1 - 2^-46:
    // a separate multiply rounds it to 1.0, so mul-then-add of -1.0 gives
    // exactly 0.0, while a true fma yields -2^-46.
    fn assert_fused<B: FloatBackend>() {
        let a = 1.0f32 + f32::EPSILON;
        let b = 1.0f32 - f32::EPSILON;
        let fused = B::fma(a, b, -1.0);
        assert_eq!(fused, -(2.0f32.powi(-46)));
        assert_ne!(fused, 0.0);
        assert_eq!(B::mul(a, b), 1.0);
    }

    #[test]
    fn test_native_fma_is_fused() {
        assert_fused::<NativeBackend>();
    }

    #[test]
    fn test_soft_fma_is_fused() {
        assert_fused::<SoftBackend>();
    }

    fn assert_conversion_rounds_to_even<B: FloatBackend>() {
        // 2^24 + 1 is halfway between 2^24 and 2^24 + 2; ties go to the
        // even mantissa, i.e. down.
        assert_eq!(B::i32_to_f32(16_777_217), 16_777_216.0);
        // 2^24 + 3 is halfway as well, but the even neighbour is above.
        assert_eq!(B::i32_to_f32(16_777_219), 16_777_220.0);
        // i32::MAX rounds up to 2^31; i32::MIN is exact.
        assert_eq!(B::i32_to_f32(i32::MAX), 2_147_483_648.0);
        assert_eq!(B::i32_to_f32(i32::MIN), -2_147_483_648.0);
        assert_eq!(B::i32_to_f32(0).to_bits(), 0.0f32.to_bits());
    }

    #[test]
    fn test_native_conversion_rounding() {
        assert_conversion_rounds_to_even::<NativeBackend>();
    }

    #[test]
    fn test_soft_conversion_rounding() {
        assert_conversion_rounds_to_even::<SoftBackend>();
    }

    #[test]
    fn test_default_backend_matches_feature() {
        // Whichever backend is selected, it must agree with both concrete
        // implementations on a representative operation.
        let r = DefaultBackend::fma(3.0, 0.5, 0.25);
        assert_eq!(r.to_bits(), NativeBackend::fma(3.0, 0.5, 0.25).to_bits());
        assert_eq!(r.to_bits(), SoftBackend::fma(3.0, 0.5, 0.25).to_bits());
    }
}
