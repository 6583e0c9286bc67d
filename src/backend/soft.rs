//! Software floating-point backend
//!
//! Implements the arithmetic contract on top of `rustc_apfloat`, a pure-Rust
//! IEEE-754 implementation. This is the replay path: a verifier re-executes
//! the kernel on a host whose hardware is not trusted to match the guest,
//! and the software arithmetic must reproduce the native backend bit for bit
//! on every finite operand the kernel can produce.
//!
//! Every primitive rounds with `Round::NearestTiesToEven` explicitly; no
//! global state is consulted.

use rustc_apfloat::ieee::Single;
use rustc_apfloat::{Float, Round};

use super::FloatBackend;

/// Software IEEE-754 implementation of the arithmetic contract.
pub struct SoftBackend;

#[inline]
fn to_single(x: f32) -> Single {
    Single::from_bits(x.to_bits() as u128)
}

#[inline]
fn from_single(s: Single) -> f32 {
    f32::from_bits(s.to_bits() as u32)
}

impl FloatBackend for SoftBackend {
    #[inline]
    fn mul(a: f32, b: f32) -> f32 {
        let r = to_single(a).mul_r(to_single(b), Round::NearestTiesToEven);
        from_single(r.value)
    }

    #[inline]
    fn fma(a: f32, b: f32, c: f32) -> f32 {
        let r = to_single(a).mul_add_r(to_single(b), to_single(c), Round::NearestTiesToEven);
        from_single(r.value)
    }

    #[inline]
    fn i32_to_f32(x: i32) -> f32 {
        let r = Single::from_i128_r(x as i128, Round::NearestTiesToEven);
        from_single(r.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_mul_basic() {
        assert_eq!(SoftBackend::mul(1.5, 2.0), 3.0);
        assert_eq!(SoftBackend::mul(-0.25, 4.0), -1.0);
    }

    #[test]
    fn test_soft_mul_rounds_inexact_product() {
        // (1 + eps)^2 = 1 + 2eps + eps^2; the eps^2 term is below half an
        // ulp, so the product rounds down to 1 + 2eps.
        let a = 1.0f32 + f32::EPSILON;
        assert_eq!(SoftBackend::mul(a, a), 1.0 + 2.0 * f32::EPSILON);
    }

    #[test]
    fn test_soft_mul_preserves_signed_zero() {
        assert_eq!(SoftBackend::mul(-0.0, 5.0).to_bits(), (-0.0f32).to_bits());
        assert_eq!(SoftBackend::mul(0.0, -5.0).to_bits(), (-0.0f32).to_bits());
    }

    #[test]
    fn test_soft_mul_subnormal_result() {
        // f32::MIN_POSITIVE / 2 is subnormal; flush-to-zero would lose it.
        let r = SoftBackend::mul(f32::MIN_POSITIVE, 0.5);
        assert!(r > 0.0);
        assert_eq!(r, f32::MIN_POSITIVE / 2.0);
    }

    #[test]
    fn test_soft_i32_to_f32_exact_below_2_24() {
        for x in [-16_777_216, -12_345, -1, 0, 1, 7, 16_777_216] {
            assert_eq!(SoftBackend::i32_to_f32(x), x as f32);
        }
    }

    #[test]
    fn test_soft_fma_accumulates() {
        // 3 * 2 + 4 = 10, exact at every step.
        assert_eq!(SoftBackend::fma(3.0, 2.0, 4.0), 10.0);
    }
}
