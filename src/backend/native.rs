//! Native hardware floating-point backend
//!
//! On riscv64 (the guest side of the execution environment) every primitive
//! is a single instruction carrying the static `rne` rounding-mode suffix,
//! so the dynamic `frm` register never influences a result. On other
//! architectures the rounding mode lives in a control register that some
//! environments reconfigure, so it must be requested rather than assumed:
//! [`ensure_round_to_nearest`] programs round-to-nearest-even (and disables
//! flush-to-zero) before the kernel runs, and
//! [`rounding_mode_is_nearest_even`] probes the live environment with known
//! halfway cases.

use std::hint::black_box;

use super::FloatBackend;

/// Hardware floating-point implementation of the arithmetic contract.
pub struct NativeBackend;

#[cfg(target_arch = "riscv64")]
impl FloatBackend for NativeBackend {
    #[inline]
    fn mul(a: f32, b: f32) -> f32 {
        let r: f32;
        unsafe {
            core::arch::asm!(
                "fmul.s {r}, {a}, {b}, rne",
                r = out(freg) r,
                a = in(freg) a,
                b = in(freg) b,
                options(pure, nomem, nostack),
            );
        }
        r
    }

    #[inline]
    fn fma(a: f32, b: f32, c: f32) -> f32 {
        let r: f32;
        unsafe {
            core::arch::asm!(
                "fmadd.s {r}, {a}, {b}, {c}, rne",
                r = out(freg) r,
                a = in(freg) a,
                b = in(freg) b,
                c = in(freg) c,
                options(pure, nomem, nostack),
            );
        }
        r
    }

    #[inline]
    fn i32_to_f32(x: i32) -> f32 {
        let r: f32;
        unsafe {
            core::arch::asm!(
                "fcvt.s.w {r}, {x}, rne",
                r = out(freg) r,
                x = in(reg) x,
                options(pure, nomem, nostack),
            );
        }
        r
    }
}

#[cfg(not(target_arch = "riscv64"))]
impl FloatBackend for NativeBackend {
    #[inline]
    fn mul(a: f32, b: f32) -> f32 {
        a * b
    }

    #[inline]
    fn fma(a: f32, b: f32, c: f32) -> f32 {
        // Correctly rounded single-step fma: the fused instruction where the
        // target has one, a correctly rounded software path otherwise.
        a.mul_add(b, c)
    }

    #[inline]
    fn i32_to_f32(x: i32) -> f32 {
        // Rust defines int-to-float casts as round-to-nearest-even.
        x as f32
    }
}

/// Program the floating-point environment for round-to-nearest-even.
///
/// Also clears flush-to-zero / denormals-are-zero so subnormal results keep
/// their IEEE values. On riscv64 this is a no-op because every instruction
/// the backend issues encodes `rne` statically. The function is cheap and
/// idempotent; the kernel entry point calls it on every invocation.
pub fn ensure_round_to_nearest() {
    #[cfg(target_arch = "x86_64")]
    {
        // MXCSR: RC = bits 13..14, FTZ = bit 15, DAZ = bit 6.
        const MXCSR_ROUND_MASK: u32 = 0x6000;
        const MXCSR_FTZ: u32 = 0x8000;
        const MXCSR_DAZ: u32 = 0x0040;

        let mut csr: u32 = 0;
        unsafe {
            core::arch::asm!(
                "stmxcsr [{ptr}]",
                ptr = in(reg) &mut csr,
                options(nostack),
            );
        }
        let wanted = csr & !(MXCSR_ROUND_MASK | MXCSR_FTZ | MXCSR_DAZ);
        if wanted != csr {
            unsafe {
                core::arch::asm!(
                    "ldmxcsr [{ptr}]",
                    ptr = in(reg) &wanted,
                    options(nostack, readonly),
                );
            }
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        // FPCR: RMode = bits 22..23 (0b00 = nearest-even), FZ = bit 24,
        // FZ16 = bit 19.
        const FPCR_RMODE_MASK: u64 = 0b11 << 22;
        const FPCR_FZ: u64 = 1 << 24;
        const FPCR_FZ16: u64 = 1 << 19;

        let mut fpcr: u64;
        unsafe {
            core::arch::asm!("mrs {r}, fpcr", r = out(reg) fpcr, options(nomem, nostack));
        }
        let wanted = fpcr & !(FPCR_RMODE_MASK | FPCR_FZ | FPCR_FZ16);
        if wanted != fpcr {
            unsafe {
                core::arch::asm!("msr fpcr, {r}", r = in(reg) wanted, options(nomem, nostack));
            }
        }
    }
}

/// Probe whether the live floating-point environment rounds to nearest-even.
///
/// Exercises two halfway cases whose results differ under every directed
/// rounding mode: with m = 1 + 2^-23 (odd mantissa), m + 2^-24 ties and must
/// round *up* to the even neighbour, and -m - 2^-24 must round *down* to its
/// even neighbour. Round-toward-zero, round-up and round-down each fail one
/// of the two checks.
pub fn rounding_mode_is_nearest_even() -> bool {
    let odd = black_box(1.0f32 + f32::EPSILON);
    let half_ulp = black_box(f32::EPSILON / 2.0);
    let even_above = 1.0f32 + 2.0 * f32::EPSILON;

    let up = black_box(odd) + half_ulp;
    let down = black_box(-odd) - half_ulp;

    up.to_bits() == even_above.to_bits() && down.to_bits() == (-even_above).to_bits()
}
