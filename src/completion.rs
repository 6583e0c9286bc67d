//! Completion signal
//!
//! The execution environment needs a deterministic end-of-computation
//! marker: a single side-effecting notification fired once, after every
//! element of the output vector has been written. It is modelled as an
//! injected sink capability so the kernel stays testable without a real
//! execution environment attached.
//!
//! On the host the signal is a no-op ([`NoopSink`]); on the riscv64 guest it
//! is the environment-specific halt-request store ([`HtifSink`]).

/// Single-shot end-of-computation notification.
///
/// The kernel fires this exactly once per successful invocation, strictly
/// after the full output vector is written. It never fires when input
/// validation rejects the call.
pub trait CompletionSink {
    /// Notify the execution environment that the output is final.
    fn signal(&self);
}

/// Host-side sink: computation end needs no announcement.
pub struct NoopSink;

impl CompletionSink for NoopSink {
    #[inline]
    fn signal(&self) {}
}

/// Guest-side sink: requests a machine halt through the host-target
/// interface device.
#[cfg(target_arch = "riscv64")]
pub struct HtifSink;

#[cfg(target_arch = "riscv64")]
impl CompletionSink for HtifSink {
    fn signal(&self) {
        // HTIF halt register; writing 1 stops the machine.
        const HTIF_HALT: *mut u64 = 0x4000_8000 as *mut u64;
        unsafe { core::ptr::write_volatile(HTIF_HALT, 1) };
    }
}
