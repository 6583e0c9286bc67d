//! Group-quantized int8 matrix-vector product
//!
//! # Data layout
//! - `xq`/`xs`: input vector, `n` int8 values + one f32 scale per group of
//!   `gs` elements (`n/gs` scales)
//! - `wq`/`ws`: weight matrix, `d` rows of the same layout flattened
//!   row-major (`d*n` values, `d*(n/gs)` scales)
//! - `xout`: `d` f32 values, fully overwritten on every call
//!
//! # Numeric contract
//! Each group's dot product is accumulated in exact i32 arithmetic before
//! any floating point is applied. The float accumulation per row is
//! `sum = fma(i32_to_f32(ival), mul(xs[g], ws[g']), sum)` with groups
//! processed in strictly increasing index order. Float addition is not
//! associative, so that order is load-bearing: tree reductions or SIMD lane
//! reordering would change output bits and break replay verification.
//!
//! Rows are independent and run as a rayon parallel iterator over disjoint
//! output slots; inter-row scheduling has no effect on the result.

use rayon::prelude::*;
use tracing::debug;

use crate::backend::{ensure_round_to_nearest, DefaultBackend, FloatBackend};
use crate::completion::CompletionSink;
use crate::error::{DetForgeError, ForgeResult, MAX_GROUP_SIZE};

/// Validate the shape preconditions of [`matvec`].
///
/// The reference design treats a malformed call as undefined behavior; here
/// it is rejected synchronously, before any element of `xout` is touched.
fn validate_shapes(
    xout: &[f32],
    xq: &[i8],
    xs: &[f32],
    wq: &[i8],
    ws: &[f32],
    n: usize,
    d: usize,
    gs: usize,
) -> ForgeResult<()> {
    if n == 0 {
        return Err(DetForgeError::ZeroDimension { name: "n" });
    }
    if d == 0 {
        return Err(DetForgeError::ZeroDimension { name: "d" });
    }
    if gs == 0 {
        return Err(DetForgeError::ZeroDimension { name: "gs" });
    }
    if gs > MAX_GROUP_SIZE {
        return Err(DetForgeError::GroupSizeTooLarge {
            gs,
            max: MAX_GROUP_SIZE,
        });
    }
    if n % gs != 0 {
        return Err(DetForgeError::GroupSizeIndivisible { n, gs });
    }

    let groups = n / gs;
    let weight_len = d
        .checked_mul(n)
        .ok_or_else(|| DetForgeError::Internal("d * n overflows usize".to_string()))?;
    let weight_scales = d * groups;

    let checks: [(&'static str, usize, usize); 5] = [
        ("xq", n, xq.len()),
        ("xs", groups, xs.len()),
        ("wq", weight_len, wq.len()),
        ("ws", weight_scales, ws.len()),
        ("xout", d, xout.len()),
    ];
    for (name, expected, actual) in checks {
        if expected != actual {
            return Err(DetForgeError::BufferLengthMismatch {
                name,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// One output row: integer group dot products, then scale and accumulate
/// through the backend primitives, groups in increasing index order.
fn dot_row<B: FloatBackend>(
    xq: &[i8],
    xs: &[f32],
    wq_row: &[i8],
    ws_row: &[f32],
    gs: usize,
) -> f32 {
    let mut sum = 0.0f32;
    let groups = xq.chunks_exact(gs).zip(wq_row.chunks_exact(gs));
    for (g, (input, weights)) in groups.enumerate() {
        // Exact within the group: no rounding until the whole group is
        // reduced. Bounded by gs * 128 * 128; validation caps gs at
        // MAX_GROUP_SIZE so the worst case stays at or below i32::MAX.
        let mut ival: i32 = 0;
        for k in 0..gs {
            ival += input[k] as i32 * weights[k] as i32;
        }
        let scale = B::mul(xs[g], ws_row[g]);
        sum = B::fma(B::i32_to_f32(ival), scale, sum);
    }
    sum
}

/// Compute the group-quantized matrix-vector product `xout = W * x`.
///
/// `xout[i]` receives the dequantized dot product of weight row `i` with the
/// input vector. Repeated calls with identical inputs produce bit-identical
/// output regardless of thread count, and the `NativeBackend` and
/// `SoftBackend` instantiations agree bit for bit. Round-to-nearest-even is
/// requested on every worker thread before it computes a row, so a
/// differently-configured floating-point environment cannot leak into the
/// result.
///
/// Returns a precondition-violation error (and writes nothing) if the
/// shapes are inconsistent; see [`validate_shapes`] conditions in the
/// module documentation.
pub fn matvec<B: FloatBackend>(
    xout: &mut [f32],
    xq: &[i8],
    xs: &[f32],
    wq: &[i8],
    ws: &[f32],
    n: usize,
    d: usize,
    gs: usize,
) -> ForgeResult<()> {
    validate_shapes(xout, xq, xs, wq, ws, n, d, gs)?;
    ensure_round_to_nearest();

    let groups = n / gs;
    debug!(n, d, gs, groups, "dispatching quantized matvec");

    xout.par_iter_mut().enumerate().for_each(|(i, out)| {
        // The rounding-mode environment is per thread; rows run on pool
        // workers whose control registers the call above never touched.
        ensure_round_to_nearest();
        let wq_row = &wq[i * n..(i + 1) * n];
        let ws_row = &ws[i * groups..(i + 1) * groups];
        *out = dot_row::<B>(xq, xs, wq_row, ws_row, gs);
    });

    Ok(())
}

/// [`matvec`] followed by the completion signal.
///
/// This is the entry-point contract of the execution environment: the sink
/// fires exactly once, strictly after every element of `xout` is written,
/// and never fires when validation rejects the input.
pub fn matvec_with_completion<B: FloatBackend, S: CompletionSink>(
    xout: &mut [f32],
    xq: &[i8],
    xs: &[f32],
    wq: &[i8],
    ws: &[f32],
    n: usize,
    d: usize,
    gs: usize,
    sink: &S,
) -> ForgeResult<()> {
    matvec::<B>(xout, xq, xs, wq, ws, n, d, gs)?;
    sink.signal();
    Ok(())
}

/// [`matvec`] on the build-selected backend.
pub fn matvec_default(
    xout: &mut [f32],
    xq: &[i8],
    xs: &[f32],
    wq: &[i8],
    ws: &[f32],
    n: usize,
    d: usize,
    gs: usize,
) -> ForgeResult<()> {
    matvec::<DefaultBackend>(xout, xq, xs, wq, ws, n, d, gs)
}
