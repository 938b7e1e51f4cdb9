//! Per-cell nearest-wins depth test
//!
//! Depth is stored as inverse depth, so nearer means larger. A sample must be
//! strictly nearer than what the cell holds to replace it: on equal depth the
//! sample processed first stays. That tie-break is arbitrary and only kept
//! stable so output is reproducible.

use crate::buffer_pool::{CellShade, FrameBuffers};

/// Depth-test one sample against cell `idx`.
///
/// `shade` runs only when the sample wins, so hidden samples skip lighting.
/// Returns true if the cell was overwritten.
#[inline]
pub fn resolve<F>(buffers: &mut FrameBuffers<'_>, idx: usize, inv_depth: f64, shade: F) -> bool
where
    F: FnOnce() -> CellShade,
{
    if inv_depth <= buffers.depth[idx] {
        return false;
    }
    let shade = shade();
    buffers.write(idx, inv_depth, &shade);
    true
}
