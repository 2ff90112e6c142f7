//! Pixel arithmetic and overlap scoring kernels.

use crate::arena::Arena;
use crate::ImageView;

pub mod pixel;
pub mod score;

pub use score::{overlap_score, EdgeAwareScorer};

/// Scores how well `source` agrees with `target` when placed at an offset.
///
/// Higher is better. Placements with no spatial overlap score zero.
pub trait OverlapKernel {
    fn score(
        &self,
        arena: &Arena,
        target: &ImageView,
        source: &ImageView,
        offset_x: i32,
        offset_y: i32,
    ) -> u64;
}
