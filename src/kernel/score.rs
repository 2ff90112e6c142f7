//! Edge-aware overlap scoring.
//!
//! The score sums per-pixel color similarity over the overlap of two images,
//! but only at positions where both images show local contrast: a pixel
//! counts when it differs enough from its left neighbor in its own image, in
//! the target and in the source independently. Flat backgrounds therefore
//! contribute nothing and cannot outvote a handful of aligned edges.

use crate::arena::Arena;
use crate::geometry::{clip_in_source, Rect};
use crate::kernel::pixel::{similarity, COLOR_CHANNELS};
use crate::kernel::OverlapKernel;
use crate::ImageView;

/// Default per-channel tolerance under which neighbors count as flat.
pub const DEFAULT_FLAT_TOLERANCE: u32 = 32;

/// Scalar edge-aware scorer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeAwareScorer {
    contrast_limit: u32,
}

impl EdgeAwareScorer {
    /// Creates a scorer treating neighbors within `flat_tolerance` per channel
    /// as flat. The contrast limit is `(255 - flat_tolerance) * 3`.
    pub fn new(flat_tolerance: u32) -> Self {
        let tolerance = flat_tolerance.min(255);
        Self {
            contrast_limit: (255 - tolerance) * COLOR_CHANNELS as u32,
        }
    }

    /// Neighbor similarity at or above this value marks a flat position.
    pub fn contrast_limit(&self) -> u32 {
        self.contrast_limit
    }
}

impl Default for EdgeAwareScorer {
    fn default() -> Self {
        Self::new(DEFAULT_FLAT_TOLERANCE)
    }
}

impl OverlapKernel for EdgeAwareScorer {
    fn score(
        &self,
        arena: &Arena,
        target: &ImageView,
        source: &ImageView,
        offset_x: i32,
        offset_y: i32,
    ) -> u64 {
        let unclipped_in_target = source.bounds().shifted(offset_x, offset_y);
        let clipped_in_target = target.bounds().intersect(unclipped_in_target);
        let clipped_in_source = clip_in_source(unclipped_in_target, clipped_in_target);

        let target = target.shallow_copy().clip_to_rect(clipped_in_target);
        let source = source.shallow_copy().clip_to_rect(clipped_in_source);
        if target.is_empty() || source.is_empty() {
            return 0;
        }
        debug_assert_eq!(
            (target.width(), target.height()),
            (source.width(), source.height())
        );

        let limit = self.contrast_limit;
        let mut total = 0u64;
        for y in 0..target.height() {
            let t_row = arena.row(&target, y);
            let s_row = arena.row(&source, y);
            for x in 1..t_row.len() {
                let t = t_row[x];
                let s = s_row[x];
                if similarity(t, t_row[x - 1]) < limit && similarity(s, s_row[x - 1]) < limit {
                    total += u64::from(similarity(t, s));
                }
            }
        }
        total
    }
}

/// Scores `source` placed at `(offset_x, offset_y)` over `target` with the
/// default edge-aware scorer.
pub fn overlap_score(
    arena: &Arena,
    target: &ImageView,
    source: &ImageView,
    offset_x: i32,
    offset_y: i32,
) -> u64 {
    EdgeAwareScorer::default().score(arena, target, source, offset_x, offset_y)
}

/// Returns the number of pixels two images share at an offset.
pub(crate) fn overlap_area(
    target: &ImageView,
    source: &ImageView,
    offset_x: i32,
    offset_y: i32,
) -> u64 {
    let placed = Rect::sized(source.width() as i32, source.height() as i32)
        .shifted(offset_x, offset_y);
    let overlap = target.bounds().intersect(placed);
    u64::from(overlap.width().max(0) as u32) * u64::from(overlap.height().max(0) as u32)
}
