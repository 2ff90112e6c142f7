//! Refinement around an estimate carried down from the coarser level.
//!
//! Resolution doubles between levels, so the coarse best is doubled and the
//! 3x3 neighborhood around it is rescored. This assumes the coarse estimate
//! is right to within one coarse pixel.

use crate::arena::Arena;
use crate::kernel::OverlapKernel;
use crate::search::observer::SearchObserver;
use crate::search::scan::{Candidate, LevelScan};
use crate::trace::{trace_event, trace_span};
use crate::ImageView;

/// Radius of the refinement neighborhood in level pixels.
pub(crate) const REFINE_RADIUS: i32 = 1;

/// Number of placements one refinement step visits.
pub(crate) const REFINE_POSITIONS: u64 =
    ((2 * REFINE_RADIUS + 1) * (2 * REFINE_RADIUS + 1)) as u64;

pub(crate) fn refine_to_finer_level<K, O>(
    arena: &Arena,
    kernel: &K,
    target: ImageView,
    source: ImageView,
    level: usize,
    coarse: Candidate,
    observer: &mut O,
) -> Candidate
where
    K: OverlapKernel,
    O: SearchObserver + ?Sized,
{
    let _span = trace_span!(
        "search_level",
        stage = "refine",
        level = level,
        width = target.width(),
        height = target.height()
    )
    .entered();

    let (cx, cy) = coarse.upscaled();
    let mut scan = LevelScan::new(arena, kernel, target, source, level);
    for dy in -REFINE_RADIUS..=REFINE_RADIUS {
        for dx in -REFINE_RADIUS..=REFINE_RADIUS {
            scan.visit(cx + dx, cy + dy, observer);
        }
    }
    let best = scan.finish();

    trace_event!("level_best", level = level, x = best.x, y = best.y, score = best.score);
    best
}
