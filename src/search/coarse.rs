//! Exhaustive scan at the coarsest pyramid level.
//!
//! Every offset at which the two images share at least one pixel is scored:
//! `x` in `[-(source_w - 1), target_w - 1]` and likewise for `y`.

use crate::arena::Arena;
use crate::kernel::OverlapKernel;
use crate::search::observer::SearchObserver;
use crate::search::scan::{Candidate, LevelScan};
use crate::trace::{trace_event, trace_span};
use crate::ImageView;

/// Inclusive offset range along one axis with any overlap.
pub(crate) fn offset_range(target_len: usize, source_len: usize) -> (i32, i32) {
    (1 - source_len as i32, target_len as i32 - 1)
}

/// Number of placements the coarse scan visits.
pub(crate) fn coarse_positions(target: &ImageView, source: &ImageView) -> u64 {
    let xs = (target.width() + source.width() - 1) as u64;
    let ys = (target.height() + source.height() - 1) as u64;
    xs * ys
}

pub(crate) fn coarse_search_level<K, O>(
    arena: &Arena,
    kernel: &K,
    target: ImageView,
    source: ImageView,
    level: usize,
    observer: &mut O,
) -> Candidate
where
    K: OverlapKernel,
    O: SearchObserver + ?Sized,
{
    let _span = trace_span!(
        "search_level",
        stage = "coarse",
        level = level,
        width = target.width(),
        height = target.height()
    )
    .entered();

    let (x_min, x_max) = offset_range(target.width(), source.width());
    let (y_min, y_max) = offset_range(target.height(), source.height());

    let mut scan = LevelScan::new(arena, kernel, target, source, level);
    for y in y_min..=y_max {
        for x in x_min..=x_max {
            scan.visit(x, y, observer);
        }
    }
    let best = scan.finish();

    trace_event!("level_best", level = level, x = best.x, y = best.y, score = best.score);
    best
}
