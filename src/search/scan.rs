//! Best-placement tracking shared by the coarse and refinement scans.

use crate::arena::Arena;
use crate::kernel::OverlapKernel;
use crate::search::observer::{BestScore, SearchObserver};
use crate::ImageView;

/// Scored placement of the source relative to the target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) score: u64,
}

impl Candidate {
    fn distance(&self) -> u64 {
        u64::from(self.x.unsigned_abs()) + u64::from(self.y.unsigned_abs())
    }

    /// Higher score wins; equal scores prefer the offset nearer the origin.
    /// Full ties keep the incumbent, i.e. the first one scanned.
    pub(crate) fn beats(&self, other: &Candidate) -> bool {
        self.score > other.score
            || (self.score == other.score && self.distance() < other.distance())
    }

    /// Maps the placement onto the next finer level.
    pub(crate) fn upscaled(&self) -> (i32, i32) {
        (self.x * 2, self.y * 2)
    }
}

/// Scores placements at one pyramid level and keeps the best.
pub(crate) struct LevelScan<'a, K> {
    arena: &'a Arena,
    kernel: &'a K,
    target: ImageView,
    source: ImageView,
    level: usize,
    best: Option<Candidate>,
}

impl<'a, K: OverlapKernel> LevelScan<'a, K> {
    pub(crate) fn new(
        arena: &'a Arena,
        kernel: &'a K,
        target: ImageView,
        source: ImageView,
        level: usize,
    ) -> Self {
        Self {
            arena,
            kernel,
            target,
            source,
            level,
            best: None,
        }
    }

    /// Scores one placement, notifying `observer` when it becomes the best.
    pub(crate) fn visit<O: SearchObserver + ?Sized>(&mut self, x: i32, y: i32, observer: &mut O) {
        let score = self
            .kernel
            .score(self.arena, &self.target, &self.source, x, y);
        let candidate = Candidate { x, y, score };
        let improved = match &self.best {
            Some(best) => candidate.beats(best),
            None => true,
        };
        if improved {
            self.best = Some(candidate);
            observer.on_best_score(&self.report(candidate));
        }
    }

    fn report(&self, candidate: Candidate) -> BestScore {
        BestScore {
            score: candidate.score,
            offset_x: candidate.x,
            offset_y: candidate.y,
            level: self.level,
            target_width: self.target.width(),
            target_height: self.target.height(),
            source_width: self.source.width(),
            source_height: self.source.height(),
            target_buffer: self.target.offset(),
            source_buffer: self.source.offset(),
        }
    }

    /// Returns the best placement seen, or the origin if nothing was scanned.
    pub(crate) fn finish(self) -> Candidate {
        self.best.unwrap_or_default()
    }
}
