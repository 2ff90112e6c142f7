//! Side-channel notifications emitted during the hierarchical search.

/// Snapshot reported whenever the best score at a level improves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BestScore {
    /// Score of the new best placement.
    pub score: u64,
    /// Offset of the source relative to the target, in level pixels.
    pub offset_x: i32,
    pub offset_y: i32,
    /// Pyramid level index (0 is full resolution).
    pub level: usize,
    /// Target level dimensions.
    pub target_width: usize,
    pub target_height: usize,
    /// Source level dimensions.
    pub source_width: usize,
    pub source_height: usize,
    /// Arena offsets identifying the level buffers.
    pub target_buffer: usize,
    pub source_buffer: usize,
}

/// Receives progress and diagnostics from the search.
///
/// Both callbacks are fire-and-forget and must return promptly; nothing they
/// do influences the search.
pub trait SearchObserver {
    /// Reports the estimated work left, in arbitrary units.
    fn on_progress(&mut self, _remaining: u64) {}

    /// Reports a new best placement at the current level.
    fn on_best_score(&mut self, _best: &BestScore) {}
}

/// Observer that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Records every notification; handy for hosts that poll instead of stream.
#[derive(Clone, Debug, Default)]
pub struct RecordingObserver {
    pub progress: Vec<u64>,
    pub best_scores: Vec<BestScore>,
}

impl SearchObserver for RecordingObserver {
    fn on_progress(&mut self, remaining: u64) {
        self.progress.push(remaining);
    }

    fn on_best_score(&mut self, best: &BestScore) {
        self.best_scores.push(*best);
    }
}
