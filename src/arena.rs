//! Monotonic region allocator backing all stitching memory.
//!
//! The arena hands out word-aligned offsets into a single growable region of
//! `u32` words. Offsets are plain integers, so growing the region never
//! invalidates anything issued earlier; it only raises the committed end.
//! Memory comes back in bulk: either by rewinding to an [`ArenaMark`] or by a
//! full [`Arena::reset`].
//!
//! [`ArenaGuard`] wraps a checkpoint and rewinds on drop. A nested guard is
//! taken through the outer guard's `DerefMut`, which keeps the outer guard
//! mutably borrowed until the inner one is gone, so release order is always
//! the reverse of acquisition.

use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::trace::trace_debug;
use crate::util::{StitchError, StitchResult};

/// Size of one arena word in bytes. Every allocation is rounded up to it.
pub const WORD_BYTES: usize = 4;

/// Smallest amount of memory requested from the host on each growth.
pub const MIN_GROWTH_BYTES: usize = 4 * 1024 * 1024;

/// Host capability that commits more backing memory for the arena.
pub trait MemoryHost {
    /// Grows the region from `committed` bytes by at least `additional` bytes
    /// and returns the new committed size in bytes.
    ///
    /// Returning less than `committed + additional` is allowed; the arena
    /// reports [`StitchError::ArenaExhausted`] when the result cannot hold the
    /// allocation that triggered growth.
    fn grow(&mut self, committed: usize, additional: usize) -> usize;
}

/// Unbounded host backed by the process heap.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeapHost;

impl MemoryHost for HeapHost {
    fn grow(&mut self, committed: usize, additional: usize) -> usize {
        committed.saturating_add(additional)
    }
}

/// Host that refuses to commit past a fixed byte limit.
#[derive(Clone, Copy, Debug)]
pub struct LimitedHost {
    limit: usize,
}

impl LimitedHost {
    /// Creates a host capped at `limit` bytes.
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Returns the byte cap.
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl MemoryHost for LimitedHost {
    fn grow(&mut self, committed: usize, additional: usize) -> usize {
        committed.saturating_add(additional).min(self.limit).max(committed)
    }
}

/// Saved cursor position, in words.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArenaMark(usize);

impl ArenaMark {
    /// Returns the word offset this mark rewinds to.
    pub fn offset(self) -> usize {
        self.0
    }
}

/// Growable bump allocator over `u32` words.
pub struct Arena {
    words: Vec<u32>,
    cursor: usize,
    host: Box<dyn MemoryHost>,
}

impl Arena {
    /// Creates an empty arena backed by [`HeapHost`].
    pub fn new() -> Self {
        Self::with_host(HeapHost)
    }

    /// Creates an empty arena that grows through `host`.
    pub fn with_host<H: MemoryHost + 'static>(host: H) -> Self {
        Self {
            words: Vec::new(),
            cursor: 0,
            host: Box::new(host),
        }
    }

    /// Allocates `bytes` rounded up to whole words and returns the word offset.
    ///
    /// The returned words keep whatever a previous, rewound allocation left in
    /// them; callers that need zeroed memory clear it themselves.
    pub fn allocate(&mut self, bytes: usize) -> StitchResult<usize> {
        let words = bytes.div_ceil(WORD_BYTES);
        let start = self.cursor;
        let end = start
            .checked_add(words)
            .ok_or(StitchError::ArenaExhausted {
                requested: bytes,
                committed: self.committed_bytes(),
            })?;
        if end > self.words.len() {
            self.grow_to(end, words * WORD_BYTES)?;
        }
        self.cursor = end;
        Ok(start)
    }

    /// Allocates `count` words and returns the word offset.
    pub fn allocate_words(&mut self, count: usize) -> StitchResult<usize> {
        let bytes = count
            .checked_mul(WORD_BYTES)
            .ok_or(StitchError::ArenaExhausted {
                requested: usize::MAX,
                committed: self.committed_bytes(),
            })?;
        self.allocate(bytes)
    }

    fn grow_to(&mut self, end_words: usize, requested: usize) -> StitchResult<()> {
        let committed = self.committed_bytes();
        let additional = requested.max(MIN_GROWTH_BYTES);
        let new_committed = self.host.grow(committed, additional);
        let new_words = new_committed / WORD_BYTES;
        if new_words < end_words {
            return Err(StitchError::ArenaExhausted {
                requested,
                committed: new_committed,
            });
        }
        trace_debug!("arena_grow", from_bytes = committed, to_bytes = new_committed);
        self.words.resize(new_words, 0);
        Ok(())
    }

    /// Records the current cursor.
    pub fn checkpoint(&self) -> ArenaMark {
        ArenaMark(self.cursor)
    }

    /// Rewinds the cursor to `mark`, reclaiming everything allocated since.
    ///
    /// Marks must be released newest first. Debug builds assert that `mark`
    /// does not lie past the cursor, which is what an out-of-order release
    /// looks like.
    pub fn release(&mut self, mark: ArenaMark) {
        debug_assert!(
            mark.0 <= self.cursor,
            "arena mark {} released past cursor {}",
            mark.0,
            self.cursor
        );
        self.cursor = mark.0;
    }

    /// Opens a scope that rewinds the arena when dropped.
    pub fn guard(&mut self) -> ArenaGuard<'_> {
        let mark = self.checkpoint();
        ArenaGuard { arena: self, mark }
    }

    /// Reclaims every allocation. Committed memory is kept for reuse.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Returns the cursor as a word offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the number of bytes currently handed out.
    pub fn used_bytes(&self) -> usize {
        self.cursor * WORD_BYTES
    }

    /// Returns the committed end of the region in bytes.
    pub fn committed_bytes(&self) -> usize {
        self.words.len() * WORD_BYTES
    }

    /// Returns the live words `[0, cursor)`.
    pub fn as_words(&self) -> &[u32] {
        &self.words[..self.cursor]
    }

    /// Returns the live words `[0, cursor)` mutably.
    pub fn as_words_mut(&mut self) -> &mut [u32] {
        &mut self.words[..self.cursor]
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("cursor", &self.cursor)
            .field("committed_words", &self.words.len())
            .finish_non_exhaustive()
    }
}

/// Checkpoint scope that rewinds its arena on drop.
pub struct ArenaGuard<'a> {
    arena: &'a mut Arena,
    mark: ArenaMark,
}

impl ArenaGuard<'_> {
    /// Returns the mark this guard rewinds to.
    pub fn mark(&self) -> ArenaMark {
        self.mark
    }
}

impl Deref for ArenaGuard<'_> {
    type Target = Arena;

    fn deref(&self) -> &Arena {
        self.arena
    }
}

impl DerefMut for ArenaGuard<'_> {
    fn deref_mut(&mut self) -> &mut Arena {
        self.arena
    }
}

impl Drop for ArenaGuard<'_> {
    fn drop(&mut self) {
        self.arena.release(self.mark);
    }
}

#[cfg(test)]
mod tests {
    use super::{Arena, LimitedHost, MemoryHost, MIN_GROWTH_BYTES, WORD_BYTES};
    use crate::util::StitchError;

    #[test]
    fn allocate_rounds_to_words() {
        let mut arena = Arena::new();
        assert_eq!(arena.allocate(1).unwrap(), 0);
        assert_eq!(arena.allocate(5).unwrap(), 1);
        assert_eq!(arena.allocate(0).unwrap(), 3);
        assert_eq!(arena.cursor(), 3);
        assert_eq!(arena.used_bytes(), 3 * WORD_BYTES);
    }

    #[test]
    fn growth_requests_at_least_the_minimum_chunk() {
        let mut arena = Arena::new();
        arena.allocate(8).unwrap();
        assert_eq!(arena.committed_bytes(), MIN_GROWTH_BYTES);

        arena.allocate(MIN_GROWTH_BYTES).unwrap();
        assert_eq!(arena.committed_bytes(), 2 * MIN_GROWTH_BYTES);
    }

    #[test]
    fn guard_rewinds_and_offsets_are_reused() {
        let mut arena = Arena::new();
        arena.allocate(16).unwrap();
        let before = arena.cursor();
        let reused = {
            let mut scope = arena.guard();
            let first = scope.allocate(64).unwrap();
            {
                let mut inner = scope.guard();
                inner.allocate(128).unwrap();
            }
            assert_eq!(scope.cursor(), first + 16);
            first
        };
        assert_eq!(arena.cursor(), before);
        assert_eq!(arena.allocate(4).unwrap(), reused);
    }

    #[test]
    fn growth_keeps_earlier_contents() {
        let mut arena = Arena::new();
        let at = arena.allocate_words(2).unwrap();
        arena.as_words_mut()[at] = 0xDEAD_BEEF;
        arena.allocate(MIN_GROWTH_BYTES * 2).unwrap();
        assert_eq!(arena.as_words()[at], 0xDEAD_BEEF);
    }

    #[test]
    fn reset_returns_to_base() {
        let mut arena = Arena::new();
        arena.allocate(1024).unwrap();
        let committed = arena.committed_bytes();
        arena.reset();
        assert_eq!(arena.cursor(), 0);
        assert_eq!(arena.committed_bytes(), committed);
    }

    #[test]
    fn limited_host_reports_exhaustion() {
        let mut arena = Arena::with_host(LimitedHost::new(64));
        arena.allocate(60).unwrap();
        let err = arena.allocate(8).unwrap_err();
        assert_eq!(
            err,
            StitchError::ArenaExhausted {
                requested: 8,
                committed: 64,
            }
        );
        assert_eq!(arena.cursor(), 15);
    }

    #[test]
    fn limited_host_never_shrinks() {
        let mut host = LimitedHost::new(16);
        assert_eq!(host.grow(32, 8), 32);
        assert_eq!(host.grow(0, 8), 8);
    }
}
