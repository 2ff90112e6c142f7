//! Coarse-to-fine search for the offset that best aligns two images.
//!
//! Both inputs are turned into mip pyramids of equal depth. The coarsest
//! level is scanned exhaustively; each finer level rescores the 3x3
//! neighborhood of the doubled estimate from the level above. The finest
//! level's best is the full-resolution placement of `b` relative to `a`.
//!
//! All pyramid memory lives inside an arena guard and is reclaimed before
//! the search returns; only the composited output outlives it.

pub(crate) mod coarse;
pub mod observer;
pub(crate) mod refine;
pub(crate) mod scan;

use crate::arena::Arena;
use crate::composite::composite;
use crate::image::pyramid::{recommended_level_count, MipChain};
use crate::kernel::score::{overlap_area, DEFAULT_FLAT_TOLERANCE};
use crate::kernel::{EdgeAwareScorer, OverlapKernel};
use crate::trace::{trace_event, trace_span};
use crate::util::StitchResult;
use crate::ImageView;

use coarse::{coarse_positions, coarse_search_level};
use refine::{refine_to_finer_level, REFINE_POSITIONS};

pub use observer::{BestScore, NoopObserver, RecordingObserver, SearchObserver};

/// Tuning knobs for the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StitchConfig {
    /// Subtracted from the bit length of the smaller image side when picking
    /// the pyramid depth.
    pub level_floor: u32,
    /// Upper bound on the pyramid depth.
    pub max_levels: usize,
    /// Per-channel difference under which neighbors count as flat.
    pub flat_tolerance: u32,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            level_floor: 3,
            max_levels: 32,
            flat_tolerance: DEFAULT_FLAT_TOLERANCE,
        }
    }
}

/// Offset of `b` relative to `a` chosen by the search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Alignment {
    pub offset_x: i32,
    pub offset_y: i32,
    /// Score of the chosen offset at full resolution.
    pub score: u64,
    /// Pyramid depth the search used.
    pub levels: usize,
}

/// Composited output of [`find_overlap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stitch {
    /// Arena image covering the union of both placements.
    pub image: ImageView,
    pub offset_x: i32,
    pub offset_y: i32,
    pub score: u64,
}

/// Estimated cost of each level, indexed like the pyramid.
///
/// Units are placements visited times the smaller level's pixel count, so
/// the numbers only mean something relative to each other.
fn estimate_work(chain_a: &MipChain, chain_b: &MipChain) -> Vec<u64> {
    let coarsest = chain_a.len() - 1;
    chain_a
        .levels()
        .iter()
        .zip(chain_b.levels())
        .enumerate()
        .map(|(index, (a, b))| {
            let positions = if index == coarsest {
                coarse_positions(a, b)
            } else {
                REFINE_POSITIONS
            };
            positions.saturating_mul(a.num_pixels().min(b.num_pixels()) as u64)
        })
        .collect()
}

/// Finds the offset of `b` relative to `a` using the default scorer.
pub fn find_offset<O: SearchObserver + ?Sized>(
    arena: &mut Arena,
    a: &ImageView,
    b: &ImageView,
    config: &StitchConfig,
    observer: &mut O,
) -> StitchResult<Alignment> {
    let kernel = EdgeAwareScorer::new(config.flat_tolerance);
    find_offset_with(arena, a, b, config, &kernel, observer)
}

/// Finds the offset of `b` relative to `a` with a caller-supplied kernel.
pub fn find_offset_with<K, O>(
    arena: &mut Arena,
    a: &ImageView,
    b: &ImageView,
    config: &StitchConfig,
    kernel: &K,
    observer: &mut O,
) -> StitchResult<Alignment>
where
    K: OverlapKernel,
    O: SearchObserver + ?Sized,
{
    let level_count = recommended_level_count(a, b, config.level_floor)
        .min(config.max_levels)
        .max(1);
    let _span = trace_span!(
        "find_offset",
        a_width = a.width(),
        a_height = a.height(),
        b_width = b.width(),
        b_height = b.height(),
        levels = level_count
    )
    .entered();

    let mut scope = arena.guard();
    let chain_a = MipChain::build(&mut scope, *a, level_count)?;
    let chain_b = MipChain::build(&mut scope, *b, level_count)?;
    let work = estimate_work(&chain_a, &chain_b);
    let mut remaining: u64 = work.iter().sum();

    let mut best = None;
    for level in (0..level_count).rev() {
        let (Some(target), Some(source)) = (chain_a.level(level), chain_b.level(level)) else {
            continue;
        };
        observer.on_progress(remaining);
        let found = match best {
            None => coarse_search_level(&scope, kernel, target, source, level, observer),
            Some(coarse) => {
                refine_to_finer_level(&scope, kernel, target, source, level, coarse, observer)
            }
        };
        remaining = remaining.saturating_sub(work[level]);
        observer.on_progress(remaining);
        best = Some(found);
    }

    let best = best.unwrap_or_default();
    trace_event!(
        "overlap_found",
        x = best.x,
        y = best.y,
        score = best.score,
        area = overlap_area(a, b, best.x, best.y)
    );
    Ok(Alignment {
        offset_x: best.x,
        offset_y: best.y,
        score: best.score,
        levels: level_count,
    })
}

/// Aligns `b` against `a` and composites them into a new arena image.
pub fn find_overlap<O: SearchObserver + ?Sized>(
    arena: &mut Arena,
    a: &ImageView,
    b: &ImageView,
    config: &StitchConfig,
    observer: &mut O,
) -> StitchResult<Stitch> {
    let _span = trace_span!("find_overlap").entered();
    let alignment = find_offset(arena, a, b, config, observer)?;
    let image = composite(arena, a, b, alignment.offset_x, alignment.offset_y)?;
    Ok(Stitch {
        image,
        offset_x: alignment.offset_x,
        offset_y: alignment.offset_y,
        score: alignment.score,
    })
}

/// Tightly packed host pixels to feed into a [`Stitcher`].
#[derive(Clone, Copy, Debug)]
pub struct HostImage<'a> {
    pub pixels: &'a [u32],
    pub width: usize,
    pub height: usize,
}

impl<'a> HostImage<'a> {
    pub fn new(pixels: &'a [u32], width: usize, height: usize) -> Self {
        Self {
            pixels,
            width,
            height,
        }
    }
}

/// Stitched image copied out of the arena.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StitchedImage {
    pub pixels: Vec<u32>,
    pub width: usize,
    pub height: usize,
    pub offset_x: i32,
    pub offset_y: i32,
    pub score: u64,
}

/// Driver owning the arena and configuration for repeated stitches.
#[derive(Debug, Default)]
pub struct Stitcher {
    arena: Arena,
    config: StitchConfig,
}

impl Stitcher {
    /// Creates a stitcher with a heap-backed arena and default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stitcher over an existing arena.
    pub fn with_arena(arena: Arena) -> Self {
        Self {
            arena,
            config: StitchConfig::default(),
        }
    }

    /// Replaces the search configuration.
    pub fn with_config(mut self, config: StitchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &StitchConfig {
        &self.config
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Gives hosts access to the arena for loading inputs.
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Reclaims everything from previous stitches.
    pub fn reset(&mut self) {
        self.arena.reset();
    }

    /// Runs [`find_overlap`] on two images already in the arena.
    pub fn find_overlap<O: SearchObserver + ?Sized>(
        &mut self,
        a: &ImageView,
        b: &ImageView,
        observer: &mut O,
    ) -> StitchResult<Stitch> {
        find_overlap(&mut self.arena, a, b, &self.config, observer)
    }

    /// Resets the arena, loads both host images and stitches them.
    pub fn stitch<O: SearchObserver + ?Sized>(
        &mut self,
        a: HostImage<'_>,
        b: HostImage<'_>,
        observer: &mut O,
    ) -> StitchResult<StitchedImage> {
        self.reset();
        let a = self.arena.image_from_pixels(a.width, a.height, a.pixels)?;
        let b = self.arena.image_from_pixels(b.width, b.height, b.pixels)?;
        let stitch = self.find_overlap(&a, &b, observer)?;
        Ok(StitchedImage {
            pixels: self.arena.to_vec(&stitch.image),
            width: stitch.image.width(),
            height: stitch.image.height(),
            offset_x: stitch.offset_x,
            offset_y: stitch.offset_y,
            score: stitch.score,
        })
    }
}
