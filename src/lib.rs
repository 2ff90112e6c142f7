//! screenstitch aligns two partially overlapping screen captures and
//! composites them into one seamless image.
//!
//! The pipeline is a coarse-to-fine search over mip pyramids driven by an
//! edge-aware similarity score, followed by a compositor that hides the seam
//! with a directional linear blend. Every buffer is carved out of a single
//! growable [`Arena`] and reclaimed in bulk.
//!
//! ```
//! use screenstitch::{HostImage, NoopObserver, Stitcher};
//!
//! let mut a = vec![0xFF00_0000u32; 64];
//! a[3 * 8 + 5] = 0xFFFF_FFFF;
//! let mut b = vec![0xFF00_0000u32; 64];
//! b[3 * 8 + 2] = 0xFFFF_FFFF;
//!
//! let mut stitcher = Stitcher::new();
//! let out = stitcher
//!     .stitch(HostImage::new(&a, 8, 8), HostImage::new(&b, 8, 8), &mut NoopObserver)
//!     .unwrap();
//! assert_eq!((out.offset_x, out.offset_y), (3, 0));
//! assert_eq!(out.width, 11);
//! ```

pub mod arena;
pub mod composite;
pub mod geometry;
pub mod image;
pub mod kernel;
pub mod search;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use crate::image::pyramid::{mip, recommended_level_count, MipChain};
pub use crate::image::ImageView;
pub use arena::{Arena, ArenaGuard, ArenaMark, HeapHost, LimitedHost, MemoryHost};
pub use composite::{composite, SeamRamp};
pub use geometry::{clip_in_source, Rect};
pub use kernel::{overlap_score, EdgeAwareScorer, OverlapKernel};
pub use search::{
    find_offset, find_offset_with, find_overlap, Alignment, BestScore, HostImage, NoopObserver,
    RecordingObserver, SearchObserver, Stitch, StitchConfig, StitchedImage, Stitcher,
};
pub use util::{StitchError, StitchResult};
