//! Mip pyramids over packed pixel images.
//!
//! Each level halves both dimensions, rounding up, with a 2x2 box filter.
//! At odd trailing edges only the pixels that exist are averaged. Channels
//! are accumulated in `u32` lanes and truncated back to 8 bits, all four
//! bytes independently.

use crate::arena::Arena;
use crate::image::ImageView;
use crate::kernel::pixel::{pack, unpack};
use crate::util::StitchResult;

/// Downsamples `input` by two in each dimension into a new arena image.
pub fn mip(arena: &mut Arena, input: &ImageView) -> StitchResult<ImageView> {
    let width = input.width();
    let height = input.height();
    let output = arena.create_image(width.div_ceil(2), height.div_ceil(2))?;

    let words = arena.as_words_mut();
    for oy in 0..output.height() {
        let y0 = oy * 2;
        let rows = if y0 + 1 < height { 2 } else { 1 };
        for ox in 0..output.width() {
            let x0 = ox * 2;
            let cols = if x0 + 1 < width { 2 } else { 1 };
            let mut sum = [0u32; 4];
            for dy in 0..rows {
                for dx in 0..cols {
                    let lanes = unpack(words[input.index(x0 + dx, y0 + dy)]);
                    for (acc, lane) in sum.iter_mut().zip(lanes) {
                        *acc += lane;
                    }
                }
            }
            let count = (rows * cols) as u32;
            words[output.index(ox, oy)] = pack(sum.map(|acc| acc / count));
        }
    }
    Ok(output)
}

/// Bit length of `n`: the position of its highest set bit, plus one.
fn bit_length(n: usize) -> usize {
    (usize::BITS - n.leading_zeros()) as usize
}

/// Chooses a pyramid depth that leaves the coarsest level of both images
/// with enough pixels for a meaningful search.
///
/// The depth is `min(bitlen(min(a.w, a.h)), bitlen(min(b.w, b.h))) - floor`,
/// clamped to at least 1.
pub fn recommended_level_count(a: &ImageView, b: &ImageView, floor: u32) -> usize {
    let a_bits = bit_length(a.width().min(a.height()));
    let b_bits = bit_length(b.width().min(b.height()));
    a_bits
        .min(b_bits)
        .saturating_sub(floor as usize)
        .max(1)
}

/// Ordered chain of progressively half-sized views.
///
/// Level 0 is the caller's image and shares its storage; every further level
/// is allocated in the arena the chain was built with.
#[derive(Clone, Debug)]
pub struct MipChain {
    levels: Vec<ImageView>,
}

impl MipChain {
    /// Builds a chain of exactly `level_count` levels (at least one).
    pub fn build(arena: &mut Arena, base: ImageView, level_count: usize) -> StitchResult<Self> {
        let level_count = level_count.max(1);
        let mut levels = Vec::with_capacity(level_count);
        levels.push(base.shallow_copy());
        let mut prev = base;
        while levels.len() < level_count {
            prev = mip(arena, &prev)?;
            levels.push(prev);
        }
        Ok(Self { levels })
    }

    /// Returns the number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false: a chain holds at least its base level.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Returns the view for level `index` (0 is full resolution).
    pub fn level(&self, index: usize) -> Option<ImageView> {
        self.levels.get(index).copied()
    }

    /// Returns all levels, finest first.
    pub fn levels(&self) -> &[ImageView] {
        &self.levels
    }
}

#[cfg(test)]
mod tests {
    use super::{bit_length, mip, recommended_level_count, MipChain};
    use crate::arena::Arena;

    #[test]
    fn bit_length_matches_highest_bit() {
        assert_eq!(bit_length(0), 0);
        assert_eq!(bit_length(1), 1);
        assert_eq!(bit_length(4), 3);
        assert_eq!(bit_length(255), 8);
        assert_eq!(bit_length(256), 9);
    }

    #[test]
    fn mip_averages_each_channel() {
        let mut arena = Arena::new();
        let pixels = [0x04_08_0C_10, 0x00_00_00_00, 0x00_00_00_00, 0x08_04_04_04];
        let base = arena.image_from_pixels(2, 2, &pixels).unwrap();
        let half = mip(&mut arena, &base).unwrap();
        assert_eq!((half.width(), half.height()), (1, 1));
        assert_eq!(arena.pixel(&half, 0, 0), Some(0x03_03_04_05));
    }

    #[test]
    fn mip_averages_only_existing_edge_pixels() {
        let mut arena = Arena::new();
        let pixels = [10, 20, 30, 40, 50, 60];
        let base = arena.image_from_pixels(3, 2, &pixels).unwrap();
        let half = mip(&mut arena, &base).unwrap();
        assert_eq!((half.width(), half.height()), (2, 1));
        assert_eq!(arena.row(&half, 0), &[(10 + 20 + 40 + 50) / 4, (30 + 60) / 2]);
    }

    #[test]
    fn mip_honors_stride_of_clipped_views() {
        let mut arena = Arena::new();
        let pixels: Vec<u32> = (0..16).collect();
        let base = arena.image_from_pixels(4, 4, &pixels).unwrap();
        let window = base.clip_to_rect(crate::geometry::Rect::new(2, 2, 4, 4));
        let half = mip(&mut arena, &window).unwrap();
        assert_eq!(arena.row(&half, 0), &[(10 + 11 + 14 + 15) / 4]);
    }

    #[test]
    fn chain_has_requested_levels() {
        let mut arena = Arena::new();
        let base = arena.create_image(13, 7).unwrap();
        arena.fill(&base, 0);
        let chain = MipChain::build(&mut arena, base, 4).unwrap();
        assert_eq!(chain.len(), 4);
        assert_eq!(chain.level(0), Some(base));
        let dims: Vec<_> = chain
            .levels()
            .iter()
            .map(|level| (level.width(), level.height()))
            .collect();
        assert_eq!(dims, vec![(13, 7), (7, 4), (4, 2), (2, 1)]);
    }

    #[test]
    fn recommended_level_count_clamps_to_one() {
        let mut arena = Arena::new();
        let small = arena.create_image(4, 4).unwrap();
        let large = arena.create_image(640, 480).unwrap();
        assert_eq!(recommended_level_count(&small, &large, 3), 1);
        assert_eq!(recommended_level_count(&large, &large, 3), 6);
        assert_eq!(recommended_level_count(&large, &large, 0), 9);
    }
}
