//! Image views over arena-owned pixel storage.
//!
//! `ImageView` is a plain value: a word offset into the arena plus width,
//! height and stride. Pixels are packed `u32` words (see
//! [`crate::kernel::pixel`]), row-major, with row `y` starting at
//! `offset + y * stride`. Views never own their pixels, so any number of
//! views may alias one buffer with independent windows; clipping is pure
//! arithmetic on the struct.

use crate::arena::Arena;
use crate::geometry::Rect;
use crate::util::{StitchError, StitchResult};

#[cfg(feature = "image-io")]
pub mod io;
pub mod pyramid;

/// Rectangular window into arena pixel storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageView {
    offset: usize,
    width: usize,
    height: usize,
    stride: usize,
}

impl ImageView {
    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in pixels between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the arena word offset of the top-left pixel.
    ///
    /// Two views with the same offset and stride share their pixels; the
    /// offset doubles as a buffer identity in diagnostics.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }

    /// Returns true when the view has no addressable pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the full bounds of the view in its own coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::sized(self.width as i32, self.height as i32)
    }

    /// Returns an independent view sharing the same pixels.
    pub fn shallow_copy(&self) -> ImageView {
        *self
    }

    /// Returns the arena word index of pixel `(x, y)`.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        self.offset + y * self.stride + x
    }

    /// Narrows the view to `rect`, given in the view's local coordinates.
    ///
    /// An empty rect yields a 0x0 view whose offset must not be read. A rect
    /// collapsed on only one axis yields a view with that extent clamped to
    /// zero.
    pub fn clip_to_rect(&self, rect: Rect) -> ImageView {
        let mut clipped = *self;
        if rect.is_empty() {
            clipped.width = 0;
            clipped.height = 0;
            return clipped;
        }
        clipped.width = rect.width().max(0) as usize;
        clipped.height = rect.height().max(0) as usize;
        if !clipped.is_empty() {
            debug_assert!(rect.x1 >= 0 && rect.y1 >= 0, "clip rect outside view");
            clipped.offset += rect.x1 as usize + self.stride * rect.y1 as usize;
        }
        clipped
    }
}

/// Pixel storage operations; images live in the arena like everything else.
impl Arena {
    /// Allocates a `width` x `height` image with `stride == width`.
    ///
    /// Pixel contents are unspecified until written.
    pub fn create_image(&mut self, width: usize, height: usize) -> StitchResult<ImageView> {
        if width == 0 || height == 0 {
            return Err(StitchError::InvalidDimensions { width, height });
        }
        let count = width
            .checked_mul(height)
            .filter(|count| *count <= i32::MAX as usize)
            .ok_or(StitchError::InvalidDimensions { width, height })?;
        let offset = self.allocate_words(count)?;
        Ok(ImageView {
            offset,
            width,
            height,
            stride: width,
        })
    }

    /// Allocates an image and fills it from a tightly packed host buffer.
    pub fn image_from_pixels(
        &mut self,
        width: usize,
        height: usize,
        pixels: &[u32],
    ) -> StitchResult<ImageView> {
        let needed = width
            .checked_mul(height)
            .ok_or(StitchError::InvalidDimensions { width, height })?;
        if pixels.len() < needed {
            return Err(StitchError::BufferTooSmall {
                needed,
                got: pixels.len(),
            });
        }
        let view = self.create_image(width, height)?;
        let start = view.offset;
        self.as_words_mut()[start..start + needed].copy_from_slice(&pixels[..needed]);
        Ok(view)
    }

    /// Returns row `y` of `view`, `width` pixels long.
    ///
    /// # Panics
    ///
    /// Panics if `y` is outside the view or the view lies past the cursor.
    pub fn row(&self, view: &ImageView, y: usize) -> &[u32] {
        assert!(y < view.height, "row {y} outside view of height {}", view.height);
        let start = view.index(0, y);
        &self.as_words()[start..start + view.width]
    }

    /// Returns row `y` of `view` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `y` is outside the view or the view lies past the cursor.
    pub fn row_mut(&mut self, view: &ImageView, y: usize) -> &mut [u32] {
        assert!(y < view.height, "row {y} outside view of height {}", view.height);
        let start = view.index(0, y);
        &mut self.as_words_mut()[start..start + view.width]
    }

    /// Returns the pixel at `(x, y)`, or `None` outside the view.
    pub fn pixel(&self, view: &ImageView, x: usize, y: usize) -> Option<u32> {
        if x >= view.width || y >= view.height {
            return None;
        }
        self.as_words().get(view.index(x, y)).copied()
    }

    /// Writes `value` to every pixel of `view`.
    pub fn fill(&mut self, view: &ImageView, value: u32) {
        for y in 0..view.height {
            self.row_mut(view, y).fill(value);
        }
    }

    /// Copies the view's pixels out into a tightly packed vector.
    pub fn to_vec(&self, view: &ImageView) -> Vec<u32> {
        let mut out = Vec::with_capacity(view.num_pixels());
        for y in 0..view.height {
            out.extend_from_slice(self.row(view, y));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::arena::Arena;
    use crate::geometry::Rect;
    use crate::util::StitchError;

    #[test]
    fn create_image_sets_stride_to_width() {
        let mut arena = Arena::new();
        let view = arena.create_image(5, 3).unwrap();
        assert_eq!((view.width(), view.height(), view.stride()), (5, 3, 5));
        assert_eq!(view.num_pixels(), 15);
        assert_eq!(arena.cursor(), 15);
    }

    #[test]
    fn create_image_rejects_zero_size() {
        let mut arena = Arena::new();
        assert_eq!(
            arena.create_image(0, 4).unwrap_err(),
            StitchError::InvalidDimensions {
                width: 0,
                height: 4,
            }
        );
    }

    #[test]
    fn clip_shares_storage_and_keeps_stride() {
        let mut arena = Arena::new();
        let pixels: Vec<u32> = (0u32..16).collect();
        let view = arena.image_from_pixels(4, 4, &pixels).unwrap();
        let clipped = view.shallow_copy().clip_to_rect(Rect::new(1, 1, 3, 3));
        assert_eq!((clipped.width(), clipped.height()), (2, 2));
        assert_eq!(clipped.stride(), 4);
        assert_eq!(arena.row(&clipped, 0), &[5, 6]);
        assert_eq!(arena.row(&clipped, 1), &[9, 10]);
        assert_eq!(arena.to_vec(&view), pixels);
    }

    #[test]
    fn clip_to_empty_rect_zeroes_extents() {
        let mut arena = Arena::new();
        let view = arena.create_image(4, 4).unwrap();
        let clipped = view.clip_to_rect(Rect::new(4, 4, 2, 2));
        assert!(clipped.is_empty());
        assert_eq!((clipped.width(), clipped.height()), (0, 0));
    }

    #[test]
    fn clip_to_single_axis_collapse_clamps() {
        let mut arena = Arena::new();
        let view = arena.create_image(4, 4).unwrap();
        let clipped = view.clip_to_rect(Rect::new(3, 0, 1, 4));
        assert_eq!((clipped.width(), clipped.height()), (0, 4));
        assert!(clipped.is_empty());
    }

    #[test]
    fn image_from_pixels_checks_length() {
        let mut arena = Arena::new();
        let err = arena.image_from_pixels(2, 2, &[0; 3]).unwrap_err();
        assert_eq!(err, StitchError::BufferTooSmall { needed: 4, got: 3 });
    }
}
