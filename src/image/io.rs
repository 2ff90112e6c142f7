//! Loading and saving arena images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Files are converted to
//! 8-bit RGBA, whose little-endian bytes match the packed pixel layout.

use crate::arena::Arena;
use crate::image::ImageView;
use crate::util::{StitchError, StitchResult};
use std::path::Path;

/// Copies an RGBA buffer into a new arena image.
pub fn view_from_rgba_image(arena: &mut Arena, img: &image::RgbaImage) -> StitchResult<ImageView> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let view = arena.create_image(width, height)?;
    for (y, src) in img.as_raw().chunks_exact(width * 4).enumerate() {
        let dst = arena.row_mut(&view, y);
        for (pixel, bytes) in dst.iter_mut().zip(src.chunks_exact(4)) {
            *pixel = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }
    }
    Ok(view)
}

/// Copies an arena view out into an RGBA buffer, honoring its stride.
pub fn rgba_image_from_view(arena: &Arena, view: &ImageView) -> StitchResult<image::RgbaImage> {
    let mut raw = Vec::with_capacity(view.num_pixels() * 4);
    for y in 0..view.height() {
        for pixel in arena.row(view, y) {
            raw.extend_from_slice(&pixel.to_le_bytes());
        }
    }
    image::RgbaImage::from_raw(view.width() as u32, view.height() as u32, raw).ok_or(
        StitchError::ImageIo {
            reason: "pixel buffer does not match image dimensions".to_string(),
        },
    )
}

/// Decodes an image file into a new arena image.
pub fn load_rgba<P: AsRef<Path>>(arena: &mut Arena, path: P) -> StitchResult<ImageView> {
    let img = image::open(path).map_err(|err| StitchError::ImageIo {
        reason: err.to_string(),
    })?;
    view_from_rgba_image(arena, &img.to_rgba8())
}

/// Encodes an arena view to a file; the format follows the extension.
pub fn save_rgba<P: AsRef<Path>>(arena: &Arena, view: &ImageView, path: P) -> StitchResult<()> {
    rgba_image_from_view(arena, view)?
        .save(path)
        .map_err(|err| StitchError::ImageIo {
            reason: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::{rgba_image_from_view, view_from_rgba_image};
    use crate::arena::Arena;
    use crate::geometry::Rect;

    #[test]
    fn rgba_bytes_map_to_packed_channels() {
        let mut arena = Arena::new();
        let img = image::RgbaImage::from_raw(1, 1, vec![0x11, 0x22, 0x33, 0x44]).unwrap();
        let view = view_from_rgba_image(&mut arena, &img).unwrap();
        assert_eq!(arena.pixel(&view, 0, 0), Some(0x4433_2211));
    }

    #[test]
    fn export_honors_stride() {
        let mut arena = Arena::new();
        let pixels: Vec<u32> = (0..9).collect();
        let view = arena.image_from_pixels(3, 3, &pixels).unwrap();
        let window = view.clip_to_rect(Rect::new(1, 1, 3, 3));
        let img = rgba_image_from_view(&arena, &window).unwrap();
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(0, 0).0, [4, 0, 0, 0]);
        assert_eq!(img.get_pixel(1, 1).0, [8, 0, 0, 0]);
    }
}
