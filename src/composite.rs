//! Compositing two aligned images with a directional seam blend.
//!
//! The canvas covers the union of both placements and starts fully
//! transparent. `a` is copied verbatim; `b` is copied verbatim outside the
//! overlap. Inside the overlap a linear ramp runs along the axis from the
//! overlap's center toward `a`'s center: pixels near `a`'s side keep `a`,
//! pixels on the far side take `b`, and the band between mixes the two.

use crate::arena::Arena;
use crate::geometry::Rect;
use crate::kernel::pixel::mix;
use crate::trace::{trace_event, trace_span};
use crate::util::StitchResult;
use crate::ImageView;

/// Linear blend weight across the overlap region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeamRamp {
    dir_x: i64,
    dir_y: i64,
    min_dot: i64,
    max_dot: i64,
}

impl SeamRamp {
    /// Orients the ramp from `overlap`'s center toward `rect_a`'s center.
    pub fn new(rect_a: Rect, overlap: Rect) -> Self {
        let (ax, ay) = rect_a.doubled_center();
        let (ox, oy) = overlap.doubled_center();
        let dir_x = ax - ox;
        let dir_y = ay - oy;

        let mut min_dot = i64::MAX;
        let mut max_dot = i64::MIN;
        for (x, y) in overlap.corners() {
            let dot = dir_x * i64::from(x) + dir_y * i64::from(y);
            min_dot = min_dot.min(dot);
            max_dot = max_dot.max(dot);
        }
        Self {
            dir_x,
            dir_y,
            min_dot,
            max_dot,
        }
    }

    /// Weight of `a` at `(x, y)` on a 0..=256 scale.
    ///
    /// A ramp with no extent (the two centers coincide) keeps `a` everywhere.
    pub fn weight(&self, x: i32, y: i32) -> i64 {
        let span = self.max_dot - self.min_dot;
        if span == 0 {
            return 255;
        }
        let dot = self.dir_x * i64::from(x) + self.dir_y * i64::from(y);
        (dot - self.min_dot) * 256 / span
    }
}

/// Copies all of `src` into `dst` with its top-left corner at `(x, y)`.
fn blit(arena: &mut Arena, src: &ImageView, dst: &ImageView, x: usize, y: usize) {
    let words = arena.as_words_mut();
    for row in 0..src.height() {
        let from = src.index(0, row);
        words.copy_within(from..from + src.width(), dst.index(x, y + row));
    }
}

/// Composites `b` placed at `(offset_x, offset_y)` relative to `a`.
///
/// Returns a new arena image sized to the union of both placements.
pub fn composite(
    arena: &mut Arena,
    a: &ImageView,
    b: &ImageView,
    offset_x: i32,
    offset_y: i32,
) -> StitchResult<ImageView> {
    let _span = trace_span!("composite", offset_x = offset_x, offset_y = offset_y).entered();

    let rect_a = a.bounds();
    let rect_b = b.bounds().shifted(offset_x, offset_y);
    let union = rect_a.extend(rect_b);

    let canvas = arena.create_image(union.width() as usize, union.height() as usize)?;
    arena.fill(&canvas, 0);

    let rect_a = rect_a.shifted(-union.x1, -union.y1);
    let rect_b = rect_b.shifted(-union.x1, -union.y1);
    blit(arena, a, &canvas, rect_a.x1 as usize, rect_a.y1 as usize);

    let overlap = rect_a.intersect(rect_b);
    if overlap.is_empty() {
        blit(arena, b, &canvas, rect_b.x1 as usize, rect_b.y1 as usize);
        trace_event!("composite_done", width = canvas.width(), height = canvas.height());
        return Ok(canvas);
    }

    let ramp = SeamRamp::new(rect_a, overlap);
    let words = arena.as_words_mut();
    for y in 0..b.height() {
        let cy = rect_b.y1 + y as i32;
        for x in 0..b.width() {
            let cx = rect_b.x1 + x as i32;
            let src = words[b.index(x, y)];
            let dst = canvas.index(cx as usize, cy as usize);
            if !overlap.contains(cx, cy) {
                words[dst] = src;
                continue;
            }
            let t = ramp.weight(cx, cy);
            if t >= 255 {
                continue;
            }
            words[dst] = if t <= 0 {
                src
            } else {
                mix(words[dst], src, t as u32)
            };
        }
    }

    trace_event!("composite_done", width = canvas.width(), height = canvas.height());
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::{composite, SeamRamp};
    use crate::arena::Arena;
    use crate::geometry::Rect;

    const A: u32 = 0xFF11_2233;
    const B: u32 = 0xFF44_5566;

    #[test]
    fn disjoint_images_are_copied_side_by_side() {
        let mut arena = Arena::new();
        let a = arena.image_from_pixels(2, 2, &[A; 4]).unwrap();
        let b = arena.image_from_pixels(2, 1, &[B; 2]).unwrap();
        let out = composite(&mut arena, &a, &b, 3, 1).unwrap();
        assert_eq!((out.width(), out.height()), (5, 2));
        assert_eq!(arena.row(&out, 0), &[A, A, 0, 0, 0]);
        assert_eq!(arena.row(&out, 1), &[A, A, 0, B, B]);
    }

    #[test]
    fn negative_offset_moves_a_right() {
        let mut arena = Arena::new();
        let a = arena.image_from_pixels(2, 1, &[A; 2]).unwrap();
        let b = arena.image_from_pixels(1, 1, &[B]).unwrap();
        let out = composite(&mut arena, &a, &b, -2, 0).unwrap();
        assert_eq!(arena.row(&out, 0), &[B, 0, A, A]);
    }

    #[test]
    fn ramp_points_toward_a() {
        // a spans x in [0, 8), b spans [4, 12); overlap is [4, 8).
        let rect_a = Rect::sized(8, 2);
        let overlap = Rect::new(4, 0, 8, 2);
        let ramp = SeamRamp::new(rect_a, overlap);
        assert_eq!(ramp.weight(4, 0), 256);
        assert_eq!(ramp.weight(8, 0), 0);
        assert!(ramp.weight(5, 1) > ramp.weight(6, 1));
    }

    #[test]
    fn coincident_centers_keep_a() {
        let rect = Rect::sized(4, 4);
        let ramp = SeamRamp::new(rect, rect);
        assert_eq!(ramp.weight(1, 2), 255);
    }

    #[test]
    fn overlap_blends_between_inputs() {
        let mut arena = Arena::new();
        let a = arena.image_from_pixels(8, 1, &[0xFFFF_FFFF; 8]).unwrap();
        let b = arena.image_from_pixels(8, 1, &[0xFF00_0000; 8]).unwrap();
        let out = composite(&mut arena, &a, &b, 4, 0).unwrap();
        let row = arena.row(&out, 0).to_vec();
        assert_eq!(row.len(), 12);
        assert!(row[..4].iter().all(|p| *p == 0xFFFF_FFFF));
        assert!(row[8..].iter().all(|p| *p == 0xFF00_0000));
        let reds: Vec<u32> = row[4..8].iter().map(|p| p & 0xFF).collect();
        assert!(reds.windows(2).all(|pair| pair[0] >= pair[1]));
        assert!(row[4..8].iter().all(|p| p >> 24 == 0xFF));
    }
}
