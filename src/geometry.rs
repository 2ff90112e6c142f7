//! Axis-aligned integer rectangles.
//!
//! Rects are half-open: `[x1, x2) x [y1, y2)`. The operations here keep a
//! rect normalized when their inputs are, but nothing enforces `x1 <= x2`;
//! an intersection of disjoint rects yields inverted extents.

/// Integer rectangle with half-open extents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    /// Creates a rect from its corner coordinates.
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Creates a `width` x `height` rect anchored at the origin.
    pub const fn sized(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// Returns true only when the rect is collapsed on both axes.
    ///
    /// A rect collapsed on a single axis still counts as non-empty here;
    /// consumers that index pixels clamp the collapsed extent to zero.
    pub fn is_empty(&self) -> bool {
        self.x1 >= self.x2 && self.y1 >= self.y2
    }

    /// Clamps `self` to lie within `other`.
    pub fn intersect(self, other: Rect) -> Rect {
        Rect {
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
            x2: self.x2.min(other.x2),
            y2: self.y2.min(other.y2),
        }
    }

    /// Widens `self` to cover `other`.
    pub fn extend(self, other: Rect) -> Rect {
        Rect {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Translates the rect by `(dx, dy)`.
    pub fn shifted(self, dx: i32, dy: i32) -> Rect {
        Rect {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
        }
    }

    /// Returns true when the pixel at `(x, y)` lies inside the rect.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }

    /// Returns twice the center point, keeping the arithmetic integral.
    pub fn doubled_center(&self) -> (i64, i64) {
        (
            i64::from(self.x1) + i64::from(self.x2),
            i64::from(self.y1) + i64::from(self.y2),
        )
    }

    /// Returns the four corner points.
    pub fn corners(&self) -> [(i32, i32); 4] {
        [
            (self.x1, self.y1),
            (self.x2, self.y1),
            (self.x1, self.y2),
            (self.x2, self.y2),
        ]
    }
}

/// Maps a placement clamped to a target back into the source's own frame.
///
/// `unclipped_in_target` is the source rect placed at its offset over the
/// target; `clipped_in_target` is that placement after intersecting with the
/// target bounds. The result is the sub-rect of the source that remains
/// visible, in source-local coordinates.
pub fn clip_in_source(unclipped_in_target: Rect, clipped_in_target: Rect) -> Rect {
    let x1 = if unclipped_in_target.x1 < 0 {
        -unclipped_in_target.x1
    } else {
        0
    };
    let y1 = if unclipped_in_target.y1 < 0 {
        -unclipped_in_target.y1
    } else {
        0
    };
    Rect {
        x1,
        y1,
        x2: clipped_in_target.width() + x1,
        y2: clipped_in_target.height() + y1,
    }
}
