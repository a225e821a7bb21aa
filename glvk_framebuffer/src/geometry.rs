//! Integer rectangles in framebuffer coordinates
//!
//! Corner arithmetic saturates at the `i32` range, so any GL-legal origin
//! and extent can be clipped without overflowing.

/// Rectangle with an origin and a signed size
///
/// Negative width or height describe a mirrored rectangle, as blit
/// requests do (`x0 > x1`). All other users work on normalized rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle covering a whole `width` x `height` image
    pub const fn from_extent(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width: width as i32, height: height as i32 }
    }

    /// Build from GL-style corner coordinates
    pub const fn from_corners(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x: x0, y: y0, width: x1.saturating_sub(x0), height: y1.saturating_sub(y0) }
    }

    pub const fn x1(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    pub const fn y1(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    pub const fn is_flipped_x(&self) -> bool {
        self.width < 0
    }

    pub const fn is_flipped_y(&self) -> bool {
        self.height < 0
    }

    /// Same area with non-negative width and height
    pub fn normalized(&self) -> Rect {
        Rect {
            x: self.x.min(self.x1()),
            y: self.y.min(self.y1()),
            width: self.width.saturating_abs(),
            height: self.height.saturating_abs(),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Intersection of two normalized rectangles
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.x1().min(other.x1());
        let y1 = self.y1().min(other.y1());
        if x1 <= x0 || y1 <= y0 {
            None
        } else {
            Some(Rect::from_corners(x0, y0, x1, y1))
        }
    }

    /// Bounding-box intersection test on normalized rectangles
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.intersect(other).is_some()
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x && other.y >= self.y && other.x1() <= self.x1() && other.y1() <= self.y1()
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect { x: self.x.saturating_add(dx), y: self.y.saturating_add(dy), ..*self }
    }

    /// Same rows seen from the other end of an image `height` rows tall
    ///
    /// Maps a normalized rectangle between bottom-up and top-down row order.
    pub fn flipped_y(&self, height: i32) -> Rect {
        Rect { y: height.saturating_sub(self.y1()), ..*self }
    }

    /// Pixel count of a normalized rectangle
    pub fn area(&self) -> usize {
        if self.is_empty() { 0 } else { self.width as usize * self.height as usize }
    }
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
