use serde::{Deserialize, Serialize};

/// A point in full-resolution source space, or a point in display space
/// when used as a zoom anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height in full-resolution source units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size2D {
    pub width: f64,
    pub height: f64,
}

impl Size2D {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    /// Multiply both dimensions by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }

    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }
}

/// Canvas size in display pixels. Zero means "not laid out yet".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

impl DisplaySize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Integer extent of the underlying data in full-resolution source pixels.
/// `x_max`/`y_max` are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x_min: i64,
    pub y_min: i64,
    pub x_max: i64,
    pub y_max: i64,
}

impl Bounds {
    pub const fn new(x_min: i64, y_min: i64, x_max: i64, y_max: i64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn width(&self) -> f64 {
        (self.x_max - self.x_min) as f64
    }

    pub fn height(&self) -> f64 {
        (self.y_max - self.y_min) as f64
    }

    pub fn extent(&self) -> Size2D {
        Size2D::new(self.width(), self.height())
    }

    /// Clamp an offset so a rectangle of `size` starting there stays inside
    /// the bounds. When `size` is larger than the bounds the minimum corner wins.
    pub fn clamp_offset(&self, offset: Point2D, size: Size2D) -> Point2D {
        let x_min = self.x_min as f64;
        let y_min = self.y_min as f64;
        Point2D::new(
            x_min.max(offset.x.min(self.x_max as f64 - size.width)),
            y_min.max(offset.y.min(self.y_max as f64 - size.height)),
        )
    }

    /// True if the rectangle `offset..offset + size` lies within the bounds,
    /// allowing `tolerance` units of floating-point slack.
    pub fn contains_rect(&self, offset: Point2D, size: Size2D, tolerance: f64) -> bool {
        offset.x >= self.x_min as f64 - tolerance
            && offset.y >= self.y_min as f64 - tolerance
            && offset.x + size.width <= self.x_max as f64 + tolerance
            && offset.y + size.height <= self.y_max as f64 + tolerance
    }
}
