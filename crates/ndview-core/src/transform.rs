use tracing::debug;

use crate::consts::MIN_SOURCE_EXTENT;
use crate::geometry::{Bounds, DisplaySize, Point2D, Size2D};

/// Mapping between full-resolution source space and display pixels.
///
/// The transform is described by the top-left corner of the visible source
/// rectangle (`view_offset`), its size in source units (`source_size`), and
/// the canvas size it is drawn into (`display_size`). Magnification is derived
/// from the last two and never stored.
///
/// When `bounds` is set every operation keeps the visible rectangle inside it
/// by clamping; without bounds the view moves freely. In both cases neither
/// side of the visible rectangle drops below [`MIN_SOURCE_EXTENT`].
#[derive(Clone, Debug, PartialEq)]
pub struct ViewportTransform {
    view_offset: Point2D,
    source_size: Size2D,
    display_size: DisplaySize,
    bounds: Option<Bounds>,
    max_resolution_index: u32,
}

impl ViewportTransform {
    /// Initial view over `bounds`: the whole bounded extent, or a square of
    /// `unbounded_extent` units at the origin when the data is unbounded.
    /// The display size is unknown until the first [`resize`](Self::resize).
    pub fn new(bounds: Option<Bounds>, unbounded_extent: f64) -> Self {
        let (view_offset, source_size) = match bounds {
            Some(b) => (
                Point2D::new(b.x_min as f64, b.y_min as f64),
                b.extent(),
            ),
            None => (
                Point2D::default(),
                Size2D::new(unbounded_extent, unbounded_extent),
            ),
        };
        Self::with_state(view_offset, source_size, DisplaySize::default(), bounds)
    }

    /// Build a transform from explicit state, e.g. when restoring a saved view.
    /// The source size is floored and the offset clamped like any other update.
    pub fn with_state(
        view_offset: Point2D,
        source_size: Size2D,
        display_size: DisplaySize,
        bounds: Option<Bounds>,
    ) -> Self {
        let source_size = enforce_floor(source_size);
        let mut t = Self {
            view_offset,
            source_size,
            display_size,
            bounds,
            max_resolution_index: 0,
        };
        t.view_offset = t.clamped(view_offset, source_size);
        t
    }

    pub fn with_max_resolution_index(mut self, max_resolution_index: u32) -> Self {
        self.max_resolution_index = max_resolution_index;
        self
    }

    pub fn view_offset(&self) -> Point2D {
        self.view_offset
    }

    pub fn source_size(&self) -> Size2D {
        self.source_size
    }

    pub fn display_size(&self) -> DisplaySize {
        self.display_size
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn max_resolution_index(&self) -> u32 {
        self.max_resolution_index
    }

    pub fn set_max_resolution_index(&mut self, max_resolution_index: u32) {
        self.max_resolution_index = max_resolution_index;
    }

    /// Display pixels per full-resolution source pixel.
    ///
    /// Before the canvas has been laid out this is `1.0`, so gestures arriving
    /// early still move the view by a sane amount.
    pub fn magnification(&self) -> f64 {
        if self.display_size.is_empty() {
            return 1.0;
        }
        f64::from(self.display_size.width) / self.source_size.width
    }

    /// Pyramid level whose pixels are closest to (but not smaller than) one
    /// display pixel, capped at the coarsest level the data provides.
    pub fn resolution_index(&self) -> u32 {
        if self.display_size.is_empty() {
            return 0;
        }
        let ratio = self.source_size.width / f64::from(self.display_size.width);
        if ratio < 2.0 {
            return 0;
        }
        let level = ratio.log2().floor() as u32;
        level.min(self.max_resolution_index)
    }

    /// Scale of the active resolution level relative to full resolution.
    pub fn downsample_factor(&self) -> f64 {
        2f64.powi(self.resolution_index() as i32)
    }

    /// Display pixels per pixel of the active resolution level.
    pub fn magnification_at_resolution_level(&self) -> f64 {
        self.magnification() * self.downsample_factor()
    }

    /// Convert a display-pixel position to full-resolution source coordinates.
    pub fn display_to_source(&self, p: Point2D) -> Point2D {
        let scale = self.downsample_factor() / self.magnification_at_resolution_level();
        Point2D::new(
            self.view_offset.x + p.x * scale,
            self.view_offset.y + p.y * scale,
        )
    }

    /// Convert full-resolution source coordinates to a display-pixel position.
    pub fn source_to_display(&self, p: Point2D) -> Point2D {
        let scale = self.magnification_at_resolution_level() / self.downsample_factor();
        Point2D::new(
            (p.x - self.view_offset.x) * scale,
            (p.y - self.view_offset.y) * scale,
        )
    }

    /// True if the visible rectangle lies inside the bounds (always true when
    /// unbounded).
    pub fn is_within_bounds(&self, tolerance: f64) -> bool {
        self.bounds.map_or(true, |b| {
            b.contains_rect(self.view_offset, self.source_size, tolerance)
        })
    }

    /// Move the view by a delta given in display pixels.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let scale = self.downsample_factor() / self.magnification_at_resolution_level();
        let target = Point2D::new(
            self.view_offset.x + dx * scale,
            self.view_offset.y + dy * scale,
        );
        self.view_offset = self.clamped(target, self.source_size);
        if self.view_offset != target {
            debug!(?target, clamped = ?self.view_offset, "Pan clamped to data bounds");
        }
    }

    /// Scale the visible source rectangle by `factor` (< 1 zooms in) keeping
    /// `anchor` fixed. `anchor` is a display-pixel position; `None` zooms about
    /// the centre of the visible rectangle.
    ///
    /// Returns `false` and leaves the view untouched when the result would be
    /// narrower than [`MIN_SOURCE_EXTENT`] in either dimension.
    pub fn zoom(&mut self, factor: f64, anchor: Option<Point2D>) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            debug!(factor, "Ignoring non-positive zoom factor");
            return false;
        }

        let old_offset = self.view_offset;
        let old_size = self.source_size;
        let center = match anchor {
            None => Point2D::new(
                old_offset.x + old_size.width / 2.0,
                old_offset.y + old_size.height / 2.0,
            ),
            Some(p) => self.display_to_source(p),
        };

        let mut new_size = old_size.scaled(factor);
        if below_floor(new_size) {
            debug!(factor, ?new_size, "Zoom rejected: maximum magnification reached");
            return false;
        }
        if let Some(b) = self.bounds {
            new_size = fit_within(new_size, b.extent());
            if below_floor(new_size) {
                debug!(factor, ?new_size, "Zoom rejected: bounds smaller than minimum extent");
                return false;
            }
        }

        let offset = Point2D::new(
            center.x - (center.x - old_offset.x) * new_size.width / old_size.width,
            center.y - (center.y - old_offset.y) * new_size.height / old_size.height,
        );
        self.source_size = new_size;
        self.view_offset = self.clamped(offset, new_size);
        true
    }

    /// Adapt the visible source rectangle to a new canvas size.
    ///
    /// With bounds the rectangle is widened (or heightened) to the canvas
    /// aspect ratio and then shrunk proportionally if it would exceed the
    /// data. Without bounds the source-to-display density is preserved, or on
    /// the very first resize the width is derived from the canvas aspect.
    /// A zero-sized canvas is ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        let target = DisplaySize::new(width, height);
        if target.is_empty() {
            debug!(width, height, "Ignoring resize to an empty canvas");
            return;
        }

        let canvas_aspect = target.aspect();
        let source = self.source_size;
        let source_aspect = source.aspect();
        let old_display = self.display_size;

        let candidate = match self.bounds {
            Some(b) => {
                let widened = if canvas_aspect > source_aspect {
                    Size2D::new(canvas_aspect / source_aspect * source.width, source.height)
                } else {
                    Size2D::new(source.width, source.height / (canvas_aspect / source_aspect))
                };
                fit_within(widened, b.extent())
            }
            None if !old_display.is_empty() => Size2D::new(
                source.width * f64::from(width) / f64::from(old_display.width),
                source.height * f64::from(height) / f64::from(old_display.height),
            ),
            None => Size2D::new(source.width / source_aspect * canvas_aspect, source.height),
        };
        let new_size = enforce_floor(candidate);

        self.view_offset = self.clamped(self.view_offset, new_size);
        self.display_size = target;
        self.source_size = new_size;
    }

    /// Move the top-left of the visible rectangle directly, clamped to bounds.
    pub fn set_view_offset(&mut self, x: f64, y: f64) {
        self.view_offset = self.clamped(Point2D::new(x, y), self.source_size);
    }

    /// Replace the data bounds and re-clamp the offset.
    ///
    /// The visible size is left alone, so the magnification never changes
    /// here. A view larger than the new extent is pinned to its minimum corner.
    pub fn set_bounds(&mut self, bounds: Option<Bounds>) {
        self.bounds = bounds;
        self.view_offset = self.clamped(self.view_offset, self.source_size);
    }

    fn clamped(&self, offset: Point2D, size: Size2D) -> Point2D {
        match self.bounds {
            Some(b) => b.clamp_offset(offset, size),
            None => offset,
        }
    }
}

fn below_floor(size: Size2D) -> bool {
    size.width < MIN_SOURCE_EXTENT || size.height < MIN_SOURCE_EXTENT
}

/// Scale `size` down proportionally so it fits inside `extent`.
fn fit_within(size: Size2D, extent: Size2D) -> Size2D {
    if extent.width <= 0.0 || extent.height <= 0.0 {
        return size;
    }
    let overzoom = (size.width / extent.width).max(size.height / extent.height);
    if overzoom > 1.0 {
        size.scaled(1.0 / overzoom)
    } else {
        size
    }
}

/// Scale `size` up proportionally so its smaller side is at least the floor.
fn enforce_floor(size: Size2D) -> Size2D {
    let min_side = size.min_side();
    if !min_side.is_finite() || min_side <= 0.0 {
        return Size2D::new(MIN_SOURCE_EXTENT, MIN_SOURCE_EXTENT);
    }
    if min_side < MIN_SOURCE_EXTENT {
        size.scaled(MIN_SOURCE_EXTENT / min_side)
    } else {
        size
    }
}
