use crate::axis::{AxisPosition, AxisPositions};
use crate::geometry::{Bounds, DisplaySize, Point2D, Size2D};
use crate::transform::ViewportTransform;

/// Everything needed to render one frame of the view: the viewport transform
/// plus the position along every axis.
///
/// Renderers work from a copy obtained through
/// [`crate::ViewportModel::copy_view_coords`], so a pan or zoom that lands
/// while a frame is being drawn cannot tear it.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewCoords {
    transform: ViewportTransform,
    axes: AxisPositions,
    rgb: bool,
}

impl ViewCoords {
    pub fn new(transform: ViewportTransform, rgb: bool) -> Self {
        Self {
            transform,
            axes: AxisPositions::new(),
            rgb,
        }
    }

    pub fn transform(&self) -> &ViewportTransform {
        &self.transform
    }

    pub(crate) fn transform_mut(&mut self) -> &mut ViewportTransform {
        &mut self.transform
    }

    pub fn axis_position(&self, axis: &str) -> Option<&AxisPosition> {
        self.axes.get(axis)
    }

    pub fn axes_positions(&self) -> &AxisPositions {
        &self.axes
    }

    pub(crate) fn set_axis_position(&mut self, axis: &str, position: AxisPosition) {
        self.axes.insert(axis.to_owned(), position);
    }

    pub fn is_rgb(&self) -> bool {
        self.rgb
    }

    pub fn view_offset(&self) -> Point2D {
        self.transform.view_offset()
    }

    pub fn source_size(&self) -> Size2D {
        self.transform.source_size()
    }

    pub fn display_size(&self) -> DisplaySize {
        self.transform.display_size()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.transform.bounds()
    }

    pub fn magnification(&self) -> f64 {
        self.transform.magnification()
    }

    pub fn resolution_index(&self) -> u32 {
        self.transform.resolution_index()
    }

    pub fn downsample_factor(&self) -> f64 {
        self.transform.downsample_factor()
    }
}
