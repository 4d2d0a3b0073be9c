use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CHANNEL_AXIS, DEFAULT_UNBOUNDED_SOURCE_EXTENT};

/// Static viewer options fixed for the lifetime of a [`crate::ViewportModel`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Axis whose labels name channels.
    #[serde(default = "default_channel_axis")]
    pub channel_axis: String,
    /// Pixels are RGB triples rather than single-channel intensities.
    #[serde(default)]
    pub rgb: bool,
    /// Initial visible width/height (source units) when the data is unbounded.
    #[serde(default = "default_unbounded_source_extent")]
    pub unbounded_source_extent: f64,
}

fn default_channel_axis() -> String {
    DEFAULT_CHANNEL_AXIS.to_owned()
}
fn default_unbounded_source_extent() -> f64 {
    DEFAULT_UNBOUNDED_SOURCE_EXTENT
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            channel_axis: default_channel_axis(),
            rgb: false,
            unbounded_source_extent: DEFAULT_UNBOUNDED_SOURCE_EXTENT,
        }
    }
}
