pub mod axis;
pub mod channels;
pub mod config;
pub mod consts;
pub mod coords;
pub mod dispatch;
pub mod error;
pub mod geometry;
pub mod model;
pub mod settings;
pub mod source;
pub mod transform;

pub use axis::{AxisPosition, AxisPositions, AxisRegistry};
pub use channels::{ActivationMode, ChannelKey, ChannelSet, ChannelStatus, SelectionOutcome};
pub use config::ViewerConfig;
pub use coords::ViewCoords;
pub use dispatch::{ui_channel, UiDispatcher, UiQueue};
pub use error::{Result, ViewerError};
pub use geometry::{Bounds, DisplaySize, Point2D, Size2D};
pub use model::ViewportModel;
pub use settings::{ChannelDisplaySettings, DisplaySettings, HistogramSettings, Rgb};
pub use source::{DataSource, NoOpNotifier, UiNotifier};
pub use transform::ViewportTransform;
