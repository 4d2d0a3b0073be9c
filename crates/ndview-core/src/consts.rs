use crate::settings::Rgb;

/// Smallest visible source width/height, in full-resolution units.
/// Zooming further in than this is rejected.
pub const MIN_SOURCE_EXTENT: f64 = 5.0;

/// Default name of the axis whose string labels are channel names.
pub const DEFAULT_CHANNEL_AXIS: &str = "channel";

/// Initial visible source width/height when the data source reports no bounds.
pub const DEFAULT_UNBOUNDED_SOURCE_EXTENT: f64 = 512.0;

/// Display name used for the placeholder channel shown before any real
/// channel has arrived.
pub const NO_CHANNEL_NAME: &str = "(no channel)";

/// Ignore-outliers percentage used by fresh display settings.
pub const DEFAULT_IGNORE_OUTLIERS_PERCENTAGE: f64 = 0.1;

/// Colors assigned to channels in arrival order (wraps around).
pub const CHANNEL_PALETTE: [Rgb; 7] = [
    Rgb::new(255, 255, 255),
    Rgb::new(0, 255, 0),
    Rgb::new(255, 0, 255),
    Rgb::new(0, 255, 255),
    Rgb::new(255, 0, 0),
    Rgb::new(0, 0, 255),
    Rgb::new(255, 255, 0),
];
