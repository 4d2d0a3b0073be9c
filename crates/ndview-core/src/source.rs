use crate::axis::AxisPositions;
use crate::channels::ChannelStatus;
use crate::geometry::Bounds;
use crate::settings::DisplaySettings;

/// The dataset being viewed.
pub trait DataSource: Send + Sync {
    /// Current extent of the data, or `None` if it is unbounded or unknown.
    fn bounds(&self) -> Option<Bounds>;

    /// Bit depth of the image stored at `positions`.
    fn image_bit_depth(&self, positions: &AxisPositions) -> u32;

    /// Coarsest pyramid level available (0 = full resolution only).
    fn max_resolution_index(&self) -> u32 {
        0
    }
}

/// Hooks into the widget layer. The model calls these on the UI thread with
/// no internal lock held, passing snapshots of the state that changed.
///
/// All methods have default no-op implementations.
pub trait UiNotifier: Send + Sync {
    /// Copy any pending edits from the histogram controls into the settings
    /// before a new channel is registered.
    fn read_histogram_controls(&self) {}

    /// Channel activation changed; refresh the visibility checkboxes.
    fn update_active_channel_checkboxes(&self, _channels: &[ChannelStatus]) {}

    /// A channel arrived; create its contrast controls if there are none.
    fn add_contrast_controls_if_needed(&self, _channel: &str) {}

    /// Settings changed in a way the contrast panel should reflect.
    fn update_gui_from_display_settings(&self, _settings: &DisplaySettings) {}
}

/// Notifier for headless use.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpNotifier;

impl UiNotifier for NoOpNotifier {}
