#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use ndview_core::axis::{AxisPosition, AxisPositions};
use ndview_core::channels::ChannelStatus;
use ndview_core::geometry::Bounds;
use ndview_core::settings::DisplaySettings;
use ndview_core::source::{DataSource, UiNotifier};
use ndview_core::{ViewerConfig, ViewportModel};

/// In-memory data source with adjustable bounds.
pub struct FakeSource {
    pub bounds: Mutex<Option<Bounds>>,
    pub bit_depth: u32,
    pub max_resolution_index: u32,
}

impl FakeSource {
    pub fn bounded(x_max: i64, y_max: i64) -> Self {
        Self {
            bounds: Mutex::new(Some(Bounds::new(0, 0, x_max, y_max))),
            bit_depth: 16,
            max_resolution_index: 0,
        }
    }

    pub fn unbounded() -> Self {
        Self {
            bounds: Mutex::new(None),
            bit_depth: 8,
            max_resolution_index: 0,
        }
    }

    pub fn set_bounds(&self, bounds: Option<Bounds>) {
        *self.bounds.lock().unwrap() = bounds;
    }
}

impl DataSource for FakeSource {
    fn bounds(&self) -> Option<Bounds> {
        *self.bounds.lock().unwrap()
    }

    fn image_bit_depth(&self, _positions: &AxisPositions) -> u32 {
        self.bit_depth
    }

    fn max_resolution_index(&self) -> u32 {
        self.max_resolution_index
    }
}

/// A UI callback as seen by [`RecordingNotifier`].
#[derive(Clone, Debug, PartialEq)]
pub enum UiEvent {
    ReadHistogramControls,
    Checkboxes(Vec<ChannelStatus>),
    ContrastControls(String),
    SettingsRefresh,
}

/// Notifier that records every callback and the thread it ran on.
#[derive(Default)]
pub struct RecordingNotifier {
    pub events: Mutex<Vec<(UiEvent, ThreadId)>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().unwrap().iter().map(|(e, _)| e.clone()).collect()
    }

    pub fn threads(&self) -> Vec<ThreadId> {
        self.events.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    fn push(&self, event: UiEvent) {
        self.events.lock().unwrap().push((event, thread::current().id()));
    }
}

impl UiNotifier for RecordingNotifier {
    fn read_histogram_controls(&self) {
        self.push(UiEvent::ReadHistogramControls);
    }

    fn update_active_channel_checkboxes(&self, channels: &[ChannelStatus]) {
        self.push(UiEvent::Checkboxes(channels.to_vec()));
    }

    fn add_contrast_controls_if_needed(&self, channel: &str) {
        self.push(UiEvent::ContrastControls(channel.to_owned()));
    }

    fn update_gui_from_display_settings(&self, _settings: &DisplaySettings) {
        self.push(UiEvent::SettingsRefresh);
    }
}

/// Model over `source` with a recording notifier and default settings.
pub fn make_model(source: FakeSource) -> (Arc<ViewportModel>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let model = ViewportModel::new(
        Arc::new(source),
        notifier.clone(),
        DisplaySettings::new().into_shared(),
        ViewerConfig::default(),
    );
    (Arc::new(model), notifier)
}

/// Positions for an image on `channel` at time point `t`.
pub fn channel_image(channel: &str, t: i64) -> AxisPositions {
    let mut positions = AxisPositions::new();
    positions.insert("channel".to_owned(), AxisPosition::from(channel));
    positions.insert("time".to_owned(), AxisPosition::Integer(t));
    positions
}
