//! The viewport model: single entry point for UI gestures and for the
//! data-arrival callback.
//!
//! UI-thread calls (pan, zoom, channel clicks, ...) mutate state directly.
//! [`ViewportModel::on_image_arrived`] may be called from the producer thread;
//! it records axis labels itself and, when a new channel shows up, hands the
//! channel registration to the UI thread through a [`UiDispatcher`] and blocks
//! until it is done. Without a dispatcher everything runs on the caller.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, warn};

use crate::axis::{AxisPosition, AxisPositions, AxisRegistry};
use crate::channels::{ChannelKey, ChannelSet, ChannelStatus, SelectionOutcome};
use crate::config::ViewerConfig;
use crate::coords::ViewCoords;
use crate::dispatch::UiDispatcher;
use crate::error::Result;
use crate::geometry::{Bounds, DisplaySize, Point2D, Size2D};
use crate::settings::{DisplaySettings, HistogramSettings, Rgb, SharedSettings};
use crate::source::{DataSource, UiNotifier};
use crate::transform::ViewportTransform;

pub struct ViewportModel {
    config: ViewerConfig,
    coords: Mutex<ViewCoords>,
    channels: Mutex<ChannelSet>,
    axes: AxisRegistry,
    settings: Mutex<SharedSettings>,
    source: Arc<dyn DataSource>,
    ui: Arc<dyn UiNotifier>,
    dispatcher: Option<UiDispatcher>,
}

impl ViewportModel {
    /// Build a model showing the whole of `source` (or a default-sized window
    /// when the source is unbounded).
    pub fn new(
        source: Arc<dyn DataSource>,
        ui: Arc<dyn UiNotifier>,
        settings: SharedSettings,
        config: ViewerConfig,
    ) -> Self {
        let transform = ViewportTransform::new(source.bounds(), config.unbounded_source_extent)
            .with_max_resolution_index(source.max_resolution_index());
        let coords = ViewCoords::new(transform, config.rgb);

        let mut channels = ChannelSet::new();
        {
            let mut s = write_settings(&settings);
            if s.is_composite_mode() {
                channels.set_composite_mode(true, None);
            }
            s.set_placeholder(source.image_bit_depth(&AxisPositions::new()));
        }

        Self {
            config,
            coords: Mutex::new(coords),
            channels: Mutex::new(channels),
            axes: AxisRegistry::new(),
            settings: Mutex::new(settings),
            source,
            ui,
            dispatcher: None,
        }
    }

    /// Route channel registration from producer threads through `dispatcher`.
    pub fn with_ui_dispatcher(mut self, dispatcher: UiDispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn channel_axis(&self) -> &str {
        &self.config.channel_axis
    }

    // ------------------------------------------------------------------
    // Viewport
    // ------------------------------------------------------------------

    pub fn pan(&self, dx: f64, dy: f64) {
        lock(&self.coords).transform_mut().pan(dx, dy);
    }

    /// Zoom by `factor` about a display-pixel `anchor` (view centre if `None`).
    /// Returns `false` if the zoom was refused at maximum magnification.
    pub fn zoom(&self, factor: f64, anchor: Option<Point2D>) -> bool {
        lock(&self.coords).transform_mut().zoom(factor, anchor)
    }

    pub fn resize(&self, width: u32, height: u32) {
        lock(&self.coords).transform_mut().resize(width, height);
    }

    pub fn set_view_offset(&self, x: f64, y: f64) {
        lock(&self.coords).transform_mut().set_view_offset(x, y);
    }

    pub fn view_offset(&self) -> Point2D {
        lock(&self.coords).view_offset()
    }

    pub fn source_size(&self) -> Size2D {
        lock(&self.coords).source_size()
    }

    pub fn display_size(&self) -> DisplaySize {
        lock(&self.coords).display_size()
    }

    pub fn magnification(&self) -> f64 {
        lock(&self.coords).magnification()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        lock(&self.coords).bounds()
    }

    /// Deep copy of the current view for rendering.
    pub fn copy_view_coords(&self) -> ViewCoords {
        lock(&self.coords).clone()
    }

    /// Adopt new data bounds.
    ///
    /// When newly acquired data extends past the old bounds, the view zooms
    /// out by the growth factor so the same fraction of the data stays visible.
    /// Shrinking data never zooms the view in.
    pub fn update_data_bounds(&self, new_bounds: Option<Bounds>) {
        let mut coords = lock(&self.coords);
        let transform = coords.transform_mut();
        match (transform.bounds(), new_bounds) {
            (Some(old), Some(new)) if old != new => {
                let x_ratio = old.width() / new.width();
                let y_ratio = old.height() / new.height();
                transform.set_bounds(Some(new));
                if x_ratio < 1.0 || y_ratio < 1.0 {
                    let factor = 1.0 / x_ratio.min(y_ratio);
                    info!(factor, ?new, "Data bounds grew, zooming out");
                    transform.zoom(factor, None);
                }
            }
            (old, new) if old != new => {
                debug!(?old, ?new, "Data bounds changed");
                transform.set_bounds(new);
            }
            _ => {}
        }
    }

    /// Pull the current bounds from the data source.
    pub fn refresh_bounds(&self) {
        self.update_data_bounds(self.source.bounds());
    }

    // ------------------------------------------------------------------
    // Axes
    // ------------------------------------------------------------------

    pub fn axis_registry(&self) -> &AxisRegistry {
        &self.axes
    }

    pub fn is_integer_axis(&self, axis: &str) -> bool {
        self.axes.is_integer_axis(axis)
    }

    pub fn integer_position_of(&self, axis: &str, label: &str) -> Result<usize> {
        self.axes.index_of(axis, label)
    }

    pub fn string_position_of(&self, axis: &str, index: i64) -> Result<String> {
        self.axes.label_at(axis, index)
    }

    pub fn axis_position(&self, axis: &str) -> Option<AxisPosition> {
        lock(&self.coords).axis_position(axis).cloned()
    }

    /// Move the view along `axis`.
    ///
    /// On a string-valued axis an integer position is taken as an index and
    /// stored as its label; labels must already have been observed.
    pub fn set_axis_position(&self, axis: &str, position: AxisPosition) -> Result<()> {
        let resolved = match position {
            AxisPosition::Integer(index) if !self.axes.is_integer_axis(axis) => {
                AxisPosition::Label(self.axes.label_at(axis, index)?)
            }
            AxisPosition::Label(label) => {
                self.axes.index_of(axis, &label)?;
                AxisPosition::Label(label)
            }
            integer => integer,
        };
        lock(&self.coords).set_axis_position(axis, resolved);
        Ok(())
    }

    /// Integer (scrollbar) index of the current position on `axis`.
    pub fn axis_index(&self, axis: &str) -> Result<Option<i64>> {
        match self.axis_position(axis) {
            None => Ok(None),
            Some(AxisPosition::Integer(i)) => Ok(Some(i)),
            Some(AxisPosition::Label(label)) => {
                let index = self.axes.index_of(axis, &label)?;
                Ok(Some(index as i64))
            }
        }
    }

    /// A position control moved. Applies `positions`, then in single-channel
    /// mode makes the channel now shown the only active one.
    pub fn scrollbars_moved(&self, positions: &AxisPositions) -> Result<()> {
        for (axis, position) in positions {
            self.set_axis_position(axis, position.clone())?;
        }

        if let Some(current) = self.current_channel() {
            let mut channels = lock(&self.channels);
            if !channels.is_composite() && !channels.contains(&current) {
                warn!(channel = %current, "Scroll position names a channel that never arrived");
            }
            channels.scroll_position_changed(&current);
        }

        self.ui.update_gui_from_display_settings(&self.display_settings());
        self.ui.update_active_channel_checkboxes(&self.channel_statuses());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Channels
    // ------------------------------------------------------------------

    /// Label of the current position on the channel axis, if it has one.
    pub fn current_channel(&self) -> Option<String> {
        lock(&self.coords)
            .axis_position(&self.config.channel_axis)
            .and_then(|p| p.as_label().map(str::to_owned))
    }

    pub fn is_composite_mode(&self) -> bool {
        lock(&self.channels).is_composite()
    }

    pub fn set_composite_mode(&self, composite: bool) {
        let current = self.current_channel();
        let statuses = {
            let mut channels = lock(&self.channels);
            channels.set_composite_mode(composite, current.as_deref());
            channels.statuses()
        };
        write_settings(&self.settings_handle()).set_composite_mode(composite);
        self.ui.update_active_channel_checkboxes(&statuses);
    }

    /// A channel's visibility checkbox was clicked.
    pub fn set_active_by_user_selection(
        &self,
        channel: &str,
        selected: bool,
    ) -> Result<SelectionOutcome> {
        let (outcome, statuses) = {
            let mut channels = lock(&self.channels);
            let outcome = channels.set_active_by_user_selection(channel, selected)?;
            (outcome, channels.statuses())
        };
        if outcome == SelectionOutcome::Selected {
            lock(&self.coords).set_axis_position(
                &self.config.channel_axis,
                AxisPosition::Label(channel.to_owned()),
            );
        }
        if outcome != SelectionOutcome::Toggled {
            // Other checkboxes may have flipped as a side effect.
            self.ui.update_active_channel_checkboxes(&statuses);
        }
        Ok(outcome)
    }

    pub fn is_channel_active(&self, channel: &str) -> bool {
        lock(&self.channels).is_active(channel)
    }

    /// Channels to show controls for: real channels in arrival order, or the
    /// placeholder before any has arrived.
    pub fn displayed_channels(&self) -> Vec<ChannelKey> {
        lock(&self.channels).keys()
    }

    pub fn channel_statuses(&self) -> Vec<ChannelStatus> {
        lock(&self.channels).statuses()
    }

    /// Data-arrival callback, typically invoked on the producer thread.
    ///
    /// Records string-valued positions. If the channel-axis label names a
    /// channel not registered yet, it is registered on the UI thread
    /// (activation, settings and UI controls) before this returns. Failures
    /// of that hand-off are returned to the caller.
    pub fn on_image_arrived(self: &Arc<Self>, positions: AxisPositions, bit_depth: u32) -> Result<()> {
        let mut new_channel = None;
        for (axis, value) in &positions {
            if self.axes.observe(axis, value) {
                debug!(axis = %axis, label = %value, "New axis label");
            }
            // Decided against the channel set, not the registry, so an
            // arrival whose hand-off failed is registered on the next one.
            if *axis == self.config.channel_axis {
                if let Some(label) = value.as_label() {
                    if !lock(&self.channels).contains(label) {
                        new_channel = Some(label.to_owned());
                    }
                }
            }
        }
        let Some(channel) = new_channel else {
            return Ok(());
        };

        match &self.dispatcher {
            Some(dispatcher) => {
                let model = Arc::clone(self);
                dispatcher.invoke_and_wait(move || {
                    model.register_channel(&channel, bit_depth);
                    Ok(())
                })
            }
            None => {
                self.register_channel(&channel, bit_depth);
                Ok(())
            }
        }
    }

    /// Same as [`on_image_arrived`](Self::on_image_arrived) with the bit depth
    /// looked up from the data source.
    pub fn on_image_arrived_from_source(self: &Arc<Self>, positions: AxisPositions) -> Result<()> {
        let bit_depth = self.source.image_bit_depth(&positions);
        self.on_image_arrived(positions, bit_depth)
    }

    fn register_channel(&self, channel: &str, bit_depth: u32) {
        self.ui.read_histogram_controls();

        {
            let shared = self.settings_handle();
            let mut settings = write_settings(&shared);
            settings.clear_placeholder();
            settings.add_channel(channel, bit_depth);
        }

        let (composite, statuses) = {
            let mut channels = lock(&self.channels);
            channels.channel_arrived(channel, bit_depth);
            (channels.is_composite(), channels.statuses())
        };
        if !composite {
            lock(&self.coords).set_axis_position(
                &self.config.channel_axis,
                AxisPosition::Label(channel.to_owned()),
            );
        }
        info!(channel, bit_depth, composite, "Channel registered");

        self.ui.add_contrast_controls_if_needed(channel);
        self.ui.update_active_channel_checkboxes(&statuses);
    }

    // ------------------------------------------------------------------
    // Display settings
    // ------------------------------------------------------------------

    /// Handle to the shared settings, e.g. for the host to serialize.
    pub fn settings_handle(&self) -> SharedSettings {
        Arc::clone(&lock(&self.settings))
    }

    /// Copy of the current settings.
    pub fn display_settings(&self) -> DisplaySettings {
        read_settings(&self.settings_handle()).clone()
    }

    /// Replace the settings wholesale (e.g. after loading them from disk).
    /// The loaded composite flag is applied to channel activation.
    pub fn set_display_settings(&self, settings: SharedSettings) {
        let composite = read_settings(&settings).is_composite_mode();
        *lock(&self.settings) = settings;
        if composite != self.is_composite_mode() {
            self.set_composite_mode(composite);
        }
        self.ui.update_gui_from_display_settings(&self.display_settings());
    }

    pub fn set_histogram_settings(&self, histogram: HistogramSettings) {
        write_settings(&self.settings_handle()).histogram = histogram;
        if histogram.composite != self.is_composite_mode() {
            self.set_composite_mode(histogram.composite);
        }
    }

    pub fn set_channel_color(&self, channel: &str, color: Rgb) {
        write_settings(&self.settings_handle()).set_color(channel, color);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read_settings(settings: &SharedSettings) -> RwLockReadGuard<'_, DisplaySettings> {
    settings.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_settings(settings: &SharedSettings) -> RwLockWriteGuard<'_, DisplaySettings> {
    settings.write().unwrap_or_else(PoisonError::into_inner)
}
