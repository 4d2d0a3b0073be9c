mod common;

use std::sync::Arc;

use approx::assert_abs_diff_eq;

use common::{channel_image, make_model, FakeSource, RecordingNotifier, UiEvent};
use ndview_core::axis::{AxisPosition, AxisPositions};
use ndview_core::channels::{ChannelKey, SelectionOutcome};
use ndview_core::consts::{CHANNEL_PALETTE, NO_CHANNEL_NAME};
use ndview_core::error::ViewerError;
use ndview_core::geometry::{Bounds, Point2D};
use ndview_core::settings::{DisplaySettings, HistogramSettings, Rgb};
use ndview_core::{ViewerConfig, ViewportModel};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn active_channels(model: &ViewportModel) -> Vec<String> {
    model
        .channel_statuses()
        .into_iter()
        .filter(|s| s.active)
        .map(|s| s.key.display_name().to_owned())
        .collect()
}

fn model_with_channels(names: &[&str]) -> (Arc<ViewportModel>, Arc<RecordingNotifier>) {
    let (model, notifier) = make_model(FakeSource::bounded(100, 100));
    for name in names {
        model.on_image_arrived(channel_image(name, 0), 16).unwrap();
    }
    (model, notifier)
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn test_new_model_shows_placeholder_channel() {
    let (model, notifier) = make_model(FakeSource::bounded(100, 100));
    assert_eq!(model.displayed_channels(), vec![ChannelKey::NoChannel]);
    assert!(model.current_channel().is_none());

    let settings = model.display_settings();
    let placeholder = settings.settings_for(&ChannelKey::NoChannel).unwrap();
    assert!(settings.channels.is_empty());
    assert_eq!(placeholder.bit_depth, 16);
    assert_eq!(placeholder.contrast_max, 65535);
    assert!(notifier.events().is_empty());
}

#[test]
fn test_new_model_adopts_composite_settings() {
    let mut settings = DisplaySettings::new();
    settings.histogram.composite = true;
    let model = ViewportModel::new(
        Arc::new(FakeSource::unbounded()),
        Arc::new(RecordingNotifier::default()),
        settings.into_shared(),
        ViewerConfig::default(),
    );
    assert!(model.is_composite_mode());
}

#[test]
fn test_leaving_composite_before_any_position_waits_for_next_channel() {
    let mut settings = DisplaySettings::new();
    settings.histogram.composite = true;
    let model = Arc::new(ViewportModel::new(
        Arc::new(FakeSource::bounded(100, 100)),
        Arc::new(RecordingNotifier::default()),
        settings.into_shared(),
        ViewerConfig::default(),
    ));
    model.on_image_arrived(channel_image("DAPI", 0), 16).unwrap();
    model.on_image_arrived(channel_image("GFP", 0), 16).unwrap();
    assert!(model.current_channel().is_none());

    // No position to follow, so activation is left as composite had it.
    model.set_composite_mode(false);
    assert!(!model.is_composite_mode());
    assert!(model.current_channel().is_none());
    assert!(active_channels(&model).is_empty());

    model.on_image_arrived(channel_image("RFP", 0), 16).unwrap();
    assert_eq!(active_channels(&model), vec!["RFP"]);
    assert_eq!(model.current_channel().as_deref(), Some("RFP"));

    model.set_active_by_user_selection("DAPI", true).unwrap();
    assert_eq!(active_channels(&model), vec!["DAPI"]);
}

#[test]
fn test_new_model_views_whole_bounded_source() {
    let (model, _) = make_model(FakeSource::bounded(300, 200));
    assert_eq!(model.bounds(), Some(Bounds::new(0, 0, 300, 200)));
    assert_abs_diff_eq!(model.source_size().width, 300.0);
    assert_abs_diff_eq!(model.source_size().height, 200.0);
}

// ---------------------------------------------------------------------------
// Viewport gestures
// ---------------------------------------------------------------------------

#[test]
fn test_zoom_scenario_through_model() {
    let (model, _) = make_model(FakeSource::bounded(100, 100));
    model.resize(100, 100);
    assert!(model.zoom(0.5, Some(Point2D::new(50.0, 50.0))));
    assert_abs_diff_eq!(model.source_size().width, 50.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.view_offset().x, 25.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.view_offset().y, 25.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.magnification(), 2.0, epsilon = 1e-9);
}

#[test]
fn test_copy_view_coords_is_detached() {
    let (model, _) = model_with_channels(&["DAPI"]);
    model.resize(100, 100);
    let frame = model.copy_view_coords();

    model.pan(10.0, 10.0);
    model.zoom(0.5, None);
    assert_abs_diff_eq!(frame.source_size().width, 100.0);
    assert_eq!(
        frame.axis_position("channel"),
        Some(&AxisPosition::Label("DAPI".into()))
    );
    assert_ne!(frame, model.copy_view_coords());
}

// ---------------------------------------------------------------------------
// Data bounds
// ---------------------------------------------------------------------------

#[test]
fn test_growing_bounds_zooms_out_proportionally() {
    let (model, _) = make_model(FakeSource::bounded(100, 100));
    model.resize(100, 100);
    model.zoom(0.5, None);
    assert_abs_diff_eq!(model.source_size().width, 50.0, epsilon = 1e-9);

    model.update_data_bounds(Some(Bounds::new(0, 0, 200, 200)));
    assert_abs_diff_eq!(model.source_size().width, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.source_size().height, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.view_offset().x, 0.0, epsilon = 1e-9);
}

#[test]
fn test_shrinking_bounds_never_zooms_in() {
    let (model, _) = make_model(FakeSource::bounded(100, 100));
    model.resize(100, 100);
    model.zoom(0.4, None);
    assert_abs_diff_eq!(model.view_offset().x, 30.0, epsilon = 1e-9);

    model.update_data_bounds(Some(Bounds::new(0, 0, 80, 80)));
    assert_abs_diff_eq!(model.source_size().width, 40.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.view_offset().x, 30.0, epsilon = 1e-9);
    assert_eq!(model.bounds(), Some(Bounds::new(0, 0, 80, 80)));
}

#[test]
fn test_bounds_smaller_than_view_keep_magnification() {
    let (model, _) = make_model(FakeSource::bounded(100, 100));
    model.resize(100, 100);
    assert_abs_diff_eq!(model.magnification(), 1.0, epsilon = 1e-12);

    model.update_data_bounds(Some(Bounds::new(0, 0, 50, 50)));
    assert_eq!(model.bounds(), Some(Bounds::new(0, 0, 50, 50)));
    assert_abs_diff_eq!(model.source_size().width, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.source_size().height, 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.magnification(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(model.view_offset().x, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.view_offset().y, 0.0, epsilon = 1e-9);

    // Panning keeps the oversized view at the min corner.
    model.pan(30.0, 30.0);
    assert_abs_diff_eq!(model.view_offset().x, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.view_offset().y, 0.0, epsilon = 1e-9);
}

#[test]
fn test_refresh_bounds_reads_source() {
    let source = Arc::new(FakeSource::unbounded());
    let model = ViewportModel::new(
        source.clone(),
        Arc::new(RecordingNotifier::default()),
        DisplaySettings::new().into_shared(),
        ViewerConfig::default(),
    );
    assert!(model.bounds().is_none());
    assert_abs_diff_eq!(model.source_size().width, 512.0);

    source.set_bounds(Some(Bounds::new(0, 0, 100, 100)));
    model.refresh_bounds();
    assert_eq!(model.bounds(), Some(Bounds::new(0, 0, 100, 100)));
    assert_abs_diff_eq!(model.source_size().width, 512.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.view_offset().x, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(model.view_offset().y, 0.0, epsilon = 1e-9);
}

// ---------------------------------------------------------------------------
// Axis positions
// ---------------------------------------------------------------------------

#[test]
fn test_set_axis_position_resolves_indices_on_string_axes() {
    let (model, _) = model_with_channels(&["DAPI", "GFP"]);

    model.set_axis_position("channel", AxisPosition::Integer(0)).unwrap();
    assert_eq!(model.current_channel().as_deref(), Some("DAPI"));
    assert_eq!(model.axis_index("channel").unwrap(), Some(0));

    model
        .set_axis_position("channel", AxisPosition::from("GFP"))
        .unwrap();
    assert_eq!(model.axis_index("channel").unwrap(), Some(1));

    model.set_axis_position("time", AxisPosition::Integer(4)).unwrap();
    assert_eq!(model.axis_position("time"), Some(AxisPosition::Integer(4)));
    assert_eq!(model.axis_index("z").unwrap(), None);
}

#[test]
fn test_set_axis_position_rejects_unknown_values() {
    let (model, _) = model_with_channels(&["DAPI"]);
    assert!(matches!(
        model.set_axis_position("channel", AxisPosition::from("Cy5")),
        Err(ViewerError::UnknownAxisLabel { .. })
    ));
    assert!(matches!(
        model.set_axis_position("channel", AxisPosition::Integer(3)),
        Err(ViewerError::IndexOutOfRange { index: 3, len: 1, .. })
    ));
    assert_eq!(model.current_channel().as_deref(), Some("DAPI"));
}

#[test]
fn test_position_lookups_delegate_to_registry() {
    let (model, _) = model_with_channels(&["DAPI", "GFP"]);
    assert_eq!(model.integer_position_of("channel", "GFP").unwrap(), 1);
    assert_eq!(model.string_position_of("channel", 0).unwrap(), "DAPI");
    assert!(model.is_integer_axis("time"));
    assert!(!model.is_integer_axis("channel"));
}

#[test]
fn test_scrollbars_moved_resyncs_active_channel() {
    let (model, notifier) = model_with_channels(&["DAPI", "GFP"]);
    let mut positions = AxisPositions::new();
    positions.insert("channel".into(), AxisPosition::Integer(0));
    positions.insert("time".into(), AxisPosition::Integer(2));

    model.scrollbars_moved(&positions).unwrap();
    assert_eq!(active_channels(&model), vec!["DAPI"]);
    assert_eq!(model.axis_position("time"), Some(AxisPosition::Integer(2)));

    let events = notifier.events();
    let tail = &events[events.len() - 2..];
    assert_eq!(tail[0], UiEvent::SettingsRefresh);
    assert!(matches!(tail[1], UiEvent::Checkboxes(_)));
}

#[test]
fn test_scrollbars_moved_in_composite_keeps_activation() {
    let (model, _) = model_with_channels(&["DAPI", "GFP"]);
    model.set_composite_mode(true);
    model.set_active_by_user_selection("DAPI", false).unwrap();

    let mut positions = AxisPositions::new();
    positions.insert("channel".into(), AxisPosition::Integer(0));
    model.scrollbars_moved(&positions).unwrap();
    assert_eq!(active_channels(&model), vec!["GFP"]);
}

// ---------------------------------------------------------------------------
// Channel arrival
// ---------------------------------------------------------------------------

#[test]
fn test_channels_arrive_in_order() {
    let (model, _) = make_model(FakeSource::bounded(100, 100));

    model.on_image_arrived(channel_image("DAPI", 0), 16).unwrap();
    assert_eq!(active_channels(&model), vec!["DAPI"]);
    assert_eq!(model.current_channel().as_deref(), Some("DAPI"));

    model.on_image_arrived(channel_image("GFP", 0), 16).unwrap();
    assert_eq!(active_channels(&model), vec!["GFP"]);
    assert!(!model.is_channel_active("DAPI"));
    assert_eq!(model.current_channel().as_deref(), Some("GFP"));
    assert_eq!(
        model.displayed_channels(),
        vec![
            ChannelKey::Named("DAPI".into()),
            ChannelKey::Named("GFP".into())
        ]
    );
}

#[test]
fn test_arrival_replaces_placeholder_settings() {
    let (model, _) = model_with_channels(&["DAPI", "GFP"]);
    let settings = model.display_settings();
    assert!(settings.placeholder.is_none());
    assert_eq!(settings.channels.len(), 2);
    assert_eq!(settings.channel("DAPI").unwrap().color, CHANNEL_PALETTE[0]);
    assert_eq!(settings.channel("GFP").unwrap().color, CHANNEL_PALETTE[1]);
}

#[test]
fn test_channel_named_like_placeholder_keeps_settings() {
    let (model, _) = make_model(FakeSource::bounded(100, 100));
    model.on_image_arrived(channel_image(NO_CHANNEL_NAME, 0), 8).unwrap();
    model.on_image_arrived(channel_image("DAPI", 0), 16).unwrap();

    let settings = model.display_settings();
    assert!(settings.placeholder.is_none());
    let named = settings.channel(NO_CHANNEL_NAME).unwrap();
    assert_eq!(named.bit_depth, 8);
    assert_eq!(named.color, CHANNEL_PALETTE[0]);
    assert_eq!(settings.channel("DAPI").unwrap().color, CHANNEL_PALETTE[1]);
    assert_eq!(
        model.displayed_channels(),
        vec![ChannelKey::Named("DAPI".into())]
    );
    assert!(model
        .channel_statuses()
        .iter()
        .all(|s| !s.key.is_sentinel()));
}

#[test]
fn test_arrival_notifies_ui_in_order() {
    let (model, notifier) = make_model(FakeSource::bounded(100, 100));
    model.on_image_arrived(channel_image("DAPI", 0), 16).unwrap();

    let events = notifier.events();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], UiEvent::ReadHistogramControls);
    assert_eq!(events[1], UiEvent::ContrastControls("DAPI".into()));
    match &events[2] {
        UiEvent::Checkboxes(statuses) => {
            assert_eq!(statuses.len(), 1);
            assert!(statuses[0].active);
            assert_eq!(statuses[0].bit_depth, 16);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn test_known_labels_do_not_reregister() {
    let (model, notifier) = model_with_channels(&["DAPI"]);
    let before = notifier.events().len();

    model.on_image_arrived(channel_image("DAPI", 1), 16).unwrap();
    model.on_image_arrived(channel_image("DAPI", 2), 16).unwrap();
    assert_eq!(notifier.events().len(), before);
}

#[test]
fn test_integer_only_positions_register_nothing() {
    let (model, notifier) = make_model(FakeSource::bounded(100, 100));
    let mut positions = AxisPositions::new();
    positions.insert("time".into(), AxisPosition::Integer(0));
    positions.insert("z".into(), AxisPosition::Integer(3));

    model.on_image_arrived(positions, 16).unwrap();
    assert_eq!(model.displayed_channels(), vec![ChannelKey::NoChannel]);
    assert!(notifier.events().is_empty());
}

#[test]
fn test_labels_on_other_axes_are_recorded_only() {
    let (model, notifier) = make_model(FakeSource::bounded(100, 100));
    let mut positions = AxisPositions::new();
    positions.insert("position".into(), AxisPosition::from("well-A1"));

    model.on_image_arrived(positions, 16).unwrap();
    assert_eq!(model.integer_position_of("position", "well-A1").unwrap(), 0);
    assert!(notifier.events().is_empty());
}

#[test]
fn test_arrival_from_source_uses_source_bit_depth() {
    let (model, _) = make_model(FakeSource::unbounded());
    model
        .on_image_arrived_from_source(channel_image("DAPI", 0))
        .unwrap();
    let settings = model.display_settings();
    assert_eq!(settings.channel("DAPI").unwrap().contrast_max, 255);
}

#[test]
fn test_arrival_in_composite_keeps_position() {
    let (model, _) = model_with_channels(&["DAPI"]);
    model.set_composite_mode(true);
    model.on_image_arrived(channel_image("GFP", 0), 16).unwrap();
    assert_eq!(active_channels(&model), vec!["DAPI"]);
    assert_eq!(model.current_channel().as_deref(), Some("DAPI"));
}

// ---------------------------------------------------------------------------
// User selection and composite mode
// ---------------------------------------------------------------------------

#[test]
fn test_composite_round_trip() {
    let (model, _) = model_with_channels(&["DAPI", "GFP"]);
    model.set_composite_mode(true);
    assert_eq!(active_channels(&model), vec!["DAPI", "GFP"]);
    assert!(model.display_settings().is_composite_mode());

    model.set_composite_mode(false);
    assert_eq!(active_channels(&model), vec!["GFP"]);
    assert!(!model.display_settings().is_composite_mode());
}

#[test]
fn test_selection_moves_channel_position() {
    let (model, notifier) = model_with_channels(&["DAPI", "GFP"]);
    let before = notifier.events().len();

    let outcome = model.set_active_by_user_selection("DAPI", true).unwrap();
    assert_eq!(outcome, SelectionOutcome::Selected);
    assert_eq!(model.current_channel().as_deref(), Some("DAPI"));
    assert_eq!(active_channels(&model), vec!["DAPI"]);
    assert_eq!(notifier.events().len(), before + 1);
}

#[test]
fn test_rejected_deselect_refreshes_checkboxes() {
    let (model, notifier) = model_with_channels(&["DAPI", "GFP"]);
    let outcome = model.set_active_by_user_selection("GFP", false).unwrap();
    assert_eq!(outcome, SelectionOutcome::Rejected);
    assert_eq!(active_channels(&model), vec!["GFP"]);
    assert!(matches!(notifier.events().last(), Some(UiEvent::Checkboxes(_))));
}

#[test]
fn test_toggle_in_composite_sends_no_refresh() {
    let (model, notifier) = model_with_channels(&["DAPI", "GFP"]);
    model.set_composite_mode(true);
    let before = notifier.events().len();

    let outcome = model.set_active_by_user_selection("GFP", false).unwrap();
    assert_eq!(outcome, SelectionOutcome::Toggled);
    assert_eq!(notifier.events().len(), before);
    assert_eq!(model.current_channel().as_deref(), Some("GFP"));
}

#[test]
fn test_selecting_unknown_channel_fails() {
    let (model, _) = model_with_channels(&["DAPI"]);
    assert!(matches!(
        model.set_active_by_user_selection("Cy5", true),
        Err(ViewerError::UnknownChannel(_))
    ));
}

// ---------------------------------------------------------------------------
// Display settings
// ---------------------------------------------------------------------------

#[test]
fn test_swapping_settings_applies_composite_flag() {
    let (model, notifier) = model_with_channels(&["DAPI", "GFP"]);
    let mut loaded = model.display_settings();
    loaded.histogram.composite = true;

    model.set_display_settings(loaded.into_shared());
    assert!(model.is_composite_mode());
    assert_eq!(active_channels(&model), vec!["DAPI", "GFP"]);
    assert_eq!(notifier.events().last(), Some(&UiEvent::SettingsRefresh));
}

#[test]
fn test_histogram_settings_toggle_composite() {
    let (model, _) = model_with_channels(&["DAPI", "GFP"]);
    let histogram = HistogramSettings {
        composite: true,
        log_histogram: true,
        ..HistogramSettings::default()
    };
    model.set_histogram_settings(histogram);
    assert!(model.is_composite_mode());
    assert_eq!(model.display_settings().histogram, histogram);
}

#[test]
fn test_set_channel_color_edits_shared_settings() {
    let (model, _) = model_with_channels(&["DAPI"]);
    let handle = model.settings_handle();
    model.set_channel_color("DAPI", Rgb::new(0, 0, 255));
    assert_eq!(
        handle.read().unwrap().channel("DAPI").unwrap().color,
        Rgb::new(0, 0, 255)
    );
}
