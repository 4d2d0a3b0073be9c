use std::path::Path;

use console::Style;
use ndview_core::channels::{ActivationMode, ChannelStatus};
use ndview_core::settings::DisplaySettings;
use ndview_core::ViewportModel;

use crate::session::{format_positions, Session, Step};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    active: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            active: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_session_header(path: &Path, session: &Session) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("ndview Replay"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(13)));
    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Session"),
        s.path.apply_to(path.display())
    );
    match session.bounds {
        Some(b) => println!(
            "  {:<14}{}",
            s.label.apply_to("Bounds"),
            s.value.apply_to(format!("{}x{}", b.x_max - b.x_min, b.y_max - b.y_min))
        ),
        None => println!(
            "  {:<14}{}",
            s.label.apply_to("Bounds"),
            s.disabled.apply_to("unbounded")
        ),
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Canvas"),
        s.value.apply_to(format!(
            "{}x{}",
            session.display.width, session.display.height
        ))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Steps"),
        s.value.apply_to(session.steps.len())
    );
    println!();
}

pub fn print_step(number: usize, step: &Step, model: &ViewportModel) {
    let s = Styles::new();
    let offset = model.view_offset();
    let size = model.source_size();
    println!(
        "  {:>3}. {:<32}{}",
        s.label.apply_to(number),
        s.value.apply_to(step),
        s.label.apply_to(format!(
            "({:.1}, {:.1}) {:.1}x{:.1} @ {:.3}",
            offset.x,
            offset.y,
            size.width,
            size.height,
            model.magnification()
        ))
    );
}

pub fn print_view_summary(model: &ViewportModel) {
    let s = Styles::new();
    let coords = model.copy_view_coords();
    let offset = coords.view_offset();
    let size = coords.source_size();
    let display = coords.display_size();

    println!();
    println!("  {}", s.header.apply_to("Viewport"));
    println!(
        "    {:<14}{}",
        s.label.apply_to("Offset"),
        s.value.apply_to(format!("({:.2}, {:.2})", offset.x, offset.y))
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Source size"),
        s.value.apply_to(format!("{:.2} x {:.2}", size.width, size.height))
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Canvas"),
        s.value.apply_to(format!("{} x {}", display.width, display.height))
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Magnification"),
        s.value.apply_to(format!("{:.4}", coords.magnification()))
    );
    println!(
        "    {:<14}{}",
        s.label.apply_to("Level"),
        s.value.apply_to(format!(
            "{} (1/{})",
            coords.resolution_index(),
            coords.downsample_factor()
        ))
    );
    match coords.bounds() {
        Some(b) => println!(
            "    {:<14}{}",
            s.label.apply_to("Bounds"),
            s.value.apply_to(format!(
                "[{}, {}) x [{}, {})",
                b.x_min, b.x_max, b.y_min, b.y_max
            ))
        ),
        None => println!(
            "    {:<14}{}",
            s.label.apply_to("Bounds"),
            s.disabled.apply_to("unbounded")
        ),
    }
    println!();

    println!("  {}", s.header.apply_to("Axes"));
    if coords.axes_positions().is_empty() {
        println!("    {}", s.disabled.apply_to("none"));
    } else {
        println!("    {}", s.value.apply_to(format_positions(coords.axes_positions())));
    }
    println!();

    let mode = if model.is_composite_mode() {
        ActivationMode::CompositeAll
    } else {
        ActivationMode::SingleActive
    };
    println!(
        "  {:<14}{}",
        s.header.apply_to("Channels"),
        s.label.apply_to(mode)
    );
    let settings = model.display_settings();
    for status in model.channel_statuses() {
        print_channel(&s, &status, &settings);
    }
    println!();
}

fn print_channel(s: &Styles, status: &ChannelStatus, settings: &DisplaySettings) {
    let name = status.key.display_name();
    let marker = if status.active {
        s.active.apply_to("\u{25cf} on ")
    } else {
        s.disabled.apply_to("\u{25cb} off")
    };
    let detail = match settings.settings_for(&status.key) {
        Some(c) => format!(
            "#{:02x}{:02x}{:02x}  {}-bit  contrast {}..{}",
            c.color.r, c.color.g, c.color.b, c.bit_depth, c.contrast_min, c.contrast_max
        ),
        None => format!("{}-bit", status.bit_depth),
    };
    println!(
        "    {} {:<12}{}",
        marker,
        s.value.apply_to(name),
        s.label.apply_to(detail)
    );
}
