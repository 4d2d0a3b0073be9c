use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use ndview_core::dispatch::{ui_channel, UiQueue};
use ndview_core::{NoOpNotifier, ViewportModel};
use tracing::{debug, info};

use crate::session::{ScriptedSource, Session, Step};
use crate::summary::{print_session_header, print_step, print_view_summary};

/// How long the UI loop waits for a task before checking the producer again.
const PUMP_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Args)]
pub struct ReplayArgs {
    /// Session file (TOML)
    pub file: PathBuf,

    /// Print the view after every step
    #[arg(long)]
    pub step_summary: bool,
}

pub fn run(args: &ReplayArgs) -> Result<()> {
    let session = Session::load(&args.file)?;
    print_session_header(&args.file, &session);

    // This thread plays the UI thread: it owns the queue and runs every
    // gesture, while arrivals come in from a producer thread.
    let (dispatcher, queue) = ui_channel();
    let source = Arc::new(ScriptedSource::new(&session));
    let model = Arc::new(
        ViewportModel::new(
            source.clone(),
            Arc::new(NoOpNotifier),
            session.settings.clone().into_shared(),
            session.viewer.clone(),
        )
        .with_ui_dispatcher(dispatcher),
    );
    model.resize(session.display.width, session.display.height);

    let mut steps = session.steps.iter().peekable();
    let mut index = 0;
    while let Some(step) = steps.next() {
        if step.is_arrival() {
            let mut batch = vec![step.clone()];
            while let Some(next) = steps.next_if(|s| s.is_arrival()) {
                batch.push(next.clone());
            }
            let count = batch.len();
            deliver_arrivals(&model, &queue, batch)
                .with_context(|| format!("Arrival batch starting at step {} failed", index + 1))?;
            if args.step_summary {
                for (offset, arrived) in session.steps[index..index + count].iter().enumerate() {
                    print_step(index + offset + 1, arrived, &model);
                }
            }
            index += count;
            continue;
        }

        apply_step(&model, &source, step)
            .with_context(|| format!("Step {} ({step}) failed", index + 1))?;
        if args.step_summary {
            print_step(index + 1, step, &model);
        }
        index += 1;
    }

    print_view_summary(&model);
    Ok(())
}

/// Apply a UI-side step directly on this thread.
fn apply_step(model: &ViewportModel, source: &ScriptedSource, step: &Step) -> Result<()> {
    match step {
        Step::Resize { width, height } => model.resize(*width, *height),
        Step::Pan { dx, dy } => model.pan(*dx, *dy),
        Step::Zoom { factor, anchor } => {
            if !model.zoom(*factor, *anchor) {
                info!(factor, "Zoom refused");
            }
        }
        Step::Offset { x, y } => model.set_view_offset(*x, *y),
        Step::Bounds { bounds } => {
            source.set_bounds(*bounds);
            model.refresh_bounds();
        }
        Step::Select { channel, selected } => {
            let outcome = model.set_active_by_user_selection(channel, *selected)?;
            debug!(channel = %channel, ?outcome, "Selection applied");
        }
        Step::Composite { enabled } => model.set_composite_mode(*enabled),
        Step::Scroll { positions } => model.scrollbars_moved(positions)?,
        Step::Color { channel, color } => model.set_channel_color(channel, *color),
        Step::Arrive { .. } => {
            return Err(anyhow!("arrivals are delivered by the producer thread"));
        }
    }
    Ok(())
}

/// Feed `batch` to the model from a producer thread while this thread pumps
/// the UI queue, then surface the first failure.
fn deliver_arrivals(model: &Arc<ViewportModel>, queue: &UiQueue, batch: Vec<Step>) -> Result<()> {
    let producer = {
        let model = Arc::clone(model);
        thread::Builder::new()
            .name("ndview-producer".into())
            .spawn(move || -> ndview_core::Result<()> {
                for step in batch {
                    if let Step::Arrive {
                        positions,
                        bit_depth,
                    } = step
                    {
                        match bit_depth {
                            Some(bd) => model.on_image_arrived(positions, bd)?,
                            None => model.on_image_arrived_from_source(positions)?,
                        }
                    }
                }
                Ok(())
            })
            .context("Failed to start producer thread")?
    };

    while !producer.is_finished() {
        queue.run_next_timeout(PUMP_INTERVAL);
    }
    queue.run_pending();

    producer
        .join()
        .map_err(|_| anyhow!("producer thread panicked"))??;
    Ok(())
}
