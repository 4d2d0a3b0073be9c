use std::fmt;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use ndview_core::axis::{AxisPosition, AxisPositions};
use ndview_core::geometry::{Bounds, DisplaySize, Point2D};
use ndview_core::settings::{DisplaySettings, Rgb};
use ndview_core::source::DataSource;
use ndview_core::ViewerConfig;
use serde::{Deserialize, Serialize};

fn default_bit_depth() -> u32 {
    16
}

/// A scripted viewing session: the dataset's shape, the initial canvas and
/// the sequence of steps to replay against the model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// Bit depth reported for arrivals that don't state one.
    #[serde(default = "default_bit_depth")]
    pub bit_depth: u32,
    #[serde(default)]
    pub max_resolution_index: u32,
    #[serde(default)]
    pub viewer: ViewerConfig,
    /// Initial data extent; omitted for unbounded data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    pub display: DisplaySize,
    #[serde(default)]
    pub settings: DisplaySettings,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// One scripted event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Resize {
        width: u32,
        height: u32,
    },
    Pan {
        dx: f64,
        dy: f64,
    },
    Zoom {
        factor: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        anchor: Option<Point2D>,
    },
    Offset {
        x: f64,
        y: f64,
    },
    /// New data extent reported by the source; omitted `bounds` means unbounded.
    Bounds {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bounds: Option<Bounds>,
    },
    /// An image arrives on the producer thread.
    Arrive {
        positions: AxisPositions,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bit_depth: Option<u32>,
    },
    Select {
        channel: String,
        #[serde(default = "default_selected")]
        selected: bool,
    },
    Composite {
        enabled: bool,
    },
    Scroll {
        positions: AxisPositions,
    },
    Color {
        channel: String,
        color: Rgb,
    },
}

fn default_selected() -> bool {
    true
}

impl Step {
    pub fn is_arrival(&self) -> bool {
        matches!(self, Self::Arrive { .. })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resize { width, height } => write!(f, "resize {width}x{height}"),
            Self::Pan { dx, dy } => write!(f, "pan {dx:+} {dy:+}"),
            Self::Zoom { factor, anchor: None } => write!(f, "zoom x{factor}"),
            Self::Zoom {
                factor,
                anchor: Some(a),
            } => write!(f, "zoom x{factor} at ({}, {})", a.x, a.y),
            Self::Offset { x, y } => write!(f, "offset ({x}, {y})"),
            Self::Bounds { bounds: None } => write!(f, "bounds unbounded"),
            Self::Bounds { bounds: Some(b) } => write!(
                f,
                "bounds [{}, {}) x [{}, {})",
                b.x_min, b.x_max, b.y_min, b.y_max
            ),
            Self::Arrive { positions, .. } => write!(f, "arrive {}", format_positions(positions)),
            Self::Select { channel, selected } => {
                let verb = if *selected { "select" } else { "deselect" };
                write!(f, "{verb} {channel}")
            }
            Self::Composite { enabled } => {
                write!(f, "composite {}", if *enabled { "on" } else { "off" })
            }
            Self::Scroll { positions } => write!(f, "scroll {}", format_positions(positions)),
            Self::Color { channel, color } => {
                write!(f, "color {channel} #{:02x}{:02x}{:02x}", color.r, color.g, color.b)
            }
        }
    }
}

pub fn format_positions(positions: &AxisPositions) -> String {
    positions
        .iter()
        .map(|(axis, value)| format!("{axis}={value}"))
        .collect::<Vec<_>>()
        .join(" ")
}

impl Session {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid session {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// A two-channel time series acquired on a 1024x1024 sensor.
    pub fn example() -> Self {
        let arrive = |channel: &str, t: i64| {
            let mut positions = AxisPositions::new();
            positions.insert("channel".to_owned(), AxisPosition::from(channel));
            positions.insert("time".to_owned(), AxisPosition::Integer(t));
            Step::Arrive {
                positions,
                bit_depth: None,
            }
        };
        let mut scroll_to = AxisPositions::new();
        scroll_to.insert("channel".to_owned(), AxisPosition::Integer(0));
        scroll_to.insert("time".to_owned(), AxisPosition::Integer(1));

        Self {
            bit_depth: default_bit_depth(),
            max_resolution_index: 3,
            viewer: ViewerConfig::default(),
            bounds: Some(Bounds::new(0, 0, 1024, 1024)),
            display: DisplaySize::new(800, 600),
            settings: DisplaySettings::default(),
            steps: vec![
                arrive("DAPI", 0),
                arrive("GFP", 0),
                Step::Zoom {
                    factor: 0.5,
                    anchor: Some(Point2D::new(400.0, 300.0)),
                },
                Step::Pan { dx: -40.0, dy: 25.0 },
                arrive("DAPI", 1),
                arrive("GFP", 1),
                Step::Scroll {
                    positions: scroll_to,
                },
                Step::Composite { enabled: true },
                Step::Select {
                    channel: "GFP".to_owned(),
                    selected: false,
                },
                Step::Color {
                    channel: "DAPI".to_owned(),
                    color: Rgb::new(0, 0, 255),
                },
                Step::Bounds {
                    bounds: Some(Bounds::new(0, 0, 2048, 1024)),
                },
            ],
        }
    }
}

/// Data source standing in for the acquisition: fixed bit depth and pyramid
/// depth, with bounds that `bounds` steps move.
#[derive(Debug)]
pub struct ScriptedSource {
    bounds: Mutex<Option<Bounds>>,
    bit_depth: u32,
    max_resolution_index: u32,
}

impl ScriptedSource {
    pub fn new(session: &Session) -> Self {
        Self {
            bounds: Mutex::new(session.bounds),
            bit_depth: session.bit_depth,
            max_resolution_index: session.max_resolution_index,
        }
    }

    pub fn set_bounds(&self, bounds: Option<Bounds>) {
        *self.bounds.lock().unwrap_or_else(PoisonError::into_inner) = bounds;
    }
}

impl DataSource for ScriptedSource {
    fn bounds(&self) -> Option<Bounds> {
        *self.bounds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn image_bit_depth(&self, _positions: &AxisPositions) -> u32 {
        self.bit_depth
    }

    fn max_resolution_index(&self) -> u32 {
        self.max_resolution_index
    }
}
