use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("Unknown label {label:?} on axis {axis:?}")]
    UnknownAxisLabel { axis: String, label: String },

    #[error("Index {index} out of range on axis {axis:?} (known labels: {len})")]
    IndexOutOfRange { axis: String, index: i64, len: usize },

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    #[error("UI thread is no longer accepting tasks")]
    UiThreadUnavailable,

    #[error("UI task panicked: {0}")]
    UiTaskPanicked(String),

    #[error("Invalid display settings: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("Failed to encode display settings: {0}")]
    SettingsEncode(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
