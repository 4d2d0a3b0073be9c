use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::channels::ChannelKey;
use crate::consts::{CHANNEL_PALETTE, DEFAULT_IGNORE_OUTLIERS_PERCENTAGE};
use crate::error::Result;

/// Display settings owned by the host application and shared with the
/// viewport model, which edits fields in place. The host may swap the whole
/// structure, e.g. after loading it from disk.
pub type SharedSettings = Arc<RwLock<DisplaySettings>>;

/// 8-bit RGB display color of a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Per-channel color and contrast limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelDisplaySettings {
    pub color: Rgb,
    pub bit_depth: u32,
    pub contrast_min: u32,
    pub contrast_max: u32,
    #[serde(default = "default_gamma")]
    pub gamma: f64,
}

fn default_gamma() -> f64 {
    1.0
}

impl ChannelDisplaySettings {
    /// Full-range contrast for `bit_depth`.
    pub fn for_bit_depth(color: Rgb, bit_depth: u32) -> Self {
        let contrast_max = if bit_depth >= 32 {
            u32::MAX
        } else {
            (1u32 << bit_depth).saturating_sub(1)
        };
        Self {
            color,
            bit_depth,
            contrast_min: 0,
            contrast_max,
            gamma: default_gamma(),
        }
    }
}

/// Histogram and compositing switches shown next to the contrast controls.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistogramSettings {
    pub autoscale: bool,
    pub ignore_outliers: bool,
    pub sync_channels: bool,
    pub log_histogram: bool,
    pub composite: bool,
    /// Percentage of pixels ignored at each end when autoscaling.
    pub ignore_outliers_percentage: f64,
}

impl Default for HistogramSettings {
    fn default() -> Self {
        Self {
            autoscale: true,
            ignore_outliers: false,
            sync_channels: false,
            log_histogram: false,
            composite: false,
            ignore_outliers_percentage: DEFAULT_IGNORE_OUTLIERS_PERCENTAGE,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default)]
    pub histogram: HistogramSettings,
    /// Keyed by channel name. Only real channels live here.
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelDisplaySettings>,
    /// Settings shown while no channel has arrived yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<ChannelDisplaySettings>,
}

impl DisplaySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedSettings {
        Arc::new(RwLock::new(self))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn is_composite_mode(&self) -> bool {
        self.histogram.composite
    }

    pub fn set_composite_mode(&mut self, composite: bool) {
        self.histogram.composite = composite;
    }

    pub fn contains_channel(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelDisplaySettings> {
        self.channels.get(name)
    }

    /// Settings for a channel-set key, the placeholder included.
    pub fn settings_for(&self, key: &ChannelKey) -> Option<&ChannelDisplaySettings> {
        match key {
            ChannelKey::NoChannel => self.placeholder.as_ref(),
            ChannelKey::Named(name) => self.channels.get(name),
        }
    }

    /// Full-range placeholder settings, colored like the first channel.
    pub fn set_placeholder(&mut self, bit_depth: u32) {
        self.placeholder = Some(ChannelDisplaySettings::for_bit_depth(
            CHANNEL_PALETTE[0],
            bit_depth,
        ));
    }

    pub fn clear_placeholder(&mut self) -> Option<ChannelDisplaySettings> {
        self.placeholder.take()
    }

    /// Add full-range settings for a channel, colored from the palette by the
    /// number of channels already present. Existing entries are kept.
    pub fn add_channel(&mut self, name: &str, bit_depth: u32) {
        if self.channels.contains_key(name) {
            return;
        }
        let color = CHANNEL_PALETTE[self.channels.len() % CHANNEL_PALETTE.len()];
        self.channels.insert(
            name.to_owned(),
            ChannelDisplaySettings::for_bit_depth(color, bit_depth),
        );
    }

    pub fn remove_channel(&mut self, name: &str) -> Option<ChannelDisplaySettings> {
        self.channels.remove(name)
    }

    /// Set a channel's color, creating 8-bit defaults if it has no entry yet.
    pub fn set_color(&mut self, name: &str, color: Rgb) {
        self.channels
            .entry(name.to_owned())
            .or_insert_with(|| ChannelDisplaySettings::for_bit_depth(color, 8))
            .color = color;
    }
}
