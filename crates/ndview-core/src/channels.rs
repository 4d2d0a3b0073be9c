//! Channel visibility: which channels are drawn, and how that changes as
//! channels arrive and the user toggles them.
//!
//! In [`ActivationMode::SingleActive`] exactly one channel is active whenever
//! any channel is known; selecting another channel moves the activation to it
//! and deselecting the active one is refused. In
//! [`ActivationMode::CompositeAll`] every channel is toggled independently.

use std::fmt;

use tracing::{debug, info};

use crate::consts::NO_CHANNEL_NAME;
use crate::error::{Result, ViewerError};

/// Identity of a channel entry.
///
/// `NoChannel` stands in for datasets without a channel axis. It is present
/// from construction until the first real channel arrives and is never
/// added back afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ChannelKey {
    NoChannel,
    Named(String),
}

impl ChannelKey {
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::NoChannel)
    }

    /// Name shown to the user.
    pub fn display_name(&self) -> &str {
        match self {
            Self::NoChannel => NO_CHANNEL_NAME,
            Self::Named(name) => name,
        }
    }

    fn is_named(&self, name: &str) -> bool {
        matches!(self, Self::Named(n) if n == name)
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Activation state of one channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelRecord {
    pub active: bool,
    /// Bit depth of the channel's pixels; `0` for the sentinel.
    pub bit_depth: u32,
}

/// Snapshot of one channel handed to UI callbacks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelStatus {
    pub key: ChannelKey,
    pub active: bool,
    pub bit_depth: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActivationMode {
    #[default]
    SingleActive,
    CompositeAll,
}

impl fmt::Display for ActivationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleActive => write!(f, "Single channel"),
            Self::CompositeAll => write!(f, "Composite"),
        }
    }
}

/// What a user selection did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Composite mode: the channel's flag was set as requested.
    Toggled,
    /// Single mode: the channel became the only active one. The caller should
    /// move the channel-axis position to it.
    Selected,
    /// Single mode: deselection refused, nothing changed.
    Rejected,
}

/// Known channels in arrival order together with the activation policy.
#[derive(Clone, Debug)]
pub struct ChannelSet {
    entries: Vec<(ChannelKey, ChannelRecord)>,
    mode: ActivationMode,
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelSet {
    /// A set holding only the active sentinel, in single-active mode.
    pub fn new() -> Self {
        Self {
            entries: vec![(
                ChannelKey::NoChannel,
                ChannelRecord {
                    active: true,
                    bit_depth: 0,
                },
            )],
            mode: ActivationMode::SingleActive,
        }
    }

    pub fn mode(&self) -> ActivationMode {
        self.mode
    }

    pub fn is_composite(&self) -> bool {
        self.mode == ActivationMode::CompositeAll
    }

    /// Switch policy. Entering composite activates everything; leaving it
    /// keeps only `current_channel` active, or leaves activation untouched
    /// when the current channel is unknown.
    pub fn set_composite_mode(&mut self, composite: bool, current_channel: Option<&str>) {
        if composite {
            self.mode = ActivationMode::CompositeAll;
            for (_, record) in &mut self.entries {
                record.active = true;
            }
            return;
        }

        self.mode = ActivationMode::SingleActive;
        match current_channel {
            Some(name) if self.contains(name) => self.activate_only(name),
            _ => debug!(
                ?current_channel,
                "Left composite mode without a known current channel"
            ),
        }
    }

    /// Apply a click on a channel's visibility checkbox.
    pub fn set_active_by_user_selection(
        &mut self,
        name: &str,
        selected: bool,
    ) -> Result<SelectionOutcome> {
        if !self.contains(name) {
            return Err(ViewerError::UnknownChannel(name.to_owned()));
        }

        match self.mode {
            ActivationMode::CompositeAll => {
                if let Some(record) = self.record_mut(name) {
                    record.active = selected;
                }
                Ok(SelectionOutcome::Toggled)
            }
            ActivationMode::SingleActive if selected => {
                self.activate_only(name);
                Ok(SelectionOutcome::Selected)
            }
            ActivationMode::SingleActive => {
                debug!(channel = name, "Refusing to deactivate channel in single mode");
                Ok(SelectionOutcome::Rejected)
            }
        }
    }

    /// Record a channel seen in newly arrived data. Returns `true` if it was
    /// not known before.
    ///
    /// The first real channel replaces the sentinel. Outside composite mode
    /// the arriving channel becomes the only active one.
    pub fn channel_arrived(&mut self, name: &str, bit_depth: u32) -> bool {
        let is_new = !self.contains(name);
        if is_new {
            self.entries.push((
                ChannelKey::Named(name.to_owned()),
                ChannelRecord {
                    active: false,
                    bit_depth,
                },
            ));
        }
        if self.has_sentinel() {
            self.entries.retain(|(key, _)| !key.is_sentinel());
            info!(channel = name, "First channel arrived, dropping placeholder channel");
        }
        if !self.is_composite() {
            self.activate_only(name);
        }
        is_new
    }

    /// Follow a position control that moved to `current_channel`. Only acts in
    /// single mode and only for known channels; returns whether it applied.
    pub fn scroll_position_changed(&mut self, current_channel: &str) -> bool {
        if self.is_composite() || !self.contains(current_channel) {
            return false;
        }
        self.activate_only(current_channel);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key.is_named(name))
    }

    pub fn has_sentinel(&self) -> bool {
        self.entries.iter().any(|(key, _)| key.is_sentinel())
    }

    /// Whether the named channel is active; unknown channels are inactive.
    pub fn is_active(&self, name: &str) -> bool {
        self.record(name).is_some_and(|r| r.active)
    }

    pub fn record(&self, name: &str) -> Option<ChannelRecord> {
        self.entries
            .iter()
            .find(|(key, _)| key.is_named(name))
            .map(|(_, record)| *record)
    }

    /// Keys of all entries (the sentinel included) in arrival order.
    pub fn keys(&self) -> Vec<ChannelKey> {
        self.entries.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Names of the real channels, in arrival order.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|(key, _)| match key {
                ChannelKey::Named(name) => Some(name.clone()),
                ChannelKey::NoChannel => None,
            })
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.entries.iter().filter(|(_, r)| r.active).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn statuses(&self) -> Vec<ChannelStatus> {
        self.entries
            .iter()
            .map(|(key, record)| ChannelStatus {
                key: key.clone(),
                active: record.active,
                bit_depth: record.bit_depth,
            })
            .collect()
    }

    fn record_mut(&mut self, name: &str) -> Option<&mut ChannelRecord> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key.is_named(name))
            .map(|(_, record)| record)
    }

    fn activate_only(&mut self, name: &str) {
        for (key, record) in &mut self.entries {
            record.active = key.is_named(name);
        }
    }
}
