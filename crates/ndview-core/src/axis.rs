//! Axis positions and the registry of string-valued axes.
//!
//! Each axis of a dataset (time, z, channel, ...) is positioned either by an
//! integer index or by a string label. Labels are only ever known from the
//! images that have arrived, so the registry learns them incrementally and
//! assigns each label the index of its first sighting.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ViewerError};

/// Position along one axis.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisPosition {
    Integer(i64),
    Label(String),
}

impl AxisPosition {
    pub fn as_label(&self) -> Option<&str> {
        match self {
            Self::Label(s) => Some(s),
            Self::Integer(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Label(_) => None,
        }
    }
}

impl fmt::Display for AxisPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Label(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for AxisPosition {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<&str> for AxisPosition {
    fn from(value: &str) -> Self {
        Self::Label(value.to_owned())
    }
}

impl From<String> for AxisPosition {
    fn from(value: String) -> Self {
        Self::Label(value)
    }
}

/// Axis name to position, as reported for one image or held by the view.
pub type AxisPositions = BTreeMap<String, AxisPosition>;

/// Ordered, append-only label sequences for every string-valued axis.
///
/// Writers replace an axis's sequence with an extended copy; readers clone
/// the current `Arc`, so a reader holds an immutable snapshot that may be one
/// or more labels behind the writer but is never torn.
#[derive(Debug, Default)]
pub struct AxisRegistry {
    axes: RwLock<HashMap<String, Arc<Vec<String>>>>,
}

impl AxisRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a position seen on `axis`. Integer positions are ignored.
    ///
    /// Returns `true` if `value` was a label not seen before on this axis.
    pub fn observe(&self, axis: &str, value: &AxisPosition) -> bool {
        let Some(label) = value.as_label() else {
            return false;
        };
        if self.snapshot(axis).is_some_and(|labels| labels.iter().any(|l| l == label)) {
            return false;
        }

        let mut axes = self.axes.write().unwrap_or_else(PoisonError::into_inner);
        let current = axes.entry(axis.to_owned()).or_default();
        // Re-check under the write lock: another writer may have added it.
        if current.iter().any(|l| l == label) {
            return false;
        }
        let mut extended = Vec::with_capacity(current.len() + 1);
        extended.extend(current.iter().cloned());
        extended.push(label.to_owned());
        *current = Arc::new(extended);
        true
    }

    /// Position of `label` within `axis`, in first-seen order.
    pub fn index_of(&self, axis: &str, label: &str) -> Result<usize> {
        self.snapshot(axis)
            .and_then(|labels| labels.iter().position(|l| l == label))
            .ok_or_else(|| ViewerError::UnknownAxisLabel {
                axis: axis.to_owned(),
                label: label.to_owned(),
            })
    }

    /// Label stored at `index` on `axis`.
    pub fn label_at(&self, axis: &str, index: i64) -> Result<String> {
        let labels = self.snapshot(axis).unwrap_or_default();
        usize::try_from(index)
            .ok()
            .and_then(|i| labels.get(i).cloned())
            .ok_or_else(|| ViewerError::IndexOutOfRange {
                axis: axis.to_owned(),
                index,
                len: labels.len(),
            })
    }

    /// True if no label has ever been observed on `axis`.
    pub fn is_integer_axis(&self, axis: &str) -> bool {
        !self
            .axes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(axis)
    }

    /// Immutable snapshot of the labels of `axis`, or `None` for integer axes.
    pub fn snapshot(&self, axis: &str) -> Option<Arc<Vec<String>>> {
        self.axes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(axis)
            .cloned()
    }

    /// Number of labels currently known on `axis`.
    pub fn len(&self, axis: &str) -> usize {
        self.snapshot(axis).map_or(0, |labels| labels.len())
    }

    /// Names of all string-valued axes, sorted.
    pub fn string_axes(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .axes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}
