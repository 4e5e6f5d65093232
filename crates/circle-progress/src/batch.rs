//! Pending writes awaiting a flush.

use crate::props::{PropKey, PropValue, State};

/// Where a queued write came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A property setter or the bulk accessor; reflected to the attribute.
    Property,
    /// A host attribute change; not echoed back.
    Attribute,
    /// Construction options; not reflected.
    Construction,
}

impl Origin {
    pub fn reflects(self) -> bool {
        self == Origin::Property
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Entry {
    pub key: PropKey,
    pub value: PropValue,
    pub origin: Origin,
}

/// Validated writes in queue order. A key queued twice keeps its first
/// position and takes the later value.
#[derive(Debug, Default)]
pub(crate) struct PendingBatch {
    entries: Vec<Entry>,
}

impl PendingBatch {
    pub fn queue(&mut self, key: PropKey, value: PropValue, origin: Origin) {
        match self.entries.iter_mut().find(|entry| entry.key == key) {
            Some(entry) => {
                entry.value = value;
                entry.origin = origin;
            }
            None => self.entries.push(Entry { key, value, origin }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, key: PropKey) -> Option<&PropValue> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    fn number(&self, key: PropKey) -> Option<f64> {
        self.get(key).and_then(PropValue::as_number)
    }

    fn replace_number(&mut self, key: PropKey, n: f64) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.key == key) {
            entry.value = PropValue::Number(n);
        }
    }

    /// Apply the bound rules against `state`:
    ///
    /// - `min` above `max` is pulled down to `max`. When both are queued
    ///   `max` wins; when only one is queued the committed other bound wins.
    /// - A queued `value` is clamped into the resulting bounds unless the
    ///   widget is (or is about to be) unconstrained.
    pub fn resolve_constraints(&mut self, state: &State) {
        let committed_min = state.min.get();
        let committed_max = state.max.get();

        match (self.number(PropKey::Min), self.number(PropKey::Max)) {
            (Some(min), Some(max)) if min > max => self.replace_number(PropKey::Min, max),
            (Some(min), None) if min > committed_max => {
                self.replace_number(PropKey::Min, committed_max)
            }
            (None, Some(max)) if max < committed_min => {
                self.replace_number(PropKey::Max, committed_min)
            }
            _ => {}
        }

        let unconstrained = self
            .get(PropKey::Unconstrained)
            .and_then(PropValue::as_bool)
            .unwrap_or_else(|| state.unconstrained.get());
        if unconstrained {
            return;
        }
        if let Some(value) = self.number(PropKey::Value) {
            let min = self.number(PropKey::Min).unwrap_or(committed_min);
            let max = self.number(PropKey::Max).unwrap_or(committed_max);
            let clamped = value.max(min).min(max);
            if clamped != value {
                self.replace_number(PropKey::Value, clamped);
            }
        }
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}
