//! The host attribute mirror.
//!
//! Attributes are the string side of the property surface. Reflecting a
//! property onto its attribute arms a suppression counter; the resulting
//! attribute-changed notification consumes one count instead of feeding the
//! value back into validation.

use crate::props::{PropKey, PropValue, RawValue};

/// A change to a host attribute, as reported by
/// [`CircleProgress::attribute_changed`](crate::CircleProgress::attribute_changed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeChange {
    pub name: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// Names of the attributes that map to properties.
pub fn observed_attributes() -> impl Iterator<Item = &'static str> {
    PropKey::ALL.into_iter().map(PropKey::attribute_name)
}

/// The raw property input for an attribute value.
///
/// Boolean properties follow presence: any value, even `"false"`, is on.
pub fn attribute_to_raw(key: PropKey, value: Option<&str>) -> RawValue {
    match (key.is_boolean(), value) {
        (true, value) => RawValue::Bool(value.is_some()),
        (false, Some(text)) => RawValue::Text(text.to_string()),
        (false, None) => RawValue::Absent,
    }
}

/// String attributes of the host element, in insertion order.
#[derive(Debug, Default)]
pub(crate) struct HostAttributes {
    entries: Vec<(String, String)>,
    /// Pending self-induced notifications to swallow.
    suppress: usize,
}

impl HostAttributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, returning the change.
    pub fn set(&mut self, name: &str, value: String) -> AttributeChange {
        let old_value = match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, current)) => Some(std::mem::replace(current, value.clone())),
            None => {
                self.entries.push((name.to_string(), value.clone()));
                None
            }
        };
        AttributeChange {
            name: name.to_string(),
            old_value,
            new_value: Some(value),
        }
    }

    /// Remove an attribute. Returns `None` if it was not present.
    pub fn remove(&mut self, name: &str) -> Option<AttributeChange> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        let (name, old) = self.entries.remove(index);
        Some(AttributeChange {
            name,
            old_value: Some(old),
            new_value: None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Expect one self-induced notification.
    pub fn arm(&mut self) {
        self.suppress += 1;
    }

    /// Swallow a notification if one is expected.
    pub fn consume(&mut self) -> bool {
        if self.suppress > 0 {
            self.suppress -= 1;
            true
        } else {
            false
        }
    }

    pub fn is_armed(&self) -> bool {
        self.suppress > 0
    }

    /// Mirror a property value onto its attribute.
    ///
    /// Returns the change if the attribute was touched. A change is always
    /// paired with one armed count, which the caller's notification consumes.
    pub fn reflect(&mut self, key: PropKey, value: &PropValue) -> Option<AttributeChange> {
        let name = key.attribute_name();
        let change = match value.to_attribute() {
            Some(text) => Some(self.set(name, text)),
            None => self.remove(name),
        };
        if change.is_some() {
            self.arm();
        }
        change
    }
}
