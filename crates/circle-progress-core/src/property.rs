//! Change-detecting value cells.
//!
//! A [`Property<T>`] holds a value and reports whether a write actually
//! changed it. Writes of an equal value are no-ops, which is what lets the
//! widget skip attribute reflection and re-rendering for redundant updates.
//!
//! # Example
//!
//! ```
//! use circle_progress_core::Property;
//!
//! let mut max = Property::new(1.0);
//! assert!(!max.set(1.0));
//! assert!(max.set(10.0));
//! assert_eq!(max.get(), 10.0);
//! ```

use std::fmt;

/// A value that tracks its own changes.
///
/// The cell has no interior mutability; share it behind the owner's lock.
#[derive(Clone, Default)]
pub struct Property<T> {
    value: T,
}

impl<T> Property<T> {
    pub const fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Clone> Property<T> {
    /// A copy of the current value.
    pub fn get(&self) -> T {
        self.value.clone()
    }
}

impl<T: PartialEq> Property<T> {
    /// Store `value`, returning `true` if it differs from the current one.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        true
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.value, f)
    }
}
