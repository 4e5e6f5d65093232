//! Easing functions for value animation.
//!
//! Every easing maps `(elapsed, start, delta, duration)` to the animated
//! value, with `f(0) = start` and `f(duration) = start + delta`.
//!
//! The `Quadr` family is quartic (fourth power), which is steeper than the
//! name suggests. The names are part of the public attribute vocabulary and
//! are kept as-is.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The built-in easing catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Easing {
    /// Constant rate.
    Linear,
    /// Cubic, slow start.
    EaseInCubic,
    /// Cubic, slow end.
    EaseOutCubic,
    /// Cubic, slow start and end.
    #[default]
    EaseInOutCubic,
    /// Quartic, slow start.
    EaseInQuadr,
    /// Quartic, slow end.
    EaseOutQuadr,
    /// Quartic, slow start and end.
    EaseInOutQuadr,
}

impl Easing {
    /// Every built-in easing, in catalog order.
    pub const ALL: [Easing; 7] = [
        Easing::Linear,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInQuadr,
        Easing::EaseOutQuadr,
        Easing::EaseInOutQuadr,
    ];

    /// The attribute name of this easing.
    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseInCubic => "easeInCubic",
            Easing::EaseOutCubic => "easeOutCubic",
            Easing::EaseInOutCubic => "easeInOutCubic",
            Easing::EaseInQuadr => "easeInQuadr",
            Easing::EaseOutQuadr => "easeOutQuadr",
            Easing::EaseInOutQuadr => "easeInOutQuadr",
        }
    }

    /// Evaluate the easing.
    #[inline]
    pub fn apply(self, elapsed: f64, start: f64, delta: f64, duration: f64) -> f64 {
        match self {
            Easing::Linear => linear(elapsed, start, delta, duration),
            Easing::EaseInCubic => ease_in_cubic(elapsed, start, delta, duration),
            Easing::EaseOutCubic => ease_out_cubic(elapsed, start, delta, duration),
            Easing::EaseInOutCubic => ease_in_out_cubic(elapsed, start, delta, duration),
            Easing::EaseInQuadr => ease_in_quart(elapsed, start, delta, duration),
            Easing::EaseOutQuadr => ease_out_quart(elapsed, start, delta, duration),
            Easing::EaseInOutQuadr => ease_in_out_quart(elapsed, start, delta, duration),
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown easing name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown easing '{0}'")]
pub struct UnknownEasing(pub String);

impl FromStr for Easing {
    type Err = UnknownEasing;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Easing::ALL
            .into_iter()
            .find(|easing| easing.name() == s)
            .ok_or_else(|| UnknownEasing(s.to_string()))
    }
}

type EasingImpl = dyn Fn(f64, f64, f64, f64) -> f64 + Send + Sync;

/// A user-supplied easing with the `(elapsed, start, delta, duration)` signature.
///
/// Two `EasingFn`s are equal only if they share the same function instance.
#[derive(Clone)]
pub struct EasingFn(Arc<EasingImpl>);

impl EasingFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(f64, f64, f64, f64) -> f64 + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    #[inline]
    pub fn apply(&self, elapsed: f64, start: f64, delta: f64, duration: f64) -> f64 {
        (self.0)(elapsed, start, delta, duration)
    }
}

impl PartialEq for EasingFn {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EasingFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EasingFn(..)")
    }
}

/// An easing resolved for the animation driver: built-in or custom.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    Named(Easing),
    Custom(EasingFn),
}

impl Curve {
    #[inline]
    pub fn apply(&self, elapsed: f64, start: f64, delta: f64, duration: f64) -> f64 {
        match self {
            Curve::Named(easing) => easing.apply(elapsed, start, delta, duration),
            Curve::Custom(f) => f.apply(elapsed, start, delta, duration),
        }
    }
}

impl From<Easing> for Curve {
    fn from(easing: Easing) -> Self {
        Curve::Named(easing)
    }
}

impl From<EasingFn> for Curve {
    fn from(f: EasingFn) -> Self {
        Curve::Custom(f)
    }
}

// =============================================================================
// Linear
// =============================================================================

#[inline]
fn linear(t: f64, b: f64, c: f64, d: f64) -> f64 {
    c * t / d + b
}

// =============================================================================
// Cubic
// =============================================================================

#[inline]
fn ease_in_cubic(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / d;
    c * t * t * t + b
}

#[inline]
fn ease_out_cubic(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / d - 1.0;
    c * (t * t * t + 1.0) + b
}

#[inline]
fn ease_in_out_cubic(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / (d / 2.0);
    if t < 1.0 {
        return c / 2.0 * t * t * t + b;
    }
    let t = t - 2.0;
    c / 2.0 * (t * t * t + 2.0) + b
}

// =============================================================================
// Quartic ("Quadr")
// =============================================================================

#[inline]
fn ease_in_quart(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / d;
    c * t.powi(4) + b
}

#[inline]
fn ease_out_quart(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / d - 1.0;
    -c * (t.powi(4) - 1.0) + b
}

#[inline]
fn ease_in_out_quart(t: f64, b: f64, c: f64, d: f64) -> f64 {
    let t = t / (d / 2.0);
    if t < 1.0 {
        return c / 2.0 * t.powi(4) + b;
    }
    let t = t - 2.0;
    -c / 2.0 * (t.powi(4) - 2.0) + b
}
