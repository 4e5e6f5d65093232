//! Construction options.

use serde::Deserialize;

use crate::easing::{Easing, EasingFn};
use crate::error::OptionsError;
use crate::props::{Animation, Formatter, PropKey, RawValue, TextFormat};

/// Options for [`CircleProgress::new`](crate::CircleProgress::new).
///
/// Unset fields keep their defaults: `min 0`, `max 1`, `startAngle 0`,
/// `anticlockwise false`, `unconstrained false`, `indeterminateText "?"`,
/// `textFormat horizontal`, `animation easeInOutCubic`,
/// `animationDuration 600`. Without a `value` the widget starts
/// indeterminate.
///
/// # Example
///
/// ```
/// use circle_progress::Options;
///
/// let options = Options::from_json(r#"{"value": 3, "max": 10, "textFormat": "percent"}"#)?;
/// assert_eq!(options.value, Some(3.0));
/// # Ok::<(), circle_progress::OptionsError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Options {
    pub value: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub start_angle: Option<f64>,
    pub anticlockwise: Option<bool>,
    pub unconstrained: Option<bool>,
    pub indeterminate_text: Option<String>,
    pub text_format: Option<TextFormat>,
    pub animation: Option<Animation>,
    pub animation_duration: Option<f64>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON object with camelCase keys.
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_start_angle(mut self, degrees: f64) -> Self {
        self.start_angle = Some(degrees);
        self
    }

    pub fn with_anticlockwise(mut self, anticlockwise: bool) -> Self {
        self.anticlockwise = Some(anticlockwise);
        self
    }

    pub fn with_unconstrained(mut self, unconstrained: bool) -> Self {
        self.unconstrained = Some(unconstrained);
        self
    }

    pub fn with_indeterminate_text(mut self, text: impl Into<String>) -> Self {
        self.indeterminate_text = Some(text.into());
        self
    }

    pub fn with_text_format(mut self, format: TextFormat) -> Self {
        self.text_format = Some(format);
        self
    }

    /// Use a custom label formatter.
    pub fn with_formatter<F>(self, f: F) -> Self
    where
        F: Fn(Option<f64>, Option<f64>) -> String + Send + Sync + 'static,
    {
        self.with_text_format(TextFormat::Custom(Formatter::new(f)))
    }

    pub fn with_animation(mut self, animation: impl Into<Animation>) -> Self {
        self.animation = Some(animation.into());
        self
    }

    /// Disable animation.
    pub fn without_animation(mut self) -> Self {
        self.animation = Some(Animation::None);
        self
    }

    /// Animate with a custom easing.
    pub fn with_easing_fn<F>(self, f: F) -> Self
    where
        F: Fn(f64, f64, f64, f64) -> f64 + Send + Sync + 'static,
    {
        self.with_animation(EasingFn::new(f))
    }

    pub fn with_animation_duration(mut self, ms: f64) -> Self {
        self.animation_duration = Some(ms);
        self
    }

    /// The set options as raw writes, in construction order.
    pub(crate) fn into_writes(self) -> Vec<(PropKey, RawValue)> {
        let mut writes = Vec::new();
        for key in PropKey::CONSTRUCTION_ORDER {
            let raw = match key {
                PropKey::Value => self.value.map(RawValue::from),
                PropKey::Min => self.min.map(RawValue::from),
                PropKey::Max => self.max.map(RawValue::from),
                PropKey::StartAngle => self.start_angle.map(RawValue::from),
                PropKey::Anticlockwise => self.anticlockwise.map(RawValue::from),
                PropKey::Unconstrained => self.unconstrained.map(RawValue::from),
                PropKey::IndeterminateText => self.indeterminate_text.clone().map(RawValue::from),
                PropKey::TextFormat => self.text_format.clone().map(RawValue::from),
                PropKey::Animation => self.animation.clone().map(RawValue::from),
                PropKey::AnimationDuration => self.animation_duration.map(RawValue::from),
            };
            if let Some(raw) = raw {
                writes.push((key, raw));
            }
        }
        writes
    }
}

impl From<Easing> for Options {
    fn from(easing: Easing) -> Self {
        Options::new().with_animation(easing)
    }
}
