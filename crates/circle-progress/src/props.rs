//! The property model: keys, raw inputs, validation and committed state.
//!
//! Every write, whether it comes from a typed setter, the bulk accessor or a
//! host attribute, enters as a [`RawValue`] and is turned into a typed
//! [`PropValue`] by [`validate`] before anything is queued.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use circle_progress_core::Property;
use serde::Deserialize;

use crate::easing::{Curve, Easing, EasingFn};
use crate::error::{Result, ValidationError};
use crate::number::{format_number, parse_float};

// =============================================================================
// Keys
// =============================================================================

/// A widget property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropKey {
    Value,
    Min,
    Max,
    StartAngle,
    Anticlockwise,
    Unconstrained,
    IndeterminateText,
    TextFormat,
    Animation,
    AnimationDuration,
}

impl PropKey {
    /// Every property, in declaration order.
    pub const ALL: [PropKey; 10] = [
        PropKey::Value,
        PropKey::Min,
        PropKey::Max,
        PropKey::StartAngle,
        PropKey::Anticlockwise,
        PropKey::Unconstrained,
        PropKey::IndeterminateText,
        PropKey::TextFormat,
        PropKey::Animation,
        PropKey::AnimationDuration,
    ];

    /// The order construction options are applied in. Bounds come before the
    /// value so the initial value is clamped against them.
    pub const CONSTRUCTION_ORDER: [PropKey; 10] = [
        PropKey::IndeterminateText,
        PropKey::TextFormat,
        PropKey::StartAngle,
        PropKey::Anticlockwise,
        PropKey::Animation,
        PropKey::AnimationDuration,
        PropKey::Unconstrained,
        PropKey::Min,
        PropKey::Max,
        PropKey::Value,
    ];

    /// The property name (camelCase).
    pub fn name(self) -> &'static str {
        match self {
            PropKey::Value => "value",
            PropKey::Min => "min",
            PropKey::Max => "max",
            PropKey::StartAngle => "startAngle",
            PropKey::Anticlockwise => "anticlockwise",
            PropKey::Unconstrained => "unconstrained",
            PropKey::IndeterminateText => "indeterminateText",
            PropKey::TextFormat => "textFormat",
            PropKey::Animation => "animation",
            PropKey::AnimationDuration => "animationDuration",
        }
    }

    /// The host attribute mirroring this property (kebab-case).
    pub fn attribute_name(self) -> &'static str {
        match self {
            PropKey::StartAngle => "start-angle",
            PropKey::IndeterminateText => "indeterminate-text",
            PropKey::TextFormat => "text-format",
            PropKey::AnimationDuration => "animation-duration",
            other => other.name(),
        }
    }

    /// Look up a property by name.
    pub fn from_name(name: &str) -> Option<PropKey> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }

    /// Look up a property by its attribute name.
    pub fn from_attribute(name: &str) -> Option<PropKey> {
        Self::ALL.into_iter().find(|key| key.attribute_name() == name)
    }

    /// Boolean properties are mirrored by attribute presence.
    pub fn is_boolean(self) -> bool {
        matches!(self, PropKey::Anticlockwise | PropKey::Unconstrained)
    }

    /// `min`, `max` and `value` are mirrored onto the ARIA attributes of the
    /// rendering root.
    pub fn aria_attribute(self) -> Option<&'static str> {
        match self {
            PropKey::Value => Some("aria-valuenow"),
            PropKey::Min => Some("aria-valuemin"),
            PropKey::Max => Some("aria-valuemax"),
            _ => None,
        }
    }
}

impl fmt::Display for PropKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Formatter, TextFormat, Animation
// =============================================================================

type FormatterImpl = dyn Fn(Option<f64>, Option<f64>) -> String + Send + Sync;

/// A custom label formatter, called with `(value, max)`.
///
/// Formatters must not call back into the widget that owns them.
#[derive(Clone)]
pub struct Formatter(Arc<FormatterImpl>);

impl Formatter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Option<f64>, Option<f64>) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn format(&self, value: Option<f64>, max: Option<f64>) -> String {
        (self.0)(value, max)
    }
}

impl PartialEq for Formatter {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Formatter(..)")
    }
}

/// Label layout.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum TextFormat {
    /// The value rides on the arc, the max is centred.
    ValueOnCircle,
    /// `value/max` on one line.
    #[default]
    Horizontal,
    /// `value` over `max`, separated by a rule.
    Vertical,
    /// `value / max` as a rounded percentage.
    Percent,
    /// The value only.
    Value,
    /// No label.
    None,
    /// A user formatter.
    Custom(Formatter),
}

impl TextFormat {
    /// The identifier of a built-in layout; `None` for custom formatters.
    pub fn name(&self) -> Option<&'static str> {
        Some(match self {
            TextFormat::ValueOnCircle => "valueOnCircle",
            TextFormat::Horizontal => "horizontal",
            TextFormat::Vertical => "vertical",
            TextFormat::Percent => "percent",
            TextFormat::Value => "value",
            TextFormat::None => "none",
            TextFormat::Custom(_) => return None,
        })
    }

    /// Stroke width of the track and the value arc for this layout.
    pub fn thickness(&self) -> f64 {
        if matches!(self, TextFormat::ValueOnCircle) {
            16.0
        } else {
            8.0
        }
    }
}

impl FromStr for TextFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "valueOnCircle" => Ok(TextFormat::ValueOnCircle),
            "horizontal" => Ok(TextFormat::Horizontal),
            "vertical" => Ok(TextFormat::Vertical),
            "percent" => Ok(TextFormat::Percent),
            "value" => Ok(TextFormat::Value),
            "none" => Ok(TextFormat::None),
            other => Err(ValidationError::IllegalTextFormat {
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for TextFormat {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Formatter> for TextFormat {
    fn from(f: Formatter) -> Self {
        TextFormat::Custom(f)
    }
}

/// How value changes are animated.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub enum Animation {
    /// Changes are painted immediately.
    None,
    /// A built-in easing.
    Easing(Easing),
    /// A user easing.
    Custom(EasingFn),
}

impl Animation {
    /// The attribute form; `None` for custom easings.
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Animation::None => Some("none"),
            Animation::Easing(easing) => Some(easing.name()),
            Animation::Custom(_) => None,
        }
    }

    /// The curve to drive, or `None` when animation is off.
    pub fn curve(&self) -> Option<Curve> {
        match self {
            Animation::None => None,
            Animation::Easing(easing) => Some(Curve::Named(*easing)),
            Animation::Custom(f) => Some(Curve::Custom(f.clone())),
        }
    }
}

impl Default for Animation {
    fn default() -> Self {
        Animation::Easing(Easing::EaseInOutCubic)
    }
}

impl FromStr for Animation {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        if s == "none" {
            return Ok(Animation::None);
        }
        s.parse::<Easing>()
            .map(Animation::Easing)
            .map_err(|_| ValidationError::IllegalEasing {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for Animation {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Easing> for Animation {
    fn from(easing: Easing) -> Self {
        Animation::Easing(easing)
    }
}

impl From<EasingFn> for Animation {
    fn from(f: EasingFn) -> Self {
        Animation::Custom(f)
    }
}

// =============================================================================
// Raw and validated values
// =============================================================================

/// An unvalidated input.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Bool(bool),
    /// No value: a removed attribute or a JSON `null`.
    Absent,
    Formatter(Formatter),
    Easing(EasingFn),
}

impl RawValue {
    /// The kind of input, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Number(_) => "number",
            RawValue::Text(_) => "string",
            RawValue::Bool(_) => "boolean",
            RawValue::Absent => "undefined",
            RawValue::Formatter(_) | RawValue::Easing(_) => "function",
        }
    }

    /// Loose boolean coercion: zero, NaN, the empty string, `false` and
    /// absence are false, everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            RawValue::Number(n) => *n != 0.0 && !n.is_nan(),
            RawValue::Text(s) => !s.is_empty(),
            RawValue::Bool(b) => *b,
            RawValue::Absent => false,
            RawValue::Formatter(_) | RawValue::Easing(_) => true,
        }
    }

    /// Loose numeric coercion; `NaN` when there is no number.
    fn to_number(&self) -> f64 {
        match self {
            RawValue::Number(n) => *n,
            RawValue::Text(s) => parse_float(s),
            _ => f64::NAN,
        }
    }

    /// String coercion; `None` for absent values and functions.
    fn to_text(&self) -> Option<String> {
        match self {
            RawValue::Number(n) => Some(format_number(*n)),
            RawValue::Text(s) => Some(s.clone()),
            RawValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

impl From<i32> for RawValue {
    fn from(n: i32) -> Self {
        RawValue::Number(f64::from(n))
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Text(s)
    }
}

impl From<Option<f64>> for RawValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RawValue::Absent, RawValue::Number)
    }
}

impl From<Formatter> for RawValue {
    fn from(f: Formatter) -> Self {
        RawValue::Formatter(f)
    }
}

impl From<EasingFn> for RawValue {
    fn from(f: EasingFn) -> Self {
        RawValue::Easing(f)
    }
}

impl From<Easing> for RawValue {
    fn from(easing: Easing) -> Self {
        RawValue::Text(easing.name().to_string())
    }
}

impl From<TextFormat> for RawValue {
    fn from(format: TextFormat) -> Self {
        match format {
            TextFormat::Custom(f) => RawValue::Formatter(f),
            named => RawValue::Text(named.name().unwrap_or_default().to_string()),
        }
    }
}

impl From<Animation> for RawValue {
    fn from(animation: Animation) -> Self {
        match animation {
            Animation::Custom(f) => RawValue::Easing(f),
            named => RawValue::Text(named.name().unwrap_or_default().to_string()),
        }
    }
}

impl TryFrom<&serde_json::Value> for RawValue {
    type Error = ValidationError;

    fn try_from(value: &serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(RawValue::Absent),
            Value::Bool(b) => Ok(RawValue::Bool(*b)),
            Value::Number(n) => Ok(RawValue::Number(n.as_f64().unwrap_or(f64::NAN))),
            Value::String(s) => Ok(RawValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => Err(ValidationError::wrong_argument(format!(
                "property values must be scalars, got {value}"
            ))),
        }
    }
}

/// A validated property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Number(f64),
    Bool(bool),
    Text(String),
    TextFormat(TextFormat),
    Animation(Animation),
    /// `value` in the indeterminate state.
    Absent,
}

impl PropValue {
    /// The numeric payload, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The string form of this value on the host attribute.
    ///
    /// `None` means the attribute is removed: booleans that are off, custom
    /// functions (which have no string form) and absent values.
    pub fn to_attribute(&self) -> Option<String> {
        match self {
            PropValue::Number(n) => Some(format_number(*n)),
            PropValue::Bool(true) => Some(String::new()),
            PropValue::Bool(false) | PropValue::Absent => None,
            PropValue::Text(s) => Some(s.clone()),
            PropValue::TextFormat(format) => format.name().map(str::to_string),
            PropValue::Animation(animation) => animation.name().map(str::to_string),
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Number(n) => f.write_str(&format_number(*n)),
            PropValue::Bool(b) => write!(f, "{b}"),
            PropValue::Text(s) => f.write_str(s),
            PropValue::TextFormat(format) => f.write_str(format.name().unwrap_or("function")),
            PropValue::Animation(animation) => {
                f.write_str(animation.name().unwrap_or("function"))
            }
            PropValue::Absent => f.write_str("undefined"),
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Coerce and validate a raw input for `key`.
///
/// This is the only way a [`PropValue`] is produced for a write, so any
/// value reaching the pending batch is already legal.
pub fn validate(key: PropKey, raw: RawValue) -> Result<PropValue> {
    let property = key.name();
    match key {
        PropKey::Value | PropKey::Min | PropKey::Max => finite(key, &raw).map(PropValue::Number),
        PropKey::StartAngle => finite(key, &raw).map(|angle| PropValue::Number(angle.clamp(0.0, 360.0))),
        PropKey::AnimationDuration => finite(key, &raw).map(|ms| PropValue::Number(ms.max(0.0))),
        PropKey::Anticlockwise | PropKey::Unconstrained => Ok(PropValue::Bool(raw.is_truthy())),
        PropKey::IndeterminateText => match raw {
            RawValue::Absent => Err(ValidationError::MissingValue { property }),
            RawValue::Formatter(_) | RawValue::Easing(_) => Err(ValidationError::WrongType {
                property,
                expected: "string",
                got: raw.kind(),
            }),
            other => Ok(PropValue::Text(other.to_text().unwrap_or_default())),
        },
        PropKey::TextFormat => match raw {
            RawValue::Formatter(f) => Ok(PropValue::TextFormat(TextFormat::Custom(f))),
            RawValue::Absent => Err(ValidationError::MissingValue { property }),
            RawValue::Easing(_) => Err(ValidationError::WrongType {
                property,
                expected: "label formatter",
                got: "easing function",
            }),
            other => {
                let text = other.to_text().unwrap_or_default();
                text.parse().map(PropValue::TextFormat)
            }
        },
        PropKey::Animation => match raw {
            RawValue::Text(s) => s.parse().map(PropValue::Animation),
            RawValue::Easing(f) => Ok(PropValue::Animation(Animation::Custom(f))),
            RawValue::Absent => Err(ValidationError::MissingValue { property }),
            RawValue::Formatter(_) => Err(ValidationError::WrongType {
                property,
                expected: "easing function",
                got: "label formatter",
            }),
            other => Err(ValidationError::AnimationType { got: other.kind() }),
        },
    }
}

fn finite(key: PropKey, raw: &RawValue) -> Result<f64> {
    if matches!(raw, RawValue::Formatter(_) | RawValue::Easing(_)) {
        return Err(ValidationError::WrongType {
            property: key.name(),
            expected: "number",
            got: raw.kind(),
        });
    }
    let n = raw.to_number();
    if n.is_finite() {
        Ok(n)
    } else {
        Err(ValidationError::NonFinite {
            property: key.name(),
        })
    }
}

// =============================================================================
// Committed state
// =============================================================================

/// The committed property values of one widget.
#[derive(Debug, Clone)]
pub(crate) struct State {
    pub value: Property<Option<f64>>,
    pub min: Property<f64>,
    pub max: Property<f64>,
    pub start_angle: Property<f64>,
    pub anticlockwise: Property<bool>,
    pub unconstrained: Property<bool>,
    pub indeterminate_text: Property<String>,
    pub text_format: Property<TextFormat>,
    pub animation: Property<Animation>,
    pub animation_duration: Property<f64>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            value: Property::new(None),
            min: Property::new(0.0),
            max: Property::new(1.0),
            start_angle: Property::new(0.0),
            anticlockwise: Property::new(false),
            unconstrained: Property::new(false),
            indeterminate_text: Property::new("?".to_string()),
            text_format: Property::new(TextFormat::Horizontal),
            animation: Property::new(Animation::default()),
            animation_duration: Property::new(600.0),
        }
    }
}

impl State {
    /// Read a property as a [`PropValue`].
    pub fn get(&self, key: PropKey) -> PropValue {
        match key {
            PropKey::Value => self.value.get().map_or(PropValue::Absent, PropValue::Number),
            PropKey::Min => PropValue::Number(self.min.get()),
            PropKey::Max => PropValue::Number(self.max.get()),
            PropKey::StartAngle => PropValue::Number(self.start_angle.get()),
            PropKey::Anticlockwise => PropValue::Bool(self.anticlockwise.get()),
            PropKey::Unconstrained => PropValue::Bool(self.unconstrained.get()),
            PropKey::IndeterminateText => PropValue::Text(self.indeterminate_text.get()),
            PropKey::TextFormat => PropValue::TextFormat(self.text_format.get()),
            PropKey::Animation => PropValue::Animation(self.animation.get()),
            PropKey::AnimationDuration => PropValue::Number(self.animation_duration.get()),
        }
    }

    /// Commit a validated value. Returns `true` if the property changed.
    pub fn commit(&mut self, key: PropKey, value: PropValue) -> bool {
        match (key, value) {
            (PropKey::Value, PropValue::Number(n)) => self.value.set(Some(n)),
            (PropKey::Min, PropValue::Number(n)) => self.min.set(n),
            (PropKey::Max, PropValue::Number(n)) => self.max.set(n),
            (PropKey::StartAngle, PropValue::Number(n)) => self.start_angle.set(n),
            (PropKey::Anticlockwise, PropValue::Bool(b)) => self.anticlockwise.set(b),
            (PropKey::Unconstrained, PropValue::Bool(b)) => self.unconstrained.set(b),
            (PropKey::IndeterminateText, PropValue::Text(s)) => self.indeterminate_text.set(s),
            (PropKey::TextFormat, PropValue::TextFormat(f)) => self.text_format.set(f),
            (PropKey::Animation, PropValue::Animation(a)) => self.animation.set(a),
            (PropKey::AnimationDuration, PropValue::Number(n)) => self.animation_duration.set(n),
            (key, value) => {
                tracing::warn!(
                    target: circle_progress_core::logging::targets::RECONCILE,
                    property = key.name(),
                    ?value,
                    "dropping value of the wrong kind"
                );
                false
            }
        }
    }
}
