//! Error types for the widget.

use thiserror::Error;

/// A rejected write.
///
/// Validation always happens synchronously, before any state is touched:
/// when one of these is returned the widget is exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A numeric property received something that is not a finite number.
    #[error("failed to set the {property} property on CircleProgress: the provided value is non-finite")]
    NonFinite { property: &'static str },

    /// `textFormat` received an unknown layout name.
    #[error(
        "failed to set the textFormat property on CircleProgress: the provided value \"{value}\" is not a legal textFormat identifier"
    )]
    IllegalTextFormat { value: String },

    /// `animation` received an unknown easing name.
    #[error(
        "failed to set the animation property on CircleProgress: the provided value \"{value}\" is not a legal easing function name"
    )]
    IllegalEasing { value: String },

    /// `animation` received something that is neither a name nor a function.
    #[error(
        "failed to set the animation property on CircleProgress: the value must be either string or function, {got} passed"
    )]
    AnimationType { got: &'static str },

    /// A property received a value of a kind it cannot hold.
    #[error("failed to set the {property} property on CircleProgress: {got} cannot be converted to {expected}")]
    WrongType {
        property: &'static str,
        expected: &'static str,
        got: &'static str,
    },

    /// A non-boolean attribute was removed, leaving its property without a value.
    #[error("failed to set the {property} property on CircleProgress: no value provided")]
    MissingValue { property: &'static str },

    /// The bulk accessor received an argument of the wrong shape.
    #[error("wrong argument passed to attr: {message}")]
    WrongArgument { message: String },

    /// No property with this name exists.
    #[error("CircleProgress has no property named \"{name}\"")]
    UnknownProperty { name: String },
}

impl ValidationError {
    /// Create a wrong-argument error.
    pub fn wrong_argument(message: impl Into<String>) -> Self {
        Self::WrongArgument {
            message: message.into(),
        }
    }

    /// Create an unknown-property error.
    pub fn unknown_property(name: impl Into<String>) -> Self {
        Self::UnknownProperty { name: name.into() }
    }
}

/// Errors raised while reading construction options.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// The options document is not valid JSON or has unknown keys.
    #[error("invalid options document: {0}")]
    Parse(#[from] serde_json::Error),

    /// An option value failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Result type for property writes.
pub type Result<T> = std::result::Result<T, ValidationError>;
