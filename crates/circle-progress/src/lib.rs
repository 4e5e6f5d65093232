//! Circular SVG progress indicator.
//!
//! [`CircleProgress`] draws a track circle, a value arc and a text label into
//! a [`Surface`] (an in-memory [`SvgDocument`] by default). Its properties
//! can be written through typed setters, by name through the bulk accessor
//! ([`CircleProgress::set_attrs`]) or as string attributes
//! ([`CircleProgress::set_attribute`]). Writes made in the same turn are
//! coalesced into one update and one render.
//!
//! The widget runs on a [`Runtime`]: pending writes are flushed by a
//! microtask and value changes animate over display frames.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use circle_progress::{CircleProgress, Easing, ManualClock, Options, Runtime};
//!
//! let clock = Arc::new(ManualClock::new());
//! let runtime = Runtime::builder().clock(clock.clone()).build();
//!
//! let progress = CircleProgress::new(
//!     &runtime,
//!     Options::new()
//!         .with_max(10.0)
//!         .with_value(0.0)
//!         .with_animation(Easing::Linear)
//!         .with_animation_duration(100.0),
//! )?;
//!
//! progress.set_value(7)?;
//! runtime.turn();
//! assert!(progress.is_animating());
//!
//! clock.advance(Duration::from_millis(200));
//! runtime.turn();
//! assert_eq!(progress.label_text(), "7/10");
//! assert_eq!(progress.get_attribute("value").as_deref(), Some("7"));
//! # Ok::<(), circle_progress::ValidationError>(())
//! ```
//!
//! # Logging
//!
//! Everything is reported through `tracing` under the targets in
//! [`logging::targets`]; install any subscriber to see it.

mod animator;
mod attributes;
mod batch;
mod easing;
mod error;
pub mod geometry;
mod label;
pub mod number;
mod options;
mod props;
mod render;
mod styles;
mod surface;
mod widget;

pub use animator::{AnimationHandle, Animator};
pub use attributes::{AttributeChange, attribute_to_raw, observed_attributes};
pub use easing::{Curve, Easing, EasingFn, UnknownEasing};
pub use error::{OptionsError, Result, ValidationError};
pub use label::{LabelContent, format_label};
pub use options::Options;
pub use props::{Animation, Formatter, PropKey, PropValue, RawValue, TextFormat, validate};
pub use render::RenderKind;
pub use styles::STYLES;
pub use surface::{NodeId, Surface, SvgDocument};
pub use widget::CircleProgress;

pub use circle_progress_core::{Clock, ManualClock, MonotonicClock, Runtime, logging};
