//! Core systems for circle-progress.
//!
//! This crate provides the single-threaded, cooperative runtime that the
//! circle-progress widget is driven by:
//!
//! - **Clock**: monotonic time source, with a manually advanced clock for tests
//! - **Microtask Queue**: deferred work that runs at the end of the current turn
//! - **Frame Scheduler**: per-frame callbacks, synchronized to display refresh
//!   or to a fixed-interval fallback timer
//! - **Runtime**: the handle bundling the three above
//! - **Property System**: value cells with change detection
//! - **Signal System**: type-safe change notification
//!
//! # Runtime Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use circle_progress_core::{ManualClock, Runtime};
//!
//! let clock = Arc::new(ManualClock::new());
//! let runtime = Runtime::builder().clock(clock.clone()).build();
//!
//! runtime.post_microtask(|| println!("end of turn"));
//! runtime.request_frame(|now| println!("frame at {now}ms"));
//!
//! clock.advance(Duration::from_millis(16));
//! runtime.turn();
//! ```
//!
//! # Property Example
//!
//! ```
//! use circle_progress_core::{Property, Signal};
//!
//! struct Gauge {
//!     level: Property<f64>,
//!     level_changed: Signal<f64>,
//! }
//!
//! impl Gauge {
//!     fn set_level(&mut self, level: f64) {
//!         if self.level.set(level) {
//!             self.level_changed.emit(level);
//!         }
//!     }
//! }
//! ```

mod clock;
mod frame;
pub mod logging;
pub mod property;
mod runtime;
pub mod signal;
mod task;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use frame::{FrameId, FrameSource};
pub use logging::PerfSpan;
pub use property::Property;
pub use runtime::{Runtime, RuntimeBuilder};
pub use signal::{ConnectionId, Signal};
pub use task::TaskId;
