//! Logging facilities for circle-progress.
//!
//! circle-progress uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("circle_progress=debug")
//!     .init();
//! ```

/// Span names used throughout circle-progress for tracing.
pub mod span_names {
    /// Batch flush span.
    pub const FLUSH: &str = "circle_progress::flush";
    /// Render pass span.
    pub const RENDER: &str = "circle_progress::render";
    /// Animation run span.
    pub const ANIMATION: &str = "circle_progress::animation";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Runtime (microtasks, frames) target.
    pub const RUNTIME: &str = "circle_progress_core::runtime";
    /// Signal system target.
    pub const SIGNAL: &str = "circle_progress_core::signal";
    /// Property validation, batching and attribute reflection.
    pub const RECONCILE: &str = "circle_progress::reconcile";
    /// Render orchestration target.
    pub const RENDER: &str = "circle_progress::render";
    /// Animation driver target.
    pub const ANIMATION: &str = "circle_progress::animation";
}

/// A guard that records a performance span until dropped.
///
/// # Example
///
/// ```
/// use circle_progress_core::PerfSpan;
///
/// {
///     let _span = PerfSpan::new("rebuild_label");
///     // ... timed work ...
/// }
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "circle_progress::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
