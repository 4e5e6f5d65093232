//! The cooperative runtime driving widgets.
//!
//! A [`Runtime`] is a cheap, cloneable handle. It owns a clock, a microtask
//! queue and a frame scheduler. There is no parallelism: the host calls into
//! the runtime from its own loop and every callback runs on that thread.
//!
//! One "turn" of the host loop looks like this:
//!
//! 1. synchronous work (property writes, attribute changes)
//! 2. [`Runtime::run_microtasks`] (coalesced flushes)
//! 3. [`Runtime::present_frame`] or [`Runtime::poll`] (animation ticks)
//!
//! [`Runtime::turn`] performs steps 2 and 3.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::clock::{Clock, MonotonicClock};
use crate::frame::{FrameId, FrameScheduler, FrameSource};
use crate::logging::targets;
use crate::task::{SharedTaskQueue, TaskId};

struct RuntimeInner {
    clock: Arc<dyn Clock>,
    microtasks: SharedTaskQueue,
    frames: Mutex<FrameScheduler>,
}

/// Handle to the cooperative runtime.
#[derive(Clone)]
pub struct Runtime {
    inner: Arc<RuntimeInner>,
}

static_assertions::assert_impl_all!(Runtime: Send, Sync);

impl Runtime {
    /// Create a runtime with a monotonic clock and display-refresh frames.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a runtime.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::default()
    }

    /// Current time in milliseconds since the clock's origin.
    pub fn now_ms(&self) -> f64 {
        self.inner.clock.now().as_secs_f64() * 1000.0
    }

    /// How frames are delivered.
    pub fn frame_source(&self) -> FrameSource {
        self.inner.frames.lock().source()
    }

    // =========================================================================
    // Microtasks
    // =========================================================================

    /// Queue a closure to run at the end of the current turn.
    pub fn post_microtask<F>(&self, task: F) -> TaskId
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.microtasks.post(task)
    }

    /// Cancel a queued microtask. Returns `true` if it had not run yet.
    pub fn cancel_microtask(&self, id: TaskId) -> bool {
        self.inner.microtasks.cancel(id)
    }

    /// Number of queued microtasks.
    pub fn pending_microtasks(&self) -> usize {
        self.inner.microtasks.pending_count()
    }

    /// Run queued microtasks until none remain.
    pub fn run_microtasks(&self) -> usize {
        let count = self.inner.microtasks.run_all();
        if count > 0 {
            tracing::trace!(target: targets::RUNTIME, count, "ran microtasks");
        }
        count
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Request a callback on the next frame.
    ///
    /// The callback receives the frame timestamp in milliseconds.
    pub fn request_frame<F>(&self, callback: F) -> FrameId
    where
        F: FnOnce(f64) + Send + 'static,
    {
        self.inner.frames.lock().request(Box::new(callback))
    }

    /// Cancel a requested frame. Returns `true` if it was still pending.
    pub fn cancel_frame(&self, id: FrameId) -> bool {
        self.inner.frames.lock().cancel(id)
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending_frames(&self) -> usize {
        self.inner.frames.lock().pending_count()
    }

    /// Deliver a frame now, regardless of the frame source.
    ///
    /// Hosts with a display refresh signal call this on every refresh.
    /// Microtasks queued by a callback run before the next callback.
    ///
    /// Returns the number of frame callbacks invoked.
    pub fn present_frame(&self) -> usize {
        let now = self.inner.clock.now();
        let callbacks = self.inner.frames.lock().take_frame(now);
        let timestamp = now.as_secs_f64() * 1000.0;
        let count = callbacks.len();
        for callback in callbacks {
            callback(timestamp);
            self.run_microtasks();
        }
        if count > 0 {
            tracing::trace!(target: targets::RUNTIME, count, timestamp, "presented frame");
        }
        count
    }

    /// Deliver a frame if one is due under the fixed-interval fallback.
    ///
    /// With [`FrameSource::DisplayRefresh`] every poll delivers a frame.
    pub fn poll(&self) -> usize {
        let now = self.inner.clock.now();
        let due = {
            let frames = self.inner.frames.lock();
            frames.pending_count() > 0 && frames.is_due(now)
        };
        if due { self.present_frame() } else { 0 }
    }

    /// Run one host turn: drain microtasks, then deliver a frame if due.
    ///
    /// Returns the number of microtasks plus frame callbacks run.
    pub fn turn(&self) -> usize {
        self.run_microtasks() + self.poll()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("now_ms", &self.now_ms())
            .field("frame_source", &self.frame_source())
            .field("pending_microtasks", &self.pending_microtasks())
            .field("pending_frames", &self.pending_frames())
            .finish()
    }
}

/// Builder for [`Runtime`].
#[derive(Default)]
pub struct RuntimeBuilder {
    clock: Option<Arc<dyn Clock>>,
    frame_source: FrameSource,
}

impl RuntimeBuilder {
    /// Use a specific clock (for example a [`ManualClock`](crate::ManualClock)).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Choose how frames are delivered.
    pub fn frame_source(mut self, source: FrameSource) -> Self {
        self.frame_source = source;
        self
    }

    /// Build the runtime.
    pub fn build(self) -> Runtime {
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));
        Runtime {
            inner: Arc::new(RuntimeInner {
                clock,
                microtasks: SharedTaskQueue::new(),
                frames: Mutex::new(FrameScheduler::new(self.frame_source)),
            }),
        }
    }
}
