//! Animation frame scheduling.
//!
//! Frame callbacks are one-shot: a callback that wants to keep animating
//! requests the next frame from inside itself. Callbacks requested while a
//! frame is being delivered run on the following frame.

use std::time::Duration;

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// A unique identifier for a requested animation frame.
    pub struct FrameId;
}

/// Where frame ticks come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSource {
    /// The host calls [`Runtime::present_frame`](crate::Runtime::present_frame)
    /// on every display refresh.
    DisplayRefresh,
    /// No display sync is available; frames are delivered by
    /// [`Runtime::poll`](crate::Runtime::poll) at most once per interval.
    Interval(Duration),
}

impl FrameSource {
    /// Interval used when no display refresh signal is available (~60 Hz).
    pub const FALLBACK_INTERVAL: Duration = Duration::from_millis(16);

    /// The fixed-interval fallback source.
    pub const fn fallback() -> Self {
        Self::Interval(Self::FALLBACK_INTERVAL)
    }
}

impl Default for FrameSource {
    fn default() -> Self {
        Self::DisplayRefresh
    }
}

/// A boxed frame callback; receives the frame timestamp in milliseconds.
pub(crate) type FrameCallback = Box<dyn FnOnce(f64) + Send + 'static>;

/// Pending frame callbacks, delivered in request order.
pub(crate) struct FrameScheduler {
    callbacks: SlotMap<FrameId, FrameCallback>,
    order: Vec<FrameId>,
    source: FrameSource,
    /// Timestamp of the last delivered frame.
    last_frame: Option<Duration>,
}

impl FrameScheduler {
    pub fn new(source: FrameSource) -> Self {
        Self {
            callbacks: SlotMap::with_key(),
            order: Vec::new(),
            source,
            last_frame: None,
        }
    }

    pub fn source(&self) -> FrameSource {
        self.source
    }

    pub fn request(&mut self, callback: FrameCallback) -> FrameId {
        let id = self.callbacks.insert(callback);
        self.order.push(id);
        id
    }

    /// Cancel a requested frame. Returns `true` if it was still pending.
    pub fn cancel(&mut self, id: FrameId) -> bool {
        if self.callbacks.remove(id).is_some() {
            self.order.retain(|pending| *pending != id);
            true
        } else {
            false
        }
    }

    pub fn pending_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Whether an interval-driven frame is due at `now`.
    pub fn is_due(&self, now: Duration) -> bool {
        match self.source {
            FrameSource::DisplayRefresh => true,
            FrameSource::Interval(interval) => match self.last_frame {
                Some(last) => now.saturating_sub(last) >= interval,
                None => true,
            },
        }
    }

    /// Take every pending callback for delivery at `now`.
    pub fn take_frame(&mut self, now: Duration) -> Vec<FrameCallback> {
        self.last_frame = Some(now);
        let order = std::mem::take(&mut self.order);
        order
            .into_iter()
            .filter_map(|id| self.callbacks.remove(id))
            .collect()
    }
}
