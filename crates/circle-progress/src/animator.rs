//! Frame-driven value animation.
//!
//! An animation interpolates from a start value by a delta over a duration,
//! calling back once per frame with the eased value. The last callback always
//! delivers exactly `start + delta`.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use circle_progress_core::logging::{span_names, targets};
use circle_progress_core::{FrameId, PerfSpan, Runtime};
use parking_lot::Mutex;

use crate::easing::Curve;

/// Shared status of one animation run.
#[derive(Default)]
struct AnimationState {
    cancelled: AtomicBool,
    finished: AtomicBool,
    /// The frame the next tick is waiting on.
    frame: Mutex<Option<FrameId>>,
}

/// Starts animations on a runtime.
pub struct Animator;

impl Animator {
    /// Animate from `start` to `start + delta` over `duration_ms`.
    ///
    /// `on_tick` runs once per frame with the eased value. When the elapsed
    /// time reaches the duration it runs one last time with the exact target
    /// and the animation finishes.
    pub fn start<F>(
        runtime: &Runtime,
        curve: Curve,
        start: f64,
        delta: f64,
        duration_ms: f64,
        on_tick: F,
    ) -> AnimationHandle
    where
        F: FnMut(f64) + Send + 'static,
    {
        let state = Arc::new(AnimationState::default());
        let ticker = Ticker {
            runtime: runtime.clone(),
            state: state.clone(),
            curve,
            start,
            delta,
            duration: duration_ms,
            started_at: runtime.now_ms(),
            on_tick,
        };

        tracing::debug!(
            target: targets::ANIMATION,
            start,
            delta,
            duration_ms,
            "animation started"
        );
        ticker.schedule();

        AnimationHandle {
            runtime: runtime.clone(),
            state,
        }
    }
}

/// The frame callback loop. Moves itself into each requested frame.
struct Ticker<F> {
    runtime: Runtime,
    state: Arc<AnimationState>,
    curve: Curve,
    start: f64,
    delta: f64,
    duration: f64,
    started_at: f64,
    on_tick: F,
}

impl<F> Ticker<F>
where
    F: FnMut(f64) + Send + 'static,
{
    fn schedule(self) {
        let state = self.state.clone();
        let runtime = self.runtime.clone();
        let mut frame = state.frame.lock();
        *frame = Some(runtime.request_frame(move |now| self.tick(now)));
    }

    fn tick(mut self, now: f64) {
        if self.state.cancelled.load(Ordering::Acquire) {
            return;
        }
        let _perf = PerfSpan::new(span_names::ANIMATION);
        self.state.frame.lock().take();

        let elapsed = now - self.started_at;
        if elapsed >= self.duration {
            (self.on_tick)(self.start + self.delta);
            self.state.finished.store(true, Ordering::Release);
            tracing::debug!(target: targets::ANIMATION, elapsed, "animation finished");
            return;
        }

        let current = self
            .curve
            .apply(elapsed, self.start, self.delta, self.duration);
        tracing::trace!(target: targets::ANIMATION, elapsed, current, "animation tick");
        (self.on_tick)(current);

        // The callback may have cancelled us.
        if !self.state.cancelled.load(Ordering::Acquire) {
            self.schedule();
        }
    }
}

/// Controls a running animation.
///
/// Dropping the handle leaves the animation running.
#[derive(Clone)]
pub struct AnimationHandle {
    runtime: Runtime,
    state: Arc<AnimationState>,
}

impl AnimationHandle {
    /// Stop the animation. No further callbacks run, including the final one.
    ///
    /// Returns `true` if the animation was still active.
    pub fn cancel(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state.cancelled.store(true, Ordering::Release);
        let frame = self.state.frame.lock().take();
        if let Some(id) = frame {
            self.runtime.cancel_frame(id);
        }
        tracing::debug!(target: targets::ANIMATION, "animation cancelled");
        true
    }

    /// Whether the animation will still deliver callbacks.
    pub fn is_active(&self) -> bool {
        !self.is_cancelled() && !self.is_finished()
    }

    /// Whether the final value has been delivered.
    pub fn is_finished(&self) -> bool {
        self.state.finished.load(Ordering::Acquire)
    }

    /// Whether [`cancel`](Self::cancel) stopped the animation.
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }
}

impl fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationHandle")
            .field("finished", &self.is_finished())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

static_assertions::assert_impl_all!(AnimationHandle: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use circle_progress_core::ManualClock;
    use std::time::Duration;

    fn manual() -> (Runtime, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let runtime = Runtime::builder().clock(clock.clone()).build();
        (runtime, clock)
    }

    fn record() -> (Arc<Mutex<Vec<f64>>>, impl FnMut(f64) + Send + 'static) {
        let values = Arc::new(Mutex::new(Vec::new()));
        let sink = values.clone();
        (values, move |v| sink.lock().push(v))
    }

    #[test]
    fn test_runs_to_exact_target() {
        let (runtime, clock) = manual();
        let (values, on_tick) = record();
        let handle = Animator::start(
            &runtime,
            Easing::Linear.into(),
            0.0,
            10.0,
            100.0,
            on_tick,
        );

        for _ in 0..10 {
            runtime.present_frame();
            clock.advance(Duration::from_millis(16));
        }
        runtime.present_frame();

        let values = values.lock();
        assert_eq!(values.first(), Some(&0.0));
        assert_eq!(values.last(), Some(&10.0));
        assert_eq!(values.iter().filter(|v| **v == 10.0).count(), 1);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert!(handle.is_finished());
        assert_eq!(runtime.pending_frames(), 0);
    }

    #[test]
    fn test_mid_flight_value() {
        let (runtime, clock) = manual();
        let (values, on_tick) = record();
        Animator::start(&runtime, Easing::Linear.into(), 0.0, 10.0, 1000.0, on_tick);

        clock.advance(Duration::from_millis(100));
        runtime.present_frame();
        assert_eq!(*values.lock(), vec![1.0]);
    }

    #[test]
    fn test_zero_duration_delivers_target_once() {
        let (runtime, _clock) = manual();
        let (values, on_tick) = record();
        let handle = Animator::start(&runtime, Easing::Linear.into(), 3.0, 4.0, 0.0, on_tick);

        runtime.present_frame();
        runtime.present_frame();
        assert_eq!(*values.lock(), vec![7.0]);
        assert!(handle.is_finished());
    }

    #[test]
    fn test_cancel_stops_ticks_without_final_value() {
        let (runtime, clock) = manual();
        let (values, on_tick) = record();
        let handle = Animator::start(&runtime, Easing::Linear.into(), 0.0, 10.0, 100.0, on_tick);

        clock.advance(Duration::from_millis(50));
        runtime.present_frame();
        assert!(handle.cancel());
        assert!(!handle.cancel());

        clock.advance(Duration::from_millis(100));
        assert_eq!(runtime.present_frame(), 0);
        assert_eq!(*values.lock(), vec![5.0]);
        assert!(handle.is_cancelled());
        assert!(!handle.is_finished());
    }

    #[test]
    fn test_cancel_from_inside_callback() {
        let (runtime, clock) = manual();
        let slot: Arc<Mutex<Option<AnimationHandle>>> = Arc::new(Mutex::new(None));
        let ticks = Arc::new(Mutex::new(0));

        let s = slot.clone();
        let t = ticks.clone();
        let handle = Animator::start(
            &runtime,
            Easing::EaseInOutCubic.into(),
            0.0,
            1.0,
            100.0,
            move |_| {
                *t.lock() += 1;
                if let Some(handle) = s.lock().as_ref() {
                    handle.cancel();
                }
            },
        );
        *slot.lock() = Some(handle.clone());

        runtime.present_frame();
        clock.advance(Duration::from_millis(16));
        runtime.present_frame();
        assert_eq!(*ticks.lock(), 1);
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_dropping_handle_keeps_running() {
        let (runtime, clock) = manual();
        let (values, on_tick) = record();
        drop(Animator::start(&runtime, Easing::Linear.into(), 0.0, 2.0, 10.0, on_tick));

        clock.advance(Duration::from_millis(20));
        runtime.present_frame();
        assert_eq!(*values.lock(), vec![2.0]);
    }
}
