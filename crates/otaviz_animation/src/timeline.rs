//! Cancellable timeline
//!
//! A `Timeline` interpolates between two values over a fixed duration with
//! a selected easing curve. It is the single building block every phase
//! animation is made of, and it carries the guarantees the orchestrator
//! depends on:
//!
//! - progress is monotonically non-decreasing for a given instance
//! - the completion callback fires exactly once, on the advance where
//!   progress first reaches 1
//! - `cancel()` freezes the output at its last computed value; a cancelled
//!   timeline never advances again and never invokes its callback
//!
//! Whoever owns a timeline must cancel it before replacing it so two
//! timelines never drive the same output concurrently.

use crate::easing::Easing;
use crate::values::Interpolate;

/// One-shot completion callback
pub type CompletionFn = Box<dyn FnOnce() + Send>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimelineState {
    Running,
    Complete,
    Cancelled,
}

/// Time-driven interpolation between two values
pub struct Timeline<T: Interpolate> {
    from: T,
    to: T,
    duration: f32,
    elapsed: f32,
    easing: Easing,
    state: TimelineState,
    on_complete: Option<CompletionFn>,
}

impl<T: Interpolate> Timeline<T> {
    /// Create a new timeline; it starts advancing on the first `advance` call
    pub fn new(from: T, to: T, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
            easing,
            state: TimelineState::Running,
            on_complete: None,
        }
    }

    /// Attach a completion callback (fires at most once)
    pub fn with_on_complete(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Advance by `dt` seconds, returning the new progress in `[0, 1]`.
    ///
    /// Negative `dt` (clock anomaly) is treated as zero so progress never
    /// moves backwards. Advancing a cancelled or completed timeline is a
    /// no-op that returns the frozen progress.
    pub fn advance(&mut self, dt: f32) -> f32 {
        if self.state != TimelineState::Running {
            return self.progress();
        }

        self.elapsed += dt.max(0.0);

        if self.duration <= 0.0 || self.elapsed >= self.duration {
            self.elapsed = self.duration.max(0.0);
            self.state = TimelineState::Complete;
            if let Some(f) = self.on_complete.take() {
                f();
            }
        }

        self.progress()
    }

    /// Raw (uneased) progress in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return match self.state {
                TimelineState::Running => 0.0,
                _ => 1.0,
            };
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Current interpolated value (eased)
    pub fn value(&self) -> T {
        let eased = self.easing.apply(self.progress());
        self.from.lerp(&self.to, eased)
    }

    /// Freeze the timeline at its last computed value.
    ///
    /// The completion callback is dropped and will never be invoked.
    pub fn cancel(&mut self) {
        if self.state == TimelineState::Running {
            self.state = TimelineState::Cancelled;
            self.on_complete = None;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state == TimelineState::Complete
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == TimelineState::Cancelled
    }

    /// Still running (not complete, not cancelled)
    pub fn is_running(&self) -> bool {
        self.state == TimelineState::Running
    }

    pub fn target(&self) -> &T {
        &self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otaviz_core::Vec3;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_progress_monotonic_and_exact_completion() {
        let mut tl = Timeline::new(0.0_f32, 10.0, 1.0, Easing::Linear);
        assert_eq!(tl.advance(0.25), 0.25);
        assert_eq!(tl.advance(-5.0), 0.25); // negative dt is ignored
        assert_eq!(tl.advance(0.75), 1.0);
        assert!(tl.is_complete());
        assert!((tl.value() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_completion_fires_exactly_once() {
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();
        let mut tl = Timeline::new(0.0_f32, 1.0, 0.5, Easing::Linear)
            .with_on_complete(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        tl.advance(0.5);
        tl.advance(0.5);
        tl.advance(100.0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_freezes_value_and_suppresses_callback() {
        let count = Arc::new(AtomicU32::new(0));
        let c = count.clone();
        let mut tl = Timeline::new(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 1.0, Easing::Linear)
            .with_on_complete(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        tl.advance(0.4);
        tl.cancel();
        let frozen = tl.value();
        tl.advance(10.0);
        assert!(tl.value().approx_eq(&frozen, 1e-6));
        assert!(!tl.is_complete());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_duration_completes_on_first_advance() {
        let mut tl = Timeline::new(0.0_f32, 1.0, 0.0, Easing::Linear);
        assert_eq!(tl.progress(), 0.0);
        assert_eq!(tl.advance(0.0), 1.0);
        assert!(tl.is_complete());
    }

    #[test]
    fn test_eased_value() {
        let mut tl = Timeline::new(0.0_f32, 1.0, 1.0, Easing::EaseInQuad);
        tl.advance(0.5);
        assert!((tl.value() - 0.25).abs() < 1e-6);
    }
}
