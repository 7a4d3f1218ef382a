//! Humanlike pacing between synthetic keystrokes.

use std::time::Duration;

use rand::Rng;

/// Source of inter-keystroke pauses.
///
/// Injected so tests can substitute a zero-delay source without altering the
/// event-ordering logic.
pub trait DelaySource: Send + Sync {
    /// A pause drawn for the given inclusive millisecond range.
    fn pause(&self, range_ms: (u64, u64)) -> Duration;
}

/// Uniformly distributed pauses, the default. Models human inter-keystroke
/// timing and gives asynchronous page-side validators a realistic window to
/// react between characters.
pub struct UniformDelay;

impl DelaySource for UniformDelay {
    fn pause(&self, (lo, hi): (u64, u64)) -> Duration {
        if hi <= lo {
            return Duration::from_millis(lo);
        }
        let ms = rand::thread_rng().gen_range(lo..=hi);
        Duration::from_millis(ms)
    }
}

/// No pauses at all. Used by tests asserting on event order rather than
/// pacing.
pub struct NoDelay;

impl DelaySource for NoDelay {
    fn pause(&self, _range_ms: (u64, u64)) -> Duration {
        Duration::ZERO
    }
}
