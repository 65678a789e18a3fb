//! Elapsed-time measurement around a single call.

use std::time::{Duration, Instant};

/// Runs `f` and returns its result together with the wall-clock time it took.
#[inline]
pub fn measure<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed())
}

/// Formats a duration as milliseconds with three decimals, e.g. `12.345 ms`.
pub fn format_millis(duration: Duration) -> String {
    format!("{:.3} ms", duration.as_secs_f64() * 1000.0)
}
