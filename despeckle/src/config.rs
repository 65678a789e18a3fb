//! Filter parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Smallest accepted window radius (3x3 window).
pub const MIN_WINDOW_RADIUS: usize = 1;

/// Largest accepted window radius (11x11 window).
pub const MAX_WINDOW_RADIUS: usize = 5;

/// Number of samples in the largest window.
pub const MAX_WINDOW_AREA: usize = (2 * MAX_WINDOW_RADIUS + 1) * (2 * MAX_WINDOW_RADIUS + 1);

/// Parameters of the adaptive median filter.
///
/// A threshold of 0 turns the filter into a plain median filter. Larger values
/// only replace pixels whose distance from the local median exceeds
/// `threshold` robust standard deviations of their window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Half-width of the square window, excluding the center (1..=5).
    pub window_radius: usize,
    /// Multiplier of the MAD-based noise estimate (>= 0).
    pub threshold: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            window_radius: MIN_WINDOW_RADIUS,
            threshold: 0.0,
        }
    }
}

impl FilterConfig {
    pub fn new(window_radius: usize, threshold: f32) -> Self {
        Self {
            window_radius,
            threshold,
        }
    }

    /// Plain median filter with the given window radius.
    pub fn median(window_radius: usize) -> Self {
        Self::new(window_radius, 0.0)
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Side length of the square window, `2 * radius + 1`.
    #[inline]
    pub fn window_side(&self) -> usize {
        2 * self.window_radius + 1
    }

    /// Number of samples in one window. Always odd.
    #[inline]
    pub fn window_area(&self) -> usize {
        self.window_side() * self.window_side()
    }

    /// Whether the MAD gate is active.
    #[inline]
    pub fn is_adaptive(&self) -> bool {
        self.threshold > 0.0
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_WINDOW_RADIUS..=MAX_WINDOW_RADIUS).contains(&self.window_radius) {
            return Err(Error::InvalidParameter(format!(
                "window radius must be in {}..={}, got {}",
                MIN_WINDOW_RADIUS, MAX_WINDOW_RADIUS, self.window_radius
            )));
        }
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "threshold must be a finite non-negative number, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}
