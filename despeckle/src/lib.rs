//! Despeckle - adaptive median filtering for gray-scale images.
//!
//! The filter replaces each interior pixel with the median of its square
//! window, optionally only when the pixel deviates from that median by more
//! than `threshold` robust standard deviations (1.4826 × MAD). Border pixels
//! without a complete window are left untouched.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use despeckle::{AdaptiveMedianFilter, FilterConfig, PixelBuffer};
//!
//! let image = PixelBuffer::new(width, height, pixels)?;
//! let filter = AdaptiveMedianFilter::new(FilterConfig::new(2, 1.5))?;
//! let output = filter.apply(&image);
//!
//! println!("Replaced {} pixels", output.replaced);
//! ```

pub mod batch;
mod buffer;
pub mod codec;
mod config;
mod error;
mod filter;
pub(crate) mod math;

#[cfg(feature = "bench")]
pub mod bench {
    pub use crate::filter::bench as adaptive_median;
}

pub use buffer::PixelBuffer;
pub use config::{FilterConfig, MAX_WINDOW_RADIUS, MIN_WINDOW_RADIUS};
pub use error::{Error, Result};
pub use filter::{filter, AdaptiveMedianFilter, FilterOutput};
pub use math::MAD_TO_SIGMA;
