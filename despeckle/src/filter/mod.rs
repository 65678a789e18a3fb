//! Adaptive median filter for gray-scale images.
//!
//! Every interior pixel is compared against the median of its square window.
//! With a zero threshold the pixel is simply replaced by that median. With a
//! positive threshold the pixel is replaced only when
//! `|pixel - median| > threshold * 1.4826 * MAD`, where MAD is the median
//! absolute deviation of the window. Pixels closer than the window radius to
//! any edge have no complete window and are copied unchanged.
//!
//! Output pixels depend only on the input buffer, so rows are filtered in
//! parallel bands without any synchronization.

#[cfg(feature = "bench")]
pub mod bench;


use arrayvec::ArrayVec;
use rayon::prelude::*;

use crate::buffer::PixelBuffer;
use crate::config::{FilterConfig, MAX_WINDOW_AREA};
use crate::error::{Error, Result};
use crate::math::{mad_to_sigma, median_and_mad_u8_mut, median_u8_mut};

/// Rows handed to one rayon task.
const ROWS_PER_CHUNK: usize = 8;

type Window = ArrayVec<u8, MAX_WINDOW_AREA>;

/// Result of one filter pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutput {
    /// Filtered image, same shape as the input.
    pub image: PixelBuffer,
    /// Number of pixels whose value was changed.
    pub replaced: usize,
}

/// Adaptive median filter with validated parameters.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveMedianFilter {
    config: FilterConfig,
}

impl AdaptiveMedianFilter {
    /// Fails with [`Error::InvalidParameter`] if the config is out of range.
    pub fn new(config: FilterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Filter `input`, processing row bands in parallel.
    pub fn apply(&self, input: &PixelBuffer) -> FilterOutput {
        let mut image = input.clone();
        if !self.has_interior(input) {
            return FilterOutput { image, replaced: 0 };
        }

        let width = input.width();
        let replaced = image
            .pixels_mut()
            .par_chunks_mut(width * ROWS_PER_CHUNK)
            .enumerate()
            .map(|(chunk_idx, chunk)| {
                let y_start = chunk_idx * ROWS_PER_CHUNK;
                chunk
                    .chunks_exact_mut(width)
                    .enumerate()
                    .map(|(local_y, row)| self.filter_row(input, y_start + local_y, row))
                    .sum::<usize>()
            })
            .sum();

        self.log_pass(input, replaced);
        FilterOutput { image, replaced }
    }

    /// Single-threaded pass. Produces exactly the same result as [`Self::apply`].
    pub fn apply_sequential(&self, input: &PixelBuffer) -> FilterOutput {
        let mut image = input.clone();
        if !self.has_interior(input) {
            return FilterOutput { image, replaced: 0 };
        }

        let width = input.width();
        let replaced = image
            .pixels_mut()
            .chunks_exact_mut(width)
            .enumerate()
            .map(|(y, row)| self.filter_row(input, y, row))
            .sum();

        self.log_pass(input, replaced);
        FilterOutput { image, replaced }
    }

    fn has_interior(&self, input: &PixelBuffer) -> bool {
        let side = self.config.window_side();
        input.width() >= side && input.height() >= side
    }

    /// Filter row `y` of `input` into `output_row`; returns the number of changed pixels.
    ///
    /// Border rows and the border columns of interior rows are left as copied.
    fn filter_row(&self, input: &PixelBuffer, y: usize, output_row: &mut [u8]) -> usize {
        let radius = self.config.window_radius;
        if y < radius || y + radius >= input.height() {
            return 0;
        }

        let mut replaced = 0;
        for x in radius..input.width() - radius {
            let mut window = gather_window(input, x, y, radius);
            if let Some(value) = self.replacement(input[(x, y)], &mut window) {
                output_row[x] = value;
                replaced += 1;
            }
        }
        replaced
    }

    /// Decide the new value of a pixel from its window.
    ///
    /// Returns `None` when the pixel keeps its original value.
    #[inline]
    fn replacement(&self, original: u8, window: &mut [u8]) -> Option<u8> {
        if !self.config.is_adaptive() {
            let median = median_u8_mut(window);
            return (median != original).then_some(median);
        }

        // f64: in f32 the product can round onto `deviation` when
        // `threshold` is within a few ULPs of `deviation / sigma`.
        let (median, mad) = median_and_mad_u8_mut(window);
        let deviation = original.abs_diff(median) as f64;
        (deviation > self.config.threshold as f64 * mad_to_sigma(mad)).then_some(median)
    }

    fn log_pass(&self, input: &PixelBuffer, replaced: usize) {
        tracing::debug!(
            width = input.width(),
            height = input.height(),
            window_radius = self.config.window_radius,
            threshold = self.config.threshold,
            replaced,
            "Adaptive median pass finished"
        );
    }
}

/// Copy the `(2r+1)x(2r+1)` neighborhood centered at `(x, y)`, row by row.
#[inline]
fn gather_window(input: &PixelBuffer, x: usize, y: usize, radius: usize) -> Window {
    let mut window = Window::new();
    for ny in y - radius..=y + radius {
        window.extend(input.row(ny)[x - radius..=x + radius].iter().copied());
    }
    window
}

/// Filter a flat row-major buffer.
///
/// Returns the filtered pixels (same length as `pixels`) and the number of
/// replaced pixels. Parameters and dimensions are checked before any work is
/// done; on error nothing is returned.
pub fn filter(
    pixels: &[u8],
    width: usize,
    height: usize,
    window_radius: usize,
    threshold: f32,
) -> Result<(Vec<u8>, usize)> {
    let filter = AdaptiveMedianFilter::new(FilterConfig::new(window_radius, threshold))?;
    if width == 0 || height == 0 {
        return Err(Error::InvalidParameter(format!(
            "image dimensions must be positive, got {}x{}",
            width, height
        )));
    }

    let input = PixelBuffer::new(width, height, pixels.to_vec())?;
    let FilterOutput { image, replaced } = filter.apply(&input);
    Ok((image.into_pixels(), replaced))
}
