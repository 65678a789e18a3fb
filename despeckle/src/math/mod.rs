//! Statistical functions: lower median and MAD over small pixel samples.


/// MAD (Median Absolute Deviation) to standard deviation conversion factor.
///
/// For a normal distribution, σ ≈ 1.4826 × MAD.
pub const MAD_TO_SIGMA: f64 = 1.4826;

/// Convert MAD to standard deviation (assuming normal distribution).
#[inline]
pub fn mad_to_sigma(mad: u8) -> f64 {
    mad as f64 * MAD_TO_SIGMA
}

/// Lower median of `data`, in place.
///
/// Returns the element at index `len / 2` of the ascending order. For the odd
/// sample sizes the filter uses this is the exact middle element. Reorders the
/// buffer (partial sort via quickselect).
#[inline]
pub fn median_u8_mut(data: &mut [u8]) -> u8 {
    debug_assert!(!data.is_empty());

    let mid = data.len() / 2;
    let (_, median, _) = data.select_nth_unstable(mid);
    *median
}

/// Replaces each value with |value - median|.
#[inline]
fn abs_deviation_inplace(values: &mut [u8], median: u8) {
    for v in values.iter_mut() {
        *v = v.abs_diff(median);
    }
}

/// Compute median and MAD together.
///
/// MAD = median(|x_i - median(x)|). Mutates the input buffer.
pub fn median_and_mad_u8_mut(data: &mut [u8]) -> (u8, u8) {
    let median = median_u8_mut(data);
    abs_deviation_inplace(data, median);
    let mad = median_u8_mut(data);
    (median, mad)
}
