//! Threshold calibration
//!
//! The decision threshold is fixed when a model artifact is produced: the
//! given percentile of reconstruction errors over the training set, with
//! linear interpolation between ranks. Requests never recompute it.

use crate::constants::CALIBRATION_PERCENTILE;

/// Percentile (0-100) of the finite values in `errors`
pub fn calibrate_threshold(errors: &[f32], percentile: f32) -> Option<f32> {
    let mut sorted: Vec<f32> = errors.iter().copied().filter(|e| e.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f32::total_cmp);

    let p = percentile.clamp(0.0, 100.0) as f64 / 100.0;
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = (rank - lo as f64) as f32;

    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Calibrate with the default percentile
pub fn default_threshold(errors: &[f32]) -> Option<f32> {
    calibrate_threshold(errors, CALIBRATION_PERCENTILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let errors: Vec<f32> = (0..=100).map(|i| i as f32).collect();
        assert_eq!(calibrate_threshold(&errors, 95.0), Some(95.0));
        assert_eq!(calibrate_threshold(&errors, 50.0), Some(50.0));

        let small = [0.0, 1.0];
        assert_eq!(calibrate_threshold(&small, 50.0), Some(0.5));
    }

    #[test]
    fn test_order_independent() {
        let a = [0.3, 0.1, 0.2, 0.9];
        let b = [0.9, 0.2, 0.3, 0.1];
        assert_eq!(default_threshold(&a), default_threshold(&b));
    }

    #[test]
    fn test_ignores_non_finite() {
        let errors = [f32::NAN, 0.5, f32::INFINITY];
        assert_eq!(calibrate_threshold(&errors, 95.0), Some(0.5));
        assert_eq!(calibrate_threshold(&[], 95.0), None);
    }
}
