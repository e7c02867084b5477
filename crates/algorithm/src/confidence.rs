//! Prediction interval widths
//!
//! Intervals are symmetric around the point estimate and widen with the
//! square root of the number of months past the last observation.

use crate::error::{Result, TsError};
use statrs::distribution::{ContinuousCDF, Normal};

/// Half-width of the prediction interval.
///
/// `horizon` is the number of months past the last observation; in-sample
/// dates (horizon <= 0) use a horizon of one.
pub fn interval_half_width(residual_std: f64, horizon: i64, interval_width: f64) -> Result<f64> {
    let steps = horizon.max(1) as f64;
    Ok(z_score(interval_width)? * residual_std * steps.sqrt())
}

/// Two-sided standard normal quantile for a coverage in (0, 1).
///
/// `z_score(0.8)` is about 1.2816; `z_score(0.95)` about 1.96.
pub fn z_score(interval_width: f64) -> Result<f64> {
    if !(interval_width.is_finite() && 0.0 < interval_width && interval_width < 1.0) {
        return Err(TsError::InvalidParameter {
            name: "interval_width".to_string(),
            reason: "must be between 0 and 1 (exclusive)".to_string(),
        });
    }
    let standard = Normal::new(0.0, 1.0).map_err(|e| TsError::NumericalError(e.to_string()))?;
    Ok(standard.inverse_cdf(0.5 + interval_width / 2.0))
}
