//! Forecast accuracy metrics
//!
//! Used to summarize how well a fitted model reproduces its own history.

/// Mean Absolute Error (MAE)
///
/// Average of absolute differences between predictions and actual values.
/// Returns NaN for empty or mismatched inputs.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();

    sum / actual.len() as f64
}

/// Root Mean Squared Error (RMSE)
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }

    let sum: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    (sum / actual.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mae() {
        let actual = vec![1.0, 2.0, 3.0];
        let predicted = vec![2.0, 2.0, 1.0];
        assert!((mae(&actual, &predicted) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rmse() {
        let actual = vec![0.0, 0.0];
        let predicted = vec![3.0, 4.0];
        assert!((rmse(&actual, &predicted) - 12.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_mismatched_lengths() {
        assert!(mae(&[1.0], &[]).is_nan());
        assert!(rmse(&[], &[]).is_nan());
    }
}
