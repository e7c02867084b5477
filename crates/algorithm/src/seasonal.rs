//! Additive trend + month-of-year seasonal model
//!
//! Models a monthly series as
//!
//! `y(t) = intercept + slope * t + s[month(t)]`
//!
//! where `t` is the number of months since the first observation and `s` holds
//! one additive effect per calendar month, centred over the months that occur
//! in the history. Because `t` comes from the real dates, gaps in the history
//! need no interpolation: missing months simply contribute no equations.
//!
//! ## Fitting
//!
//! Trend and seasonal effects are estimated by backfitting: ordinary least
//! squares for the trend on the deseasonalized series, then per-month mean
//! residuals for the seasonal effects, repeated a fixed number of rounds. The
//! procedure is deterministic, so the same history always yields the same
//! model.

use crate::confidence::{interval_half_width, z_score};
use crate::error::{Result, TsError};
use crate::metrics::{mae, rmse};
use crate::{Forecast, Forecaster};
use chrono::{Datelike, NaiveDate};
use data_spi::{
    add_months, month_start, months_between, observation_values, MonthlyObservation,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fewest observations a model can be fitted on.
pub const MIN_OBSERVATIONS: usize = 2;

const MONTHS_PER_YEAR: usize = 12;
const BACKFIT_ROUNDS: usize = 25;

/// Model settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalTrendConfig {
    /// Width of the prediction interval (0 < width < 1)
    pub interval_width: f64,
}

impl Default for SeasonalTrendConfig {
    fn default() -> Self {
        Self {
            interval_width: 0.8,
        }
    }
}

/// Trend plus yearly-seasonality forecaster for first-of-month series.
///
/// # Example
///
/// ```rust
/// use algorithm::{Forecaster, SeasonalTrendConfig, SeasonalTrendModel};
/// use data_spi::{month_start, MonthlyObservation};
///
/// let history: Vec<MonthlyObservation> = (1..=12)
///     .map(|m| MonthlyObservation::new(month_start(2020, m).unwrap(), 10.0 + m as f64))
///     .collect();
///
/// let mut model = SeasonalTrendModel::new(SeasonalTrendConfig::default()).unwrap();
/// model.fit(&history).unwrap();
/// let jan = model.predict_month(2021, 1).unwrap();
/// assert!(jan.yhat_lower <= jan.yhat && jan.yhat <= jan.yhat_upper);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalTrendModel {
    config: SeasonalTrendConfig,
    /// First observed month; `t = 0`
    anchor: Option<NaiveDate>,
    /// Last observed month; forecast horizons count from here
    last_observed: Option<NaiveDate>,
    intercept: f64,
    /// Trend per month
    slope: f64,
    /// Additive effect per calendar month, January first
    seasonal: Vec<f64>,
    residual_std: f64,
    n_observations: usize,
}

/// In-sample fit quality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    pub n_observations: usize,
    pub first: NaiveDate,
    pub last: NaiveDate,
    pub mae: f64,
    pub rmse: f64,
    pub residual_std: f64,
}

impl SeasonalTrendModel {
    /// Create an unfitted model.
    pub fn new(config: SeasonalTrendConfig) -> Result<Self> {
        z_score(config.interval_width)?;

        Ok(Self {
            config,
            anchor: None,
            last_observed: None,
            intercept: 0.0,
            slope: 0.0,
            seasonal: vec![0.0; MONTHS_PER_YEAR],
            residual_std: 0.0,
            n_observations: 0,
        })
    }

    pub fn config(&self) -> &SeasonalTrendConfig {
        &self.config
    }

    /// Level at the first observed month, excluding seasonality
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Trend per month
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Additive effect per calendar month, January first
    pub fn seasonal_effects(&self) -> &[f64] {
        &self.seasonal
    }

    /// Standard deviation of the in-sample residuals
    pub fn residual_std(&self) -> f64 {
        self.residual_std
    }

    pub fn n_observations(&self) -> usize {
        self.n_observations
    }

    /// First and last month of the history the model was fitted on
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.anchor?, self.last_observed?))
    }

    /// Forecast for the first day of `year`-`month`.
    pub fn predict_month(&self, year: i32, month: u32) -> Result<Forecast> {
        let date = month_start(year, month).ok_or_else(|| TsError::InvalidParameter {
            name: "month".to_string(),
            reason: format!("{}-{} is not a calendar month", year, month),
        })?;
        self.predict_one(date)
    }

    /// The `periods` months following the last observation.
    pub fn future_dates(&self, periods: usize) -> Result<Vec<NaiveDate>> {
        let (_, last) = self.span().ok_or(TsError::NotFitted)?;
        Ok((1..=periods as i64)
            .filter_map(|step| add_months(last, step))
            .collect())
    }

    /// Point estimates at the dates of `observations`.
    pub fn fitted_values(&self, observations: &[MonthlyObservation]) -> Result<Vec<f64>> {
        let (anchor, _) = self.span().ok_or(TsError::NotFitted)?;
        Ok(observations
            .iter()
            .map(|o| self.point(anchor, o.date))
            .collect())
    }

    /// Accuracy of the model on `observations` (normally its own history).
    pub fn summary(&self, observations: &[MonthlyObservation]) -> Result<FitSummary> {
        let (first, last) = self.span().ok_or(TsError::NotFitted)?;
        let actual = observation_values(observations);
        let fitted = self.fitted_values(observations)?;

        Ok(FitSummary {
            n_observations: self.n_observations,
            first,
            last,
            mae: mae(&actual, &fitted),
            rmse: rmse(&actual, &fitted),
            residual_std: self.residual_std,
        })
    }

    fn point(&self, anchor: NaiveDate, date: NaiveDate) -> f64 {
        let t = months_between(anchor, date) as f64;
        let season = self
            .seasonal
            .get(date.month0() as usize)
            .copied()
            .unwrap_or(0.0);
        self.intercept + self.slope * t + season
    }

    fn predict_one(&self, date: NaiveDate) -> Result<Forecast> {
        let (anchor, last) = self.span().ok_or(TsError::NotFitted)?;
        let date = date.with_day(1).unwrap_or(date);

        let yhat = self.point(anchor, date);
        if !yhat.is_finite() {
            return Err(TsError::NumericalError(format!(
                "non-finite estimate for {}",
                date
            )));
        }

        let half = interval_half_width(
            self.residual_std,
            months_between(last, date),
            self.config.interval_width,
        )?;

        Ok(Forecast {
            date,
            yhat,
            yhat_lower: yhat - half,
            yhat_upper: yhat + half,
        })
    }
}

impl Forecaster for SeasonalTrendModel {
    fn fit(&mut self, observations: &[MonthlyObservation]) -> Result<()> {
        validate(observations)?;

        let anchor = observations[0].date;
        let last = observations[observations.len() - 1].date;
        let t: Vec<f64> = observations
            .iter()
            .map(|o| months_between(anchor, o.date) as f64)
            .collect();
        let months: Vec<usize> = observations
            .iter()
            .map(|o| o.date.month0() as usize)
            .collect();
        let y = observation_values(observations);

        let (mut intercept, mut slope) = least_squares(&t, &y)?;
        let mut seasonal = vec![0.0; MONTHS_PER_YEAR];

        for _ in 0..BACKFIT_ROUNDS {
            let detrended: Vec<f64> = y
                .iter()
                .zip(&t)
                .map(|(&value, &ti)| value - (intercept + slope * ti))
                .collect();
            seasonal = seasonal_effects(&months, &detrended);

            let deseasonalized: Vec<f64> = y
                .iter()
                .zip(&months)
                .map(|(&value, &m)| value - seasonal[m])
                .collect();
            (intercept, slope) = least_squares(&t, &deseasonalized)?;
        }

        let residuals: Vec<f64> = (0..y.len())
            .map(|i| y[i] - (intercept + slope * t[i] + seasonal[months[i]]))
            .collect();

        self.anchor = Some(anchor);
        self.last_observed = Some(last);
        self.intercept = intercept;
        self.slope = slope;
        self.seasonal = seasonal;
        self.residual_std = std_dev(&residuals);
        self.n_observations = observations.len();

        debug!(
            n = self.n_observations,
            first = %anchor,
            last = %last,
            intercept = self.intercept,
            slope = self.slope,
            residual_std = self.residual_std,
            "seasonal trend model fitted"
        );
        Ok(())
    }

    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<Forecast>> {
        dates.iter().map(|&date| self.predict_one(date)).collect()
    }

    fn is_fitted(&self) -> bool {
        self.anchor.is_some()
    }
}

fn validate(observations: &[MonthlyObservation]) -> Result<()> {
    if observations.len() < MIN_OBSERVATIONS {
        return Err(TsError::InsufficientData {
            required: MIN_OBSERVATIONS,
            actual: observations.len(),
        });
    }
    if let Some(bad) = observations.iter().find(|o| !o.value.is_finite()) {
        return Err(TsError::InvalidData(format!(
            "non-finite value at {}",
            bad.date
        )));
    }
    if let Some(pair) = observations
        .windows(2)
        .find(|w| months_between(w[0].date, w[1].date) <= 0)
    {
        return Err(TsError::InvalidData(format!(
            "dates must be strictly increasing months ({} then {})",
            pair[0].date, pair[1].date
        )));
    }
    Ok(())
}

/// OLS fit of `y = intercept + slope * t`.
fn least_squares(t: &[f64], y: &[f64]) -> Result<(f64, f64)> {
    let n = t.len() as f64;
    let sum_t: f64 = t.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_t2: f64 = t.iter().map(|ti| ti * ti).sum();
    let sum_ty: f64 = t.iter().zip(y).map(|(ti, yi)| ti * yi).sum();

    let denominator = n * sum_t2 - sum_t * sum_t;
    if denominator.abs() < 1e-10 {
        return Err(TsError::NumericalError(
            "Singular matrix in regression".to_string(),
        ));
    }

    let slope = (n * sum_ty - sum_t * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_t) / n;
    Ok((intercept, slope))
}

/// Mean residual per calendar month, centred over the months present.
fn seasonal_effects(months: &[usize], residuals: &[f64]) -> Vec<f64> {
    let mut sums = [0.0; MONTHS_PER_YEAR];
    let mut counts = [0usize; MONTHS_PER_YEAR];
    for (&m, &r) in months.iter().zip(residuals) {
        sums[m] += r;
        counts[m] += 1;
    }

    let mut effects = vec![0.0; MONTHS_PER_YEAR];
    let mut observed = 0usize;
    let mut total = 0.0;
    for m in 0..MONTHS_PER_YEAR {
        if counts[m] > 0 {
            effects[m] = sums[m] / counts[m] as f64;
            total += effects[m];
            observed += 1;
        }
    }

    if observed > 0 {
        let mean = total / observed as f64;
        for m in 0..MONTHS_PER_YEAR {
            if counts[m] > 0 {
                effects[m] -= mean;
            }
        }
    }
    effects
}

fn std_dev(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}
