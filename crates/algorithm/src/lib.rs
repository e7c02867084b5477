//! Monthly series forecasting
//!
//! A small forecasting library for first-of-month series: fit on a sequence of
//! [`MonthlyObservation`]s, predict point estimates (with an uncertainty band)
//! for arbitrary months, and persist the fitted model as an opaque artifact.
//!
//! - [`seasonal`]: additive trend + month-of-year model
//! - [`artifact`]: save / load of fitted models
//! - [`confidence`]: prediction interval widths
//! - [`metrics`]: in-sample accuracy
//!
//! ## Example
//!
//! ```rust
//! use algorithm::prelude::*;
//! use data_spi::{month_start, MonthlyObservation};
//!
//! let history: Vec<MonthlyObservation> = (0..24)
//!     .map(|i| {
//!         let date = month_start(2019 + i / 12, (i % 12 + 1) as u32).unwrap();
//!         MonthlyObservation::new(date, 30.0 + (i % 12) as f64)
//!     })
//!     .collect();
//!
//! let model = train(&history, SeasonalTrendConfig::default()).unwrap();
//! let forecast = model.predict_month(2021, 1).unwrap();
//! assert!(forecast.yhat.is_finite());
//! ```

pub mod artifact;
pub mod confidence;
mod error;
pub mod metrics;
pub mod seasonal;

pub use data_spi::MonthlyObservation;
pub use error::{Result, TsError};
pub use seasonal::{SeasonalTrendConfig, SeasonalTrendModel};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A point estimate with its uncertainty band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// First day of the forecast month
    pub date: NaiveDate,
    /// Point estimate
    pub yhat: f64,
    /// Lower bound of the prediction interval
    pub yhat_lower: f64,
    /// Upper bound of the prediction interval
    pub yhat_upper: f64,
}

/// Common trait for models fitted on dated monthly observations
pub trait Forecaster {
    /// Fit the model to a strictly increasing monthly series
    fn fit(&mut self, observations: &[MonthlyObservation]) -> Result<()>;

    /// Predict one forecast per requested date
    fn predict(&self, dates: &[NaiveDate]) -> Result<Vec<Forecast>>;

    /// Check if the model has been fitted
    fn is_fitted(&self) -> bool;
}

/// Fit a fresh [`SeasonalTrendModel`] in one call.
pub fn train(
    observations: &[MonthlyObservation],
    config: SeasonalTrendConfig,
) -> Result<SeasonalTrendModel> {
    let mut model = SeasonalTrendModel::new(config)?;
    model.fit(observations)?;
    Ok(model)
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::artifact::{load, save, ArtifactError};
    pub use crate::seasonal::{SeasonalTrendConfig, SeasonalTrendModel};
    pub use crate::{train, Forecast, Forecaster};
    pub use crate::{Result, TsError};
}
