//! Choice between the normal and Student-t GARCH(1,1) fits

use crate::data::ReturnSeries;
use crate::error::Result;
use crate::models::{Distribution, FittedModel, VolatilityEstimator};
use tracing::debug;

/// Outcome of fitting both distributions and keeping the lower-AIC model
#[derive(Debug, Clone)]
pub struct ModelSelection {
    selected: Distribution,
    aic_normal: f64,
    aic_student_t: f64,
    model: FittedModel,
}

impl ModelSelection {
    /// Distribution of the selected model
    pub fn selected(&self) -> Distribution {
        self.selected
    }

    pub fn aic_normal(&self) -> f64 {
        self.aic_normal
    }

    pub fn aic_student_t(&self) -> f64 {
        self.aic_student_t
    }

    /// The selected fitted model
    pub fn model(&self) -> &FittedModel {
        &self.model
    }

    pub fn into_model(self) -> FittedModel {
        self.model
    }
}

/// Fit GARCH(1,1) under both distributions and keep the one with the lower AIC.
///
/// A tie goes to the normal model. A failure of either fit fails the selection.
pub fn select_best_model<E>(returns: &ReturnSeries, estimator: &E) -> Result<ModelSelection>
where
    E: VolatilityEstimator + ?Sized,
{
    let normal = estimator.estimate(returns, Distribution::Normal)?;
    let student_t = estimator.estimate(returns, Distribution::StudentT)?;

    let aic_normal = normal.aic();
    let aic_student_t = student_t.aic();

    let model = if aic_normal <= aic_student_t {
        normal
    } else {
        student_t
    };

    debug!(
        estimator = estimator.name(),
        aic_normal,
        aic_student_t,
        selected = %model.distribution(),
        "selected volatility model"
    );

    Ok(ModelSelection {
        selected: model.distribution(),
        aic_normal,
        aic_student_t,
        model,
    })
}
