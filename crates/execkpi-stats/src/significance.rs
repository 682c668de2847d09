use execkpi_core::errors::{ErrorInfo, KpiError};
use execkpi_core::GroupOutcome;
use serde::{Deserialize, Serialize};

use crate::dist::{chi_square1_upper_tail, normal_cdf};

/// Default significance level gating the `significant` flag.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Critical value for the fixed 95% confidence interval.
const Z_95: f64 = 1.96;

fn eval_error(code: &str, message: impl Into<String>) -> KpiError {
    KpiError::InvalidInput(ErrorInfo::new(code, message.into()))
}

/// Two-sided 95% confidence interval around the uplift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ci95 {
    /// Lower interval bound.
    pub low: f64,
    /// Upper interval bound.
    pub high: f64,
}

/// Full significance report for one control/treatment evaluation.
///
/// Derived deterministically from the input tallies and alpha; identical
/// inputs always produce bit-identical reports. The z-test fields are `None`
/// when the pooled rate is exactly 0 or 1, in which case the standard error
/// collapses to zero and the statistic is undefined. Undefined never means
/// NaN here: callers and serializers see explicit nulls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignificanceReport {
    /// Control group conversion rate.
    pub rate_control: f64,
    /// Treatment group conversion rate.
    pub rate_treatment: f64,
    /// `rate_treatment - rate_control`.
    pub uplift: f64,
    /// Upper-tail chi-square(1) probability of the observed group split
    /// against the expected 50/50 assignment.
    pub srm_p_value: f64,
    /// Pooled two-proportion z statistic.
    pub z_statistic: Option<f64>,
    /// Two-sided p-value of the z-test.
    pub p_value: Option<f64>,
    /// Fixed 95% interval `uplift +/- 1.96 * se`, independent of alpha.
    pub ci95: Option<Ci95>,
    /// True when the p-value is defined and below alpha.
    pub significant: bool,
}

/// Evaluates one experiment sample into a [`SignificanceReport`].
///
/// The SRM check runs first as a randomization guard: a low
/// `srm_p_value` means the group split itself is suspect and the z-test
/// result should not be trusted. Alpha only gates the `significant`
/// boolean; the confidence interval stays at the fixed 95% level.
pub fn evaluate(
    control: &GroupOutcome,
    treatment: &GroupOutcome,
    alpha: f64,
) -> Result<SignificanceReport, KpiError> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(eval_error("alpha-out-of-range", "alpha must lie in (0, 1)"));
    }

    let n_control = control.total() as f64;
    let n_treatment = treatment.total() as f64;
    let rate_control = control.rate();
    let rate_treatment = treatment.rate();
    let uplift = rate_treatment - rate_control;

    // SRM: both groups are expected to receive half of the assignments.
    let expected = (n_control + n_treatment) / 2.0;
    let srm_statistic = (n_control - expected).powi(2) / expected
        + (n_treatment - expected).powi(2) / expected;
    let srm_p_value = chi_square1_upper_tail(srm_statistic);

    let pooled = (control.successes() + treatment.successes()) as f64
        / (control.total() + treatment.total()) as f64;

    if pooled == 0.0 || pooled == 1.0 {
        return Ok(SignificanceReport {
            rate_control,
            rate_treatment,
            uplift,
            srm_p_value,
            z_statistic: None,
            p_value: None,
            ci95: None,
            significant: false,
        });
    }

    let standard_error =
        (pooled * (1.0 - pooled) * (1.0 / n_control + 1.0 / n_treatment)).sqrt();
    let z_statistic = uplift / standard_error;
    let p_value = 2.0 * (1.0 - normal_cdf(z_statistic.abs()));
    let ci95 = Ci95 {
        low: uplift - Z_95 * standard_error,
        high: uplift + Z_95 * standard_error,
    };

    Ok(SignificanceReport {
        rate_control,
        rate_treatment,
        uplift,
        srm_p_value,
        z_statistic: Some(z_statistic),
        p_value: Some(p_value),
        ci95: Some(ci95),
        significant: p_value < alpha,
    })
}
