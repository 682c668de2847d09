//! Distribution primitives backing the significance evaluator.
//!
//! Only two tail functions are needed: the standard normal CDF for the
//! two-proportion z-test and the chi-square(1) upper tail for the SRM guard.
//! Both reduce to the error function, implemented with the Abramowitz and
//! Stegun 7.1.26 rational approximation (absolute error below 1.5e-7).

use std::f64::consts::SQRT_2;

/// Error function approximation, odd-extended to negative arguments.
pub fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Complementary error function `1 - erf(x)`.
pub fn erfc(x: f64) -> f64 {
    1.0 - erf(x)
}

/// Standard normal cumulative distribution function.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / SQRT_2))
}

/// Upper-tail probability of a chi-square(1) variate.
///
/// A statistic of exactly zero must map to a probability of exactly 1.0;
/// the approximation would otherwise leave a sub-1e-7 residue.
pub fn chi_square1_upper_tail(statistic: f64) -> f64 {
    if statistic <= 0.0 {
        return 1.0;
    }
    erfc((statistic / 2.0).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erf_matches_reference_points() {
        assert!(erf(0.0).abs() < 1e-7);
        assert!((erf(1.0) - 0.842_700_79).abs() < 1e-6);
        assert!((erf(-1.0) + 0.842_700_79).abs() < 1e-6);
        assert!((erf(2.0) - 0.995_322_27).abs() < 1e-6);
    }

    #[test]
    fn normal_cdf_symmetry() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((normal_cdf(1.96) - 0.975).abs() < 1e-4);
        assert!((normal_cdf(-1.96) - 0.025).abs() < 1e-4);
    }

    #[test]
    fn chi_square_tail_is_exact_at_zero() {
        assert_eq!(chi_square1_upper_tail(0.0), 1.0);
        // chi2(1) upper tail at 3.841 is the 5% critical point.
        assert!((chi_square1_upper_tail(3.841) - 0.05).abs() < 1e-3);
    }
}
