//! Normal and Student's t distribution functions backing every test and interval.

use abtest_core::{CoreError, Result};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Standard normal CDF, Φ(x).
pub fn normal_cdf(x: f64) -> f64 {
    Normal::standard().cdf(x)
}

/// Standard normal quantile, Φ⁻¹(p).
pub fn normal_quantile(p: f64) -> f64 {
    Normal::standard().inverse_cdf(p)
}

/// Two-tailed p-value of a z statistic.
pub fn normal_two_tailed_p(z: f64) -> f64 {
    2.0 * Normal::standard().sf(z.abs())
}

fn students_t(df: f64) -> Result<StudentsT> {
    StudentsT::new(0.0, 1.0, df).map_err(|e| {
        CoreError::Validation(format!("invalid degrees of freedom {df}: {e}"))
    })
}

/// Student's t CDF. Infinite degrees of freedom fall back to the normal.
pub fn students_t_cdf(x: f64, df: f64) -> Result<f64> {
    if df.is_infinite() && df > 0.0 {
        return Ok(normal_cdf(x));
    }
    Ok(students_t(df)?.cdf(x))
}

/// Student's t quantile, T⁻¹(p, df).
pub fn students_t_quantile(p: f64, df: f64) -> Result<f64> {
    if df.is_infinite() && df > 0.0 {
        return Ok(normal_quantile(p));
    }
    Ok(students_t(df)?.inverse_cdf(p))
}

/// Two-tailed p-value of a t statistic.
pub fn students_t_two_tailed_p(t: f64, df: f64) -> Result<f64> {
    if df.is_infinite() && df > 0.0 {
        return Ok(normal_two_tailed_p(t));
    }
    Ok(2.0 * students_t(df)?.sf(t.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_normal_reference_values() {
        assert_abs_diff_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(normal_cdf(1.96), 0.975_002, epsilon = 1e-6);
        assert_abs_diff_eq!(normal_quantile(0.975), 1.959_964, epsilon = 1e-6);
        assert_abs_diff_eq!(normal_quantile(0.80), 0.841_621, epsilon = 1e-6);
    }

    #[test]
    fn test_normal_two_tailed_p() {
        assert_abs_diff_eq!(normal_two_tailed_p(1.959_964), 0.05, epsilon = 1e-6);
        assert_abs_diff_eq!(normal_two_tailed_p(-1.959_964), 0.05, epsilon = 1e-6);
        assert_abs_diff_eq!(normal_two_tailed_p(0.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_students_t_reference_values() {
        // t_{0.975, 10} = 2.228139
        assert_abs_diff_eq!(students_t_quantile(0.975, 10.0).unwrap(), 2.228_139, epsilon = 1e-4);
        assert_abs_diff_eq!(students_t_cdf(0.0, 5.0).unwrap(), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(
            students_t_two_tailed_p(2.228_139, 10.0).unwrap(),
            0.05,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_students_t_converges_to_normal() {
        let t = students_t_quantile(0.975, 1e6).unwrap();
        assert_abs_diff_eq!(t, normal_quantile(0.975), epsilon = 1e-4);
        assert_eq!(
            students_t_cdf(1.0, f64::INFINITY).unwrap(),
            normal_cdf(1.0)
        );
    }

    #[test]
    fn test_invalid_degrees_of_freedom() {
        assert!(students_t_cdf(1.0, 0.0).is_err());
        assert!(students_t_quantile(0.5, -3.0).is_err());
        assert!(students_t_two_tailed_p(1.0, f64::NAN).is_err());
    }
}
