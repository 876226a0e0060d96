pub mod analysis;
pub mod distributions;
pub mod hypothesis;
pub mod intervals;
pub mod power;
pub mod recommendation;
pub mod sample;
pub mod summary;

pub use analysis::*;
pub use hypothesis::*;
pub use intervals::*;
pub use power::*;
pub use recommendation::*;
pub use sample::*;
pub use summary::*;

use abtest_core::{CoreError, Result};

/// Round half away from zero to `places` decimals.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Probabilities configuring a test (alpha, power, confidence) must lie in (0, 1).
pub(crate) fn check_probability(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "{name} must be strictly between 0 and 1, got {value}"
        )))
    }
}

/// Group sizes passed to the raw formulas must be at least one user.
pub(crate) fn check_group_size(name: &str, n: usize) -> Result<()> {
    if n > 0 {
        Ok(())
    } else {
        Err(CoreError::Validation(format!("{name} must be at least 1, got 0")))
    }
}
