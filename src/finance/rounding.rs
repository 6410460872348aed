//! Monetary rounding shared by every price path

/// Smallest price step (R$ 0.05)
pub const PRICE_STEP: f64 = 0.05;

/// Noise allowed before a value counts as crossing into the next step
const STEP_TOLERANCE: f64 = 1e-9;

/// Round up to the next multiple of 0.05, returned with two decimals.
///
/// A value already sitting on a step (up to float noise) stays where it is,
/// so rounding an already rounded price is a no-op.
pub fn round_up_to_nickel(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    // `+ 0.0` folds -0.0 into 0.0
    let steps = (value / PRICE_STEP - STEP_TOLERANCE).ceil() + 0.0;
    round_to_cents(steps * PRICE_STEP)
}

/// Round half away from zero to two decimals
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Treat NaN and infinities as zero
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_up_to_next_step() {
        assert_eq!(round_up_to_nickel(14.2857), 14.30);
        assert_eq!(round_up_to_nickel(14.01), 14.05);
        assert_eq!(round_up_to_nickel(0.001), 0.05);
    }

    #[test]
    fn test_values_on_step_are_stable() {
        assert_eq!(round_up_to_nickel(14.30), 14.30);
        assert_eq!(round_up_to_nickel(0.1 + 0.2), 0.30);
        assert_eq!(round_up_to_nickel(round_up_to_nickel(37.42)), 37.45);
        assert_eq!(round_up_to_nickel(0.0), 0.0);
    }

    #[test]
    fn test_non_finite_is_zero() {
        assert_eq!(round_up_to_nickel(f64::INFINITY), 0.0);
        assert_eq!(round_up_to_nickel(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::NEG_INFINITY), 0.0);
        assert_eq!(finite_or_zero(12.5), 12.5);
    }
}
