//! Sample moments shared by the rolling and seasonal computations.
//!
//! Both use a two-pass algorithm: the mean first, then squared deviations
//! from it. For a constant slice the deviations are exactly zero, so the
//! standard deviation comes out as exactly `0.0`.

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (denominator n-1), `None` for fewer than two values.
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_empty_slice_is_undefined() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_mean_of_values() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 6.0]), Some(3.0));
    }

    #[test]
    fn test_sample_stddev_needs_two_values() {
        assert_eq!(sample_stddev(&[]), None);
        assert_eq!(sample_stddev(&[4.2]), None);
    }

    #[test]
    fn test_sample_stddev_uses_n_minus_one() {
        // deviations from mean 5: -3, -1, -1, -1, 0, 0, 2, 4 -> sum of squares 32
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let expected = (32.0_f64 / 7.0).sqrt();
        let got = sample_stddev(&values).unwrap();
        assert!((got - expected).abs() < 1e-12, "got {}, expected {}", got, expected);
    }

    #[test]
    fn test_sample_stddev_of_constant_values_is_exactly_zero() {
        assert_eq!(sample_stddev(&[-3.5; 12]), Some(0.0));
    }
}
