/// Arithmetic mean, NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub fn sample_stdev(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (ss / (n - 1) as f64).sqrt()
}

/// Index of the first minimum, ignoring NaN.
pub fn argmin(values: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some(b) if values[b] <= *v => {}
            _ => best = Some(i),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const X: [f64; 15] = [
        65.0, 63.0, 67.0, 64.0, 68.0, 62.0, 70.0, 66.0, 68.0, 67.0, 69.0, 71.0, 66.0, 65.0, 70.0,
    ];

    #[test]
    fn test_mean() {
        assert_abs_diff_eq!(mean(&X), 66.7333, epsilon = 1e-4);
    }

    #[test]
    fn test_sample_stdev() {
        assert_abs_diff_eq!(sample_stdev(&X), 2.65832, epsilon = 1e-5);
        assert_eq!(sample_stdev(&[3.0]), 0.0);
    }

    #[test]
    fn test_argmin() {
        assert_eq!(argmin(&X), Some(5));
        assert_eq!(argmin(&[f64::NAN, 2.0, 1.0, 1.0]), Some(2));
        assert_eq!(argmin(&[]), None);
    }
}
