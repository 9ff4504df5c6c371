/// Straight line `y = intercept + slope * x` fitted by least squares.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearFit {
    /// Ordinary least squares.
    pub fn fit(x: &[f64], y: &[f64]) -> Self {
        Self::fit_weighted(x, y, None)
    }

    /// Least squares with optional per-point measurement errors `sigma`
    /// (chi-square fit, each point weighted by `1 / sigma^2`).
    fn fit_weighted(x: &[f64], y: &[f64], sigma: Option<&[f64]>) -> Self {
        let n = x.len().min(y.len());
        let weight = |i: usize| sigma.map_or(1.0, |s| 1.0 / (s[i] * s[i]));

        let mut s = 0.0;
        let mut sx = 0.0;
        let mut sy = 0.0;
        for i in 0..n {
            let w = weight(i);
            s += w;
            sx += w * x[i];
            sy += w * y[i];
        }
        let x_mean = sx / s;

        // Centred abscissae keep the normal equations well conditioned.
        let mut st2 = 0.0;
        let mut sty = 0.0;
        for i in 0..n {
            let w = weight(i);
            let t = x[i] - x_mean;
            st2 += w * t * t;
            sty += w * t * y[i];
        }

        let slope = sty / st2;
        let intercept = (sy - sx * slope) / s;
        Self { intercept, slope }
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const X: [f64; 12] = [
        -3.20, 4.49, -1.66, 0.64, -2.43, -0.89, -0.12, 1.41, 2.95, 2.18, 3.72, 5.26,
    ];
    const Y: [f64; 12] = [
        -7.14, -1.30, -4.26, -1.90, -6.19, -3.98, -2.87, -1.66, -0.78, -2.61, 0.31, 1.74,
    ];

    #[test]
    fn test_fit_with_measurement_errors() {
        let sigma: Vec<f64> = Y.iter().map(|y| y.abs().sqrt()).collect();
        let fit = LinearFit::fit_weighted(&X, &Y, Some(&sigma));
        assert_abs_diff_eq!(fit.intercept, -3.16574, epsilon = 1e-5);
        assert_abs_diff_eq!(fit.slope, 0.829856, epsilon = 1e-5);
    }

    #[test]
    fn test_ordinary_fit() {
        let fit = LinearFit::fit(&X, &Y);
        assert_abs_diff_eq!(fit.intercept, -3.445960, epsilon = 1e-5);
        assert_abs_diff_eq!(fit.slope, 0.867329, epsilon = 1e-5);
    }

    #[test]
    fn test_exact_line() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 0.5 - 2.0 * v).collect();
        let fit = LinearFit::fit(&x, &y);
        assert_abs_diff_eq!(fit.intercept, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.slope, -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.eval(10.0), -19.5, epsilon = 1e-12);
    }
}
