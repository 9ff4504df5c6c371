/// Result of a bracketed root search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RootOutcome {
    Converged(f64),
    /// `f(lower)` and `f(upper)` have the same sign.
    Unbracketed,
    /// Best estimate when the iteration budget ran out.
    IterationLimit(f64),
}

/// Brent's method (bisection, secant and inverse quadratic interpolation) for a
/// root of `f` in `[lower, upper]`, to absolute accuracy `tol`.
pub fn find_root<F>(mut f: F, lower: f64, upper: f64, tol: f64, max_iter: usize) -> RootOutcome
where
    F: FnMut(f64) -> f64,
{
    let mut a = lower;
    let mut b = upper;
    let mut fa = f(a);
    let mut fb = f(b);

    if fa == 0.0 {
        return RootOutcome::Converged(a);
    }
    if fb == 0.0 {
        return RootOutcome::Converged(b);
    }
    if !(fa * fb < 0.0) {
        return RootOutcome::Unbracketed;
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = 0.0;
    let mut e = 0.0;

    for _ in 0..max_iter {
        if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * tol;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol1 || fb == 0.0 {
            return RootOutcome::Converged(b);
        }

        if e.abs() >= tol1 && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let qa = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * qa * (qa - r) - (b - a) * (r - 1.0)),
                    (qa - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * xm * q - (tol1 * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol1 { d } else { tol1.copysign(xm) };
        fb = f(b);
    }

    RootOutcome::IterationLimit(b)
}
