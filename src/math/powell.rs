//! Powell's direction-set minimisation with Brent line searches.

const ITMAX: usize = 200;
const TINY: f64 = 1.0e-25;

// Line minimisation.
const LINMIN_TOL: f64 = 2.0e-4;

// Bracketing.
const GOLD: f64 = 1.618034;
const GLIMIT: f64 = 100.0;
const BRACKET_TINY: f64 = 1.0e-20;
const MAX_BRACKET_STEPS: usize = 500;

// Brent's one-dimensional minimiser.
const BRENT_ITMAX: usize = 100;
const CGOLD: f64 = 0.3819660;
const ZEPS: f64 = 1.0e-10;

/// Unit vectors along each coordinate, the usual starting direction set.
pub fn unit_directions(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| {
            let mut d = vec![0.0; n];
            d[i] = 1.0;
            d
        })
        .collect()
}

/// Minimises `f` starting from `x`, which is overwritten with the best point found.
/// `directions` holds one search direction per row and is updated in place.
/// Returns the function value at `x`. When the iteration cap is reached the
/// current best point is kept.
pub fn minimize<F>(f: &mut F, x: &mut [f64], directions: &mut [Vec<f64>], ftol: f64) -> f64
where
    F: FnMut(&[f64]) -> f64,
{
    let n = x.len();
    let mut fret = f(&*x);
    let mut pt = x.to_vec();
    let mut ptt = vec![0.0; n];
    let mut xit = vec![0.0; n];

    for _iter in 0..ITMAX {
        let fp = fret;
        let mut ibig = 0;
        let mut del = 0.0;

        for (i, direction) in directions.iter().enumerate() {
            xit.copy_from_slice(direction);
            let fptt = fret;
            fret = line_minimize(f, x, &mut xit);
            if fptt - fret > del {
                del = fptt - fret;
                ibig = i;
            }
        }

        if 2.0 * (fp - fret) <= ftol * (fp.abs() + fret.abs()) + TINY {
            return fret;
        }

        for j in 0..n {
            ptt[j] = 2.0 * x[j] - pt[j];
            xit[j] = x[j] - pt[j];
            pt[j] = x[j];
        }

        let fptt = f(ptt.as_slice());
        if fptt < fp {
            let t = 2.0 * (fp - 2.0 * fret + fptt) * (fp - fret - del).powi(2)
                - del * (fp - fptt).powi(2);
            if t < 0.0 {
                fret = line_minimize(f, x, &mut xit);
                directions[ibig] = directions[n - 1].clone();
                directions[n - 1] = xit.clone();
            }
        }
    }

    fret
}

/// Minimises along `direction` from `x`. On return `x` is the line minimum and
/// `direction` the displacement actually taken.
fn line_minimize<F>(f: &mut F, x: &mut [f64], direction: &mut [f64]) -> f64
where
    F: FnMut(&[f64]) -> f64,
{
    let origin = x.to_vec();
    let mut trial = vec![0.0; x.len()];
    let mut along = |t: f64| {
        for (j, p) in trial.iter_mut().enumerate() {
            *p = origin[j] + t * direction[j];
        }
        f(trial.as_slice())
    };

    let bracket = bracket_minimum(&mut along, 0.0, 1.0);
    let (xmin, fmin) = brent_minimize(&mut along, bracket, LINMIN_TOL);

    for (j, d) in direction.iter_mut().enumerate() {
        *d *= xmin;
        x[j] = origin[j] + *d;
    }
    fmin
}

#[derive(Debug, Clone, Copy)]
struct Bracket {
    a: f64,
    b: f64,
    c: f64,
    fb: f64,
}

/// Expands `[a, b]` downhill until `f(b)` is below both ends.
fn bracket_minimum<G>(g: &mut G, a: f64, b: f64) -> Bracket
where
    G: FnMut(f64) -> f64,
{
    let (mut ax, mut bx) = (a, b);
    let mut fa = g(ax);
    let mut fb = g(bx);
    if fb > fa {
        std::mem::swap(&mut ax, &mut bx);
        std::mem::swap(&mut fa, &mut fb);
    }
    let mut cx = bx + GOLD * (bx - ax);
    let mut fc = g(cx);

    let mut steps = 0;
    while fb > fc && steps < MAX_BRACKET_STEPS {
        steps += 1;
        let r = (bx - ax) * (fb - fc);
        let q = (bx - cx) * (fb - fa);
        let denom = 2.0 * (q - r).abs().max(BRACKET_TINY).copysign(q - r);
        let mut u = bx - ((bx - cx) * q - (bx - ax) * r) / denom;
        let ulim = bx + GLIMIT * (cx - bx);
        let mut fu;

        if (bx - u) * (u - cx) > 0.0 {
            fu = g(u);
            if fu < fc {
                return Bracket {
                    a: bx,
                    b: u,
                    c: cx,
                    fb: fu,
                };
            } else if fu > fb {
                return Bracket {
                    a: ax,
                    b: bx,
                    c: u,
                    fb,
                };
            }
            u = cx + GOLD * (cx - bx);
            fu = g(u);
        } else if (cx - u) * (u - ulim) > 0.0 {
            fu = g(u);
            if fu < fc {
                bx = cx;
                cx = u;
                u = cx + GOLD * (cx - bx);
                fb = fc;
                fc = fu;
                fu = g(u);
            }
        } else if (u - ulim) * (ulim - cx) >= 0.0 {
            u = ulim;
            fu = g(u);
        } else {
            u = cx + GOLD * (cx - bx);
            fu = g(u);
        }

        ax = bx;
        bx = cx;
        cx = u;
        fa = fb;
        fb = fc;
        fc = fu;
    }

    Bracket {
        a: ax,
        b: bx,
        c: cx,
        fb,
    }
}

/// Brent's parabolic-interpolation minimiser on a bracketing triplet.
fn brent_minimize<G>(g: &mut G, bracket: Bracket, tol: f64) -> (f64, f64)
where
    G: FnMut(f64) -> f64,
{
    let mut a = bracket.a.min(bracket.c);
    let mut b = bracket.a.max(bracket.c);
    let mut x = bracket.b;
    let mut w = x;
    let mut v = x;
    let mut fx = bracket.fb;
    let mut fw = fx;
    let mut fv = fx;
    let mut d: f64 = 0.0;
    let mut e: f64 = 0.0;

    for _ in 0..BRENT_ITMAX {
        let xm = 0.5 * (a + b);
        let tol1 = tol * x.abs() + ZEPS;
        let tol2 = 2.0 * tol1;
        if (x - xm).abs() <= tol2 - 0.5 * (b - a) {
            return (x, fx);
        }

        if e.abs() > tol1 {
            let r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            let etemp = e;
            e = d;
            if p.abs() >= (0.5 * q * etemp).abs() || p <= q * (a - x) || p >= q * (b - x) {
                e = if x >= xm { a - x } else { b - x };
                d = CGOLD * e;
            } else {
                d = p / q;
                let u = x + d;
                if u - a < tol2 || b - u < tol2 {
                    d = tol1.copysign(xm - x);
                }
            }
        } else {
            e = if x >= xm { a - x } else { b - x };
            d = CGOLD * e;
        }

        let u = if d.abs() >= tol1 {
            x + d
        } else {
            x + tol1.copysign(d)
        };
        let fu = g(u);

        if fu <= fx {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            v = w;
            w = x;
            x = u;
            fv = fw;
            fw = fx;
            fx = fu;
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                w = u;
                fv = fw;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        }
    }

    (x, fx)
}
