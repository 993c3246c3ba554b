//! Quadratic least squares.
//!
//! The abscissa is centred and scaled to `[-1, 1]` before the normal
//! equations are formed; the coefficients are mapped back afterwards.

use nalgebra::{Matrix3, Vector3};

/// Evaluate `a*t^2 + b*t + c` for coefficients `[a, b, c]`.
#[inline]
pub fn eval_quadratic(coeffs: &[f64; 3], t: f64) -> f64 {
    (coeffs[0] * t + coeffs[1]) * t + coeffs[2]
}

/// Least-squares fit of `v = a*t^2 + b*t + c`; returns `[a, b, c]`.
///
/// Returns `None` when the slices differ in length or the problem is
/// rank-deficient (fewer than three distinct `t` values).
pub fn fit_quadratic(ts: &[f64], vs: &[f64]) -> Option<[f64; 3]> {
    if ts.len() != vs.len() || ts.len() < 3 {
        return None;
    }
    if !has_three_distinct(ts) {
        return None;
    }

    let n = ts.len() as f64;
    let mean = ts.iter().sum::<f64>() / n;
    let scale = ts.iter().map(|t| (t - mean).abs()).fold(0.0_f64, f64::max);
    if scale <= 0.0 || !scale.is_finite() {
        return None;
    }

    let mut s = [0.0_f64; 5]; // sum u^k, k = 0..4
    let mut r = [0.0_f64; 3]; // sum u^k * v, k = 0..2
    for (&t, &v) in ts.iter().zip(vs) {
        let u = (t - mean) / scale;
        let u2 = u * u;
        s[0] += 1.0;
        s[1] += u;
        s[2] += u2;
        s[3] += u2 * u;
        s[4] += u2 * u2;
        r[0] += v;
        r[1] += u * v;
        r[2] += u2 * v;
    }

    let m = Matrix3::new(
        s[4], s[3], s[2], //
        s[3], s[2], s[1], //
        s[2], s[1], s[0],
    );
    let rhs = Vector3::new(r[2], r[1], r[0]);
    let sol = m.lu().solve(&rhs)?;
    let (alpha, beta, gamma) = (sol[0], sol[1], sol[2]);

    // v = alpha*u^2 + beta*u + gamma with u = (t - mean) / scale
    let s2 = scale * scale;
    let a = alpha / s2;
    let b = beta / scale - 2.0 * alpha * mean / s2;
    let c = alpha * mean * mean / s2 - beta * mean / scale + gamma;

    let coeffs = [a, b, c];
    coeffs.iter().all(|v| v.is_finite()).then_some(coeffs)
}

fn has_three_distinct(ts: &[f64]) -> bool {
    let mut seen: [f64; 2] = [f64::NAN; 2];
    let mut count = 0usize;
    for &t in ts {
        if seen[..count].contains(&t) {
            continue;
        }
        if count == 2 {
            return true;
        }
        seen[count] = t;
        count += 1;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn recovers_exact_parabola() {
        let ts: Vec<f64> = (0..1000).map(|i| i as f64).collect();
        let vs: Vec<f64> = ts.iter().map(|t| 2e-4 * t * t - 0.3 * t + 512.0).collect();
        let [a, b, c] = fit_quadratic(&ts, &vs).expect("fit");
        assert_relative_eq!(a, 2e-4, epsilon = 1e-10);
        assert_relative_eq!(b, -0.3, epsilon = 1e-7);
        assert_relative_eq!(c, 512.0, epsilon = 1e-5);
    }

    #[test]
    fn constant_column_fits_flat_curve() {
        let ts: Vec<f64> = (0..50).map(|i| (i * 7) as f64).collect();
        let vs = vec![400.0; ts.len()];
        let [a, b, c] = fit_quadratic(&ts, &vs).expect("fit");
        assert!(a.abs() < 1e-12);
        assert!(b.abs() < 1e-9);
        assert_relative_eq!(c, 400.0, epsilon = 1e-8);
    }

    #[test]
    fn rank_deficient_inputs_fail() {
        assert!(fit_quadratic(&[], &[]).is_none());
        assert!(fit_quadratic(&[1.0, 2.0], &[3.0, 4.0]).is_none());
        // many samples, only two distinct rows
        let ts = [5.0, 5.0, 9.0, 9.0, 5.0];
        let vs = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(fit_quadratic(&ts, &vs).is_none());
        assert!(fit_quadratic(&[1.0, 2.0, 3.0], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn three_distinct_rows_are_enough() {
        let ts = [0.0, 1.0, 2.0, 2.0];
        let vs = [1.0, 2.0, 5.0, 5.0];
        let coeffs = fit_quadratic(&ts, &vs).expect("fit");
        assert_relative_eq!(eval_quadratic(&coeffs, 0.0), 1.0, epsilon = 1e-9);
        assert_relative_eq!(eval_quadratic(&coeffs, 1.0), 2.0, epsilon = 1e-9);
        assert_relative_eq!(eval_quadratic(&coeffs, 2.0), 5.0, epsilon = 1e-9);
    }
}
