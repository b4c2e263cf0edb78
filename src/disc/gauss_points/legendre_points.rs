use std::f64::consts::PI;

use ndarray::{Array, Ix1};

const NEWTON_TOL: f64 = 1.0e-15;
const NEWTON_MAX_ITER: usize = 100;

/// Value and derivative of the Legendre polynomial `P_n` at `x`.
/// The derivative formula is singular at `x = ±1`, which is never a Gauss point.
pub fn legendre_and_derivative(n: usize, x: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }
    let mut p_prev = 1.0;
    let mut p = x;
    for k in 2..=n {
        let kf = k as f64;
        let p_next = ((2.0 * kf - 1.0) * x * p - (kf - 1.0) * p_prev) / kf;
        p_prev = p;
        p = p_next;
    }
    let dp = n as f64 * (x * p - p_prev) / (x * x - 1.0);
    (p, dp)
}

/// Gauss-Legendre points and weights on `[-1, 1]`, sorted by increasing abscissa.
/// Exact for polynomials of degree `2 * points_num - 1`.
pub fn get_legendre_points_interval(points_num: usize) -> (Array<f64, Ix1>, Array<f64, Ix1>) {
    let mut points = Array::<f64, Ix1>::zeros(points_num);
    let mut weights = Array::<f64, Ix1>::zeros(points_num);
    let nf = points_num as f64;
    for i in 0..points_num {
        // Chebyshev-like initial guess, roots come out in decreasing order
        let mut x = (PI * (i as f64 + 0.75) / (nf + 0.5)).cos();
        for _ in 0..NEWTON_MAX_ITER {
            let (p, dp) = legendre_and_derivative(points_num, x);
            let dx = p / dp;
            x -= dx;
            if dx.abs() < NEWTON_TOL {
                break;
            }
        }
        let (_, dp) = legendre_and_derivative(points_num, x);
        points[points_num - 1 - i] = x;
        weights[points_num - 1 - i] = 2.0 / ((1.0 - x * x) * dp * dp);
    }
    (points, weights)
}
