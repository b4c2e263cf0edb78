use ndarray::{Array1, Array2, ArrayView1};

pub mod legendre_points;

/// Reference domains. The line and the square span `[-1, 1]` in every
/// direction, the triangle has vertices `(0,0)`, `(1,0)`, `(0,1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceShape {
    Line,
    Triangle,
    Square,
}
impl ReferenceShape {
    pub fn num_vertices(&self) -> usize {
        match self {
            ReferenceShape::Line => 2,
            ReferenceShape::Triangle => 3,
            ReferenceShape::Square => 4,
        }
    }
}

/// Quadrature strength used for both domain and boundary integrals.
pub fn quadrature_degree(p_degree: usize) -> usize {
    (2 * p_degree).max(1)
}

#[derive(Clone, Debug)]
pub struct QuadratureRule {
    pub shape: ReferenceShape,
    pub degree: usize,
    /// One row per point, one column per reference coordinate.
    pub points: Array2<f64>,
    pub weights: Array1<f64>,
}
impl QuadratureRule {
    /// Rule integrating every polynomial of total degree `degree` exactly on `shape`.
    pub fn new(shape: ReferenceShape, degree: usize) -> Self {
        let (points, weights) = match shape {
            ReferenceShape::Line => Self::line_points(degree),
            ReferenceShape::Square => Self::square_points(degree),
            ReferenceShape::Triangle => Self::triangle_points(degree),
        };
        Self {
            shape,
            degree,
            points,
            weights,
        }
    }
    pub fn num_points(&self) -> usize {
        self.weights.len()
    }
    /// Integral of `f` over the reference domain.
    pub fn integrate<F>(&self, f: F) -> f64
    where
        F: Fn(ArrayView1<f64>) -> f64,
    {
        self.points
            .rows()
            .into_iter()
            .zip(self.weights.iter())
            .map(|(p, w)| w * f(p))
            .sum()
    }
    fn line_points(degree: usize) -> (Array2<f64>, Array1<f64>) {
        let n = degree / 2 + 1;
        let (gp, gw) = legendre_points::get_legendre_points_interval(n);
        let points = Array2::from_shape_fn((n, 1), |(i, _)| gp[i]);
        (points, gw)
    }
    fn square_points(degree: usize) -> (Array2<f64>, Array1<f64>) {
        let n = degree / 2 + 1;
        let (gp, gw) = legendre_points::get_legendre_points_interval(n);
        let mut points = Array2::<f64>::zeros((n * n, 2));
        let mut weights = Array1::<f64>::zeros(n * n);
        for j in 0..n {
            for i in 0..n {
                let ig = j * n + i;
                points[(ig, 0)] = gp[i];
                points[(ig, 1)] = gp[j];
                weights[ig] = gw[i] * gw[j];
            }
        }
        (points, weights)
    }
    /// Collapsed-coordinate product rule. The `(1 - b)` factor of the collapse
    /// raises the polynomial degree in `b` by one.
    fn triangle_points(degree: usize) -> (Array2<f64>, Array1<f64>) {
        let na = degree / 2 + 1;
        let nb = (degree + 1) / 2 + 1;
        let (ap, aw) = legendre_points::get_legendre_points_interval(na);
        let (bp, bw) = legendre_points::get_legendre_points_interval(nb);
        let mut points = Array2::<f64>::zeros((na * nb, 2));
        let mut weights = Array1::<f64>::zeros(na * nb);
        for j in 0..nb {
            for i in 0..na {
                let ig = j * na + i;
                let (a, b) = (ap[i], bp[j]);
                points[(ig, 0)] = 0.25 * (1.0 + a) * (1.0 - b);
                points[(ig, 1)] = 0.5 * (1.0 + b);
                weights[ig] = aw[i] * bw[j] * 0.125 * (1.0 - b);
            }
        }
        (points, weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn factorial(n: usize) -> f64 {
        (1..=n).map(|k| k as f64).product()
    }
    fn interval_monomial(a: usize) -> f64 {
        if a % 2 == 1 { 0.0 } else { 2.0 / (a as f64 + 1.0) }
    }

    #[test]
    fn test_degree_policy() {
        assert_eq!(quadrature_degree(0), 1);
        assert_eq!(quadrature_degree(1), 2);
        assert_eq!(quadrature_degree(3), 6);
    }

    #[test]
    fn test_line_exactness() {
        for p in 0..5 {
            let q = quadrature_degree(p);
            let rule = QuadratureRule::new(ReferenceShape::Line, q);
            for a in 0..=q {
                let value = rule.integrate(|x| x[0].powi(a as i32));
                assert_relative_eq!(value, interval_monomial(a), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_square_exactness() {
        for p in 0..4 {
            let q = quadrature_degree(p);
            let rule = QuadratureRule::new(ReferenceShape::Square, q);
            for a in 0..=q {
                for b in 0..=(q - a) {
                    let value = rule.integrate(|x| x[0].powi(a as i32) * x[1].powi(b as i32));
                    let exact = interval_monomial(a) * interval_monomial(b);
                    assert_relative_eq!(value, exact, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_triangle_exactness() {
        // int_T x^a y^b = a! b! / (a + b + 2)!
        for p in 0..4 {
            let q = quadrature_degree(p);
            let rule = QuadratureRule::new(ReferenceShape::Triangle, q);
            assert_relative_eq!(rule.weights.sum(), 0.5, epsilon = 1e-14);
            for a in 0..=q {
                for b in 0..=(q - a) {
                    let value = rule.integrate(|x| x[0].powi(a as i32) * x[1].powi(b as i32));
                    let exact = factorial(a) * factorial(b) / factorial(a + b + 2);
                    assert_relative_eq!(value, exact, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_triangle_points_inside_reference_domain() {
        let rule = QuadratureRule::new(ReferenceShape::Triangle, 6);
        for p in rule.points.rows() {
            assert!(p[0] > 0.0 && p[1] > 0.0 && p[0] + p[1] < 1.0);
        }
    }
}
