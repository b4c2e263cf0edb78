use ndarray::{Array1, Array2, Array3, ArrayView2};

use crate::disc::geometric::GeometricMapping2d;

/// Modal element: a Taylor expansion about the element centroid, written in
/// physical coordinates. Every mode above the first has zero mean over the
/// element, so DOF 0 is the cell average.
#[derive(Clone, Debug)]
pub struct TaylorElement {
    pub degree: usize,
    pub center: [f64; 2],
    /// Half the bounding-box extent in x and y.
    pub delta: [f64; 2],
    /// Element means of the quadratic monomials, subtracted from modes 3..6.
    pub offsets: [f64; 3],
    pub bfunc: Array2<f64>,
    pub bgrad: Array3<f64>,
}
impl TaylorElement {
    pub const MAX_DEGREE: usize = 2;

    pub fn num_modes(degree: usize) -> usize {
        (degree + 1) * (degree + 2) / 2
    }
    pub fn new(degree: usize, map: &GeometricMapping2d) -> Self {
        let jw = map.jacob_weights();
        let area = jw.sum();
        let qp = &map.quad_points;
        let center = [
            qp.column(0).dot(&jw) / area,
            qp.column(1).dot(&jw) / area,
        ];
        let extent = |d: usize| {
            let col = map.phys_nodes.column(d);
            let max = col.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let min = col.iter().copied().fold(f64::INFINITY, f64::min);
            0.5 * (max - min)
        };
        let delta = [extent(0), extent(1)];
        let mut element = Self {
            degree,
            center,
            delta,
            offsets: [0.0; 3],
            bfunc: Array2::zeros((0, 0)),
            bgrad: Array3::zeros((0, 0, 0)),
        };
        if degree >= 2 {
            let raw = element.raw_quadratics(qp.view());
            for k in 0..3 {
                element.offsets[k] = raw.column(k).dot(&jw) / area;
            }
        }
        element.bfunc = element.basis_at(qp.view());
        element.bgrad = element.grads_at(qp.view());
        element
    }
    pub fn num_dofs(&self) -> usize {
        Self::num_modes(self.degree)
    }
    fn raw_quadratics(&self, points: ArrayView2<f64>) -> Array2<f64> {
        let [dx, dy] = self.delta;
        let mut raw = Array2::<f64>::zeros((points.nrows(), 3));
        for (ip, p) in points.rows().into_iter().enumerate() {
            let xr = p[0] - self.center[0];
            let yr = p[1] - self.center[1];
            raw[(ip, 0)] = xr * xr / (2.0 * dx * dx);
            raw[(ip, 1)] = yr * yr / (2.0 * dy * dy);
            raw[(ip, 2)] = xr * yr / (dx * dy);
        }
        raw
    }
    /// Basis values at physical points, (points × DOFs).
    pub fn basis_at(&self, points: ArrayView2<f64>) -> Array2<f64> {
        let ndofs = self.num_dofs();
        let [dx, dy] = self.delta;
        let mut phi = Array2::<f64>::zeros((points.nrows(), ndofs));
        phi.column_mut(0).fill(1.0);
        if self.degree >= 1 {
            for (ip, p) in points.rows().into_iter().enumerate() {
                phi[(ip, 1)] = (p[0] - self.center[0]) / dx;
                phi[(ip, 2)] = (p[1] - self.center[1]) / dy;
            }
        }
        if self.degree >= 2 {
            let raw = self.raw_quadratics(points);
            for ip in 0..points.nrows() {
                for k in 0..3 {
                    phi[(ip, 3 + k)] = raw[(ip, k)] - self.offsets[k];
                }
            }
        }
        phi
    }
    /// Physical gradients at physical points, (points × DOFs × 2).
    pub fn grads_at(&self, points: ArrayView2<f64>) -> Array3<f64> {
        let ndofs = self.num_dofs();
        let [dx, dy] = self.delta;
        let mut grad = Array3::<f64>::zeros((points.nrows(), ndofs, 2));
        for (ip, p) in points.rows().into_iter().enumerate() {
            let xr = p[0] - self.center[0];
            let yr = p[1] - self.center[1];
            if self.degree >= 1 {
                grad[(ip, 1, 0)] = 1.0 / dx;
                grad[(ip, 2, 1)] = 1.0 / dy;
            }
            if self.degree >= 2 {
                grad[(ip, 3, 0)] = xr / (dx * dx);
                grad[(ip, 4, 1)] = yr / (dy * dy);
                grad[(ip, 5, 0)] = yr / (dx * dy);
                grad[(ip, 5, 1)] = xr / (dx * dy);
            }
        }
        grad
    }
    /// Modal coefficients of a function known through its value and
    /// derivatives at the centroid: `f, f_x, f_y, f_xx, f_yy, f_xy`.
    pub fn coefficients_from_derivatives(&self, derivs: &[f64]) -> Array1<f64> {
        let [dx, dy] = self.delta;
        let mut coeffs = Array1::<f64>::zeros(self.num_dofs());
        coeffs[0] = derivs[0];
        if self.degree >= 1 {
            coeffs[1] = derivs[1] * dx;
            coeffs[2] = derivs[2] * dy;
        }
        if self.degree >= 2 {
            coeffs[3] = derivs[3] * dx * dx;
            coeffs[4] = derivs[4] * dy * dy;
            coeffs[5] = derivs[5] * dx * dy;
            // fold the mean offsets of the quadratic modes back into the average
            coeffs[0] += (0..3).map(|k| coeffs[3 + k] * self.offsets[k]).sum::<f64>();
        }
        coeffs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::gauss_points::{QuadratureRule, ReferenceShape};
    use approx::assert_relative_eq;
    use ndarray::array;

    fn square_map() -> GeometricMapping2d {
        let quad = QuadratureRule::new(ReferenceShape::Square, 4);
        let nodes = array![[1.0, 2.0], [3.0, 2.0], [3.0, 3.0], [1.0, 3.0]];
        GeometricMapping2d::new(1, nodes, &quad)
    }

    #[test]
    fn test_center_and_delta() {
        let elem = TaylorElement::new(2, &square_map());
        assert_relative_eq!(elem.center[0], 2.0, epsilon = 1e-14);
        assert_relative_eq!(elem.center[1], 2.5, epsilon = 1e-14);
        assert_relative_eq!(elem.delta[0], 1.0);
        assert_relative_eq!(elem.delta[1], 0.5);
    }

    #[test]
    fn test_higher_modes_have_zero_mean() {
        let map = square_map();
        let elem = TaylorElement::new(2, &map);
        let jw = map.jacob_weights();
        for idof in 1..elem.num_dofs() {
            assert_relative_eq!(elem.bfunc.column(idof).dot(&jw), 0.0, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_quadratic_reproduced_from_derivatives() {
        // f = 1 + 2x - y + x^2 + 3xy - 0.5y^2
        let map = square_map();
        let elem = TaylorElement::new(2, &map);
        let [xc, yc] = elem.center;
        let f = |x: f64, y: f64| 1.0 + 2.0 * x - y + x * x + 3.0 * x * y - 0.5 * y * y;
        let derivs = [
            f(xc, yc),
            2.0 + 2.0 * xc + 3.0 * yc,
            -1.0 + 3.0 * xc - yc,
            2.0,
            -1.0,
            3.0,
        ];
        let coeffs = elem.coefficients_from_derivatives(&derivs);
        let values = elem.bfunc.dot(&coeffs);
        for ig in 0..values.len() {
            let p = map.quad_points.row(ig);
            assert_relative_eq!(values[ig], f(p[0], p[1]), epsilon = 1e-12);
        }
    }
}
