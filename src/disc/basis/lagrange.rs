use ndarray::{Array2, Array3, ArrayView1, ArrayView2, array};

use crate::disc::{gauss_points::ReferenceShape, geometric::GeometricMapping2d};

/// Vertices of the reference domain, counter-clockwise.
pub fn reference_vertices(shape: ReferenceShape) -> Array2<f64> {
    match shape {
        ReferenceShape::Line => array![[-1.0, 0.0], [1.0, 0.0]],
        ReferenceShape::Triangle => array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
        ReferenceShape::Square => array![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]],
    }
}

pub fn num_nodes(shape: ReferenceShape, n: usize) -> usize {
    match shape {
        ReferenceShape::Line => n + 1,
        ReferenceShape::Triangle => (n + 1) * (n + 2) / 2,
        ReferenceShape::Square => (n + 1) * (n + 1),
    }
}

/// Nodal layout: vertices, then edge mid-points (edge `i` joins vertex `i`
/// and vertex `i + 1`), then the square's centre. Degree 0 uses the centroid.
pub fn reference_nodes(shape: ReferenceShape, n: usize) -> Array2<f64> {
    match (shape, n) {
        (ReferenceShape::Triangle, 0) => array![[1.0 / 3.0, 1.0 / 3.0]],
        (ReferenceShape::Square, 0) | (ReferenceShape::Line, 0) => array![[0.0, 0.0]],
        (_, 1) => reference_vertices(shape),
        (ReferenceShape::Triangle, _) => array![
            [0.0, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [0.5, 0.0],
            [0.5, 0.5],
            [0.0, 0.5]
        ],
        (ReferenceShape::Square, _) => array![
            [-1.0, -1.0],
            [1.0, -1.0],
            [1.0, 1.0],
            [-1.0, 1.0],
            [0.0, -1.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [-1.0, 0.0],
            [0.0, 0.0]
        ],
        (ReferenceShape::Line, _) => array![[-1.0, 0.0], [1.0, 0.0], [0.0, 0.0]],
    }
}

/// 1D Lagrange polynomial of degree `n` on the equispaced nodes of `[-1, 1]`
/// that equals one at `ti`. Returns value and derivative.
fn lagrange_1d(n: usize, t: f64, ti: f64) -> (f64, f64) {
    match n {
        0 => (1.0, 0.0),
        1 => (0.5 * (1.0 + t * ti), 0.5 * ti),
        _ => {
            if ti < -0.5 {
                (0.5 * t * (t - 1.0), t - 0.5)
            } else if ti > 0.5 {
                (0.5 * t * (t + 1.0), t + 0.5)
            } else {
                (1.0 - t * t, -2.0 * t)
            }
        }
    }
}

/// Values and reference gradients of the degree-`n` Lagrange shape functions
/// at the points `(r, s)`. Each returned array is (points × nodes).
pub fn shape_functions(
    shape: ReferenceShape,
    n: usize,
    r: ArrayView1<f64>,
    s: ArrayView1<f64>,
) -> (Array2<f64>, Array2<f64>, Array2<f64>) {
    let np = num_nodes(shape, n);
    let npts = r.len();
    let mut phi = Array2::<f64>::zeros((npts, np));
    let mut dphi_dr = Array2::<f64>::zeros((npts, np));
    let mut dphi_ds = Array2::<f64>::zeros((npts, np));
    match shape {
        ReferenceShape::Square => {
            let nodes = reference_nodes(shape, n);
            for pt in 0..npts {
                for i in 0..np {
                    let (lr, dlr) = lagrange_1d(n, r[pt], nodes[(i, 0)]);
                    let (ls, dls) = lagrange_1d(n, s[pt], nodes[(i, 1)]);
                    phi[(pt, i)] = lr * ls;
                    dphi_dr[(pt, i)] = dlr * ls;
                    dphi_ds[(pt, i)] = lr * dls;
                }
            }
        }
        ReferenceShape::Triangle => {
            // barycentric coordinates and their (r, s) gradients
            let dl = [[-1.0, -1.0], [1.0, 0.0], [0.0, 1.0]];
            for pt in 0..npts {
                let l = [1.0 - r[pt] - s[pt], r[pt], s[pt]];
                match n {
                    0 => phi[(pt, 0)] = 1.0,
                    1 => {
                        for i in 0..3 {
                            phi[(pt, i)] = l[i];
                            dphi_dr[(pt, i)] = dl[i][0];
                            dphi_ds[(pt, i)] = dl[i][1];
                        }
                    }
                    _ => {
                        for i in 0..3 {
                            phi[(pt, i)] = l[i] * (2.0 * l[i] - 1.0);
                            dphi_dr[(pt, i)] = (4.0 * l[i] - 1.0) * dl[i][0];
                            dphi_ds[(pt, i)] = (4.0 * l[i] - 1.0) * dl[i][1];
                            let j = (i + 1) % 3;
                            phi[(pt, 3 + i)] = 4.0 * l[i] * l[j];
                            dphi_dr[(pt, 3 + i)] = 4.0 * (dl[i][0] * l[j] + l[i] * dl[j][0]);
                            dphi_ds[(pt, 3 + i)] = 4.0 * (dl[i][1] * l[j] + l[i] * dl[j][1]);
                        }
                    }
                }
            }
        }
        ReferenceShape::Line => {
            let nodes = reference_nodes(shape, n);
            for pt in 0..npts {
                for i in 0..np {
                    let (lr, dlr) = lagrange_1d(n, r[pt], nodes[(i, 0)]);
                    phi[(pt, i)] = lr;
                    dphi_dr[(pt, i)] = dlr;
                }
            }
        }
    }
    (phi, dphi_dr, dphi_ds)
}

/// Reference coordinates of the face quadrature points `t` seen from local
/// face `local_face` of an element. A reversed side walks the edge from its
/// second vertex to its first.
pub fn face_reference_points(
    shape: ReferenceShape,
    local_face: usize,
    reversed: bool,
    t: ArrayView1<f64>,
) -> Array2<f64> {
    let vertices = reference_vertices(shape);
    let nv = shape.num_vertices();
    let (a, b) = (local_face % nv, (local_face + 1) % nv);
    let mut points = Array2::<f64>::zeros((t.len(), 2));
    for (ig, &tg) in t.iter().enumerate() {
        let tg = if reversed { -tg } else { tg };
        let lambda = 0.5 * (1.0 + tg);
        for d in 0..2 {
            points[(ig, d)] = vertices[(a, d)] + lambda * (vertices[(b, d)] - vertices[(a, d)]);
        }
    }
    points
}

/// Nodal element: DOFs are point values at [`reference_nodes`].
#[derive(Clone, Debug)]
pub struct LagrangeElement {
    pub degree: usize,
    pub shape: ReferenceShape,
    pub ref_nodes: Array2<f64>,
    /// (quadrature points × DOFs)
    pub bfunc: Array2<f64>,
    /// (quadrature points × DOFs × 2), physical gradients
    pub bgrad: Array3<f64>,
}
impl LagrangeElement {
    pub const MAX_DEGREE: usize = 2;

    pub fn new(degree: usize, map: &GeometricMapping2d) -> Self {
        let shape = map.shape;
        let qp = &map.quadrature.points;
        let (bfunc, dphi_dr, dphi_ds) =
            shape_functions(shape, degree, qp.column(0), qp.column(1));
        let ng = map.quadrature.num_points();
        let ndofs = bfunc.ncols();
        let mut bgrad = Array3::<f64>::zeros((ng, ndofs, 2));
        for ig in 0..ng {
            let jinv_t = &map.jacob_inv_t[ig];
            for idof in 0..ndofs {
                let dr = dphi_dr[(ig, idof)];
                let ds = dphi_ds[(ig, idof)];
                bgrad[(ig, idof, 0)] = jinv_t[0] * dr + jinv_t[1] * ds;
                bgrad[(ig, idof, 1)] = jinv_t[2] * dr + jinv_t[3] * ds;
            }
        }
        Self {
            degree,
            shape,
            ref_nodes: reference_nodes(shape, degree),
            bfunc,
            bgrad,
        }
    }
    pub fn num_dofs(&self) -> usize {
        self.bfunc.ncols()
    }
    pub fn face_basis(&self, local_face: usize, reversed: bool, t: ArrayView1<f64>) -> Array2<f64> {
        let points = face_reference_points(self.shape, local_face, reversed, t);
        let (phi, _, _) = shape_functions(self.shape, self.degree, points.column(0), points.column(1));
        phi
    }
    pub fn reference_nodes(&self) -> ArrayView2<'_, f64> {
        self.ref_nodes.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array1;

    #[test]
    fn test_kronecker_delta() {
        for shape in [ReferenceShape::Triangle, ReferenceShape::Square] {
            for n in 0..=2 {
                let nodes = reference_nodes(shape, n);
                let (phi, _, _) = shape_functions(shape, n, nodes.column(0), nodes.column(1));
                for i in 0..nodes.nrows() {
                    for j in 0..nodes.nrows() {
                        let expected = if i == j { 1.0 } else { 0.0 };
                        assert_relative_eq!(phi[(i, j)], expected, epsilon = 1e-14);
                    }
                }
            }
        }
    }

    #[test]
    fn test_partition_of_unity_and_zero_gradient_sum() {
        let r = Array1::from(vec![0.1, 0.25, 0.3, 0.05]);
        let s = Array1::from(vec![0.2, 0.25, 0.6, 0.9]);
        for shape in [ReferenceShape::Triangle, ReferenceShape::Square] {
            for n in 0..=2 {
                let (phi, dr, ds) = shape_functions(shape, n, r.view(), s.view());
                for pt in 0..r.len() {
                    assert_relative_eq!(phi.row(pt).sum(), 1.0, epsilon = 1e-13);
                    assert_relative_eq!(dr.row(pt).sum(), 0.0, epsilon = 1e-13);
                    assert_relative_eq!(ds.row(pt).sum(), 0.0, epsilon = 1e-13);
                }
            }
        }
    }

    #[test]
    fn test_gradient_consistency() {
        let eps = 1e-7;
        let r = Array1::from(vec![0.3]);
        let s = Array1::from(vec![0.2]);
        let rp = Array1::from(vec![0.3 + eps]);
        let rm = Array1::from(vec![0.3 - eps]);
        let sp = Array1::from(vec![0.2 + eps]);
        let sm = Array1::from(vec![0.2 - eps]);
        for shape in [ReferenceShape::Triangle, ReferenceShape::Square] {
            let (_, dr, ds) = shape_functions(shape, 2, r.view(), s.view());
            let (phi_rp, _, _) = shape_functions(shape, 2, rp.view(), s.view());
            let (phi_rm, _, _) = shape_functions(shape, 2, rm.view(), s.view());
            let (phi_sp, _, _) = shape_functions(shape, 2, r.view(), sp.view());
            let (phi_sm, _, _) = shape_functions(shape, 2, r.view(), sm.view());
            for j in 0..dr.ncols() {
                let fd_dr = (phi_rp[(0, j)] - phi_rm[(0, j)]) / (2.0 * eps);
                let fd_ds = (phi_sp[(0, j)] - phi_sm[(0, j)]) / (2.0 * eps);
                assert_relative_eq!(dr[(0, j)], fd_dr, epsilon = 1e-6);
                assert_relative_eq!(ds[(0, j)], fd_ds, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_face_points_follow_orientation() {
        let t = Array1::from(vec![-1.0, 1.0]);
        let forward = face_reference_points(ReferenceShape::Triangle, 1, false, t.view());
        let backward = face_reference_points(ReferenceShape::Triangle, 1, true, t.view());
        // edge 1 of the triangle runs from (1,0) to (0,1)
        assert_relative_eq!(forward[(0, 0)], 1.0);
        assert_relative_eq!(forward[(1, 1)], 1.0);
        assert_relative_eq!(backward[(0, 1)], 1.0);
        assert_relative_eq!(backward[(1, 0)], 1.0);
    }
}
