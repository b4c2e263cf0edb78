use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::disc::{
    basis::lagrange::shape_functions,
    gauss_points::{QuadratureRule, ReferenceShape},
};

/// Unit normal to the right of the tangent `(dx, dy)`, together with the tangent length.
pub fn compute_normal(dx: f64, dy: f64) -> ([f64; 2], f64) {
    let speed = (dx * dx + dy * dy).sqrt();
    ([dy / speed, -dx / speed], speed)
}

/// Jacobian determinant and inverse-transpose Jacobian (row major) of a map
/// whose shape function derivatives at one point are `dn_dxi`, `dn_deta`.
pub fn evaluate_jacob(
    dn_dxi: ArrayView1<f64>,
    dn_deta: ArrayView1<f64>,
    x: ArrayView1<f64>,
    y: ArrayView1<f64>,
) -> (f64, [f64; 4]) {
    let mut dx_dxi = 0.0;
    let mut dx_deta = 0.0;
    let mut dy_dxi = 0.0;
    let mut dy_deta = 0.0;
    for k in 0..x.len() {
        dx_dxi += dn_dxi[k] * x[k];
        dx_deta += dn_deta[k] * x[k];
        dy_dxi += dn_dxi[k] * y[k];
        dy_deta += dn_deta[k] * y[k];
    }
    let jacob_det = dx_dxi * dy_deta - dx_deta * dy_dxi;
    let jacob_inv_t = [
        dy_deta / jacob_det,
        -dy_dxi / jacob_det,
        -dx_deta / jacob_det,
        dx_dxi / jacob_det,
    ];
    (jacob_det, jacob_inv_t)
}

/// Reference-to-physical map of one element, with its data cached at the
/// domain quadrature points.
#[derive(Clone, Debug)]
pub struct GeometricMapping2d {
    pub degree: usize,
    pub shape: ReferenceShape,
    /// (nodes × 2)
    pub phys_nodes: Array2<f64>,
    pub quadrature: QuadratureRule,
    pub jacob_det: Array1<f64>,
    pub jacob_inv_t: Vec<[f64; 4]>,
    /// Physical coordinates of the quadrature points, (points × 2).
    pub quad_points: Array2<f64>,
}
impl GeometricMapping2d {
    pub fn new(degree: usize, phys_nodes: Array2<f64>, quadrature: &QuadratureRule) -> Self {
        let shape = quadrature.shape;
        let qp = &quadrature.points;
        let (n, dn_dr, dn_ds) = shape_functions(shape, degree, qp.column(0), qp.column(1));
        let ng = quadrature.num_points();
        let x = phys_nodes.column(0);
        let y = phys_nodes.column(1);
        let mut jacob_det = Array1::<f64>::zeros(ng);
        let mut jacob_inv_t = Vec::with_capacity(ng);
        for ig in 0..ng {
            let (det, inv_t) = evaluate_jacob(dn_dr.row(ig), dn_ds.row(ig), x, y);
            jacob_det[ig] = det;
            jacob_inv_t.push(inv_t);
        }
        let quad_points = n.dot(&phys_nodes);
        Self {
            degree,
            shape,
            phys_nodes,
            quadrature: quadrature.clone(),
            jacob_det,
            jacob_inv_t,
            quad_points,
        }
    }
    pub fn min_jacob_det(&self) -> f64 {
        self.jacob_det.iter().copied().fold(f64::INFINITY, f64::min)
    }
    /// Physical coordinates of arbitrary reference points, (points × 2).
    pub fn map_points(&self, ref_points: ArrayView2<f64>) -> Array2<f64> {
        let (n, _, _) = shape_functions(
            self.shape,
            self.degree,
            ref_points.column(0),
            ref_points.column(1),
        );
        n.dot(&self.phys_nodes)
    }
    /// `|J| w` at every quadrature point.
    pub fn jacob_weights(&self) -> Array1<f64> {
        &self.jacob_det * &self.quadrature.weights
    }
    pub fn area(&self) -> f64 {
        self.jacob_weights().sum()
    }
}

/// Map of one face. Face nodes are `-1`, `+1` and, for quadratic faces, `0`.
#[derive(Clone, Debug)]
pub struct GeometricMapping1d {
    pub degree: usize,
    pub phys_nodes: Array2<f64>,
    pub quadrature: QuadratureRule,
    /// Length element `|dx/dt|` at each quadrature point.
    pub speed: Array1<f64>,
    /// Unit normal pointing out of the element that sees the face nodes counter-clockwise.
    pub normals: Vec<[f64; 2]>,
    pub quad_points: Array2<f64>,
}
impl GeometricMapping1d {
    pub fn new(degree: usize, phys_nodes: Array2<f64>, quadrature: &QuadratureRule) -> Self {
        let t = quadrature.points.column(0);
        let (n, dn_dt, _) = shape_functions(ReferenceShape::Line, degree, t, t);
        let ng = quadrature.num_points();
        let tangents = dn_dt.dot(&phys_nodes);
        let mut speed = Array1::<f64>::zeros(ng);
        let mut normals = Vec::with_capacity(ng);
        for ig in 0..ng {
            let (normal, sp) = compute_normal(tangents[(ig, 0)], tangents[(ig, 1)]);
            speed[ig] = sp;
            normals.push(normal);
        }
        let quad_points = n.dot(&phys_nodes);
        Self {
            degree,
            phys_nodes,
            quadrature: quadrature.clone(),
            speed,
            normals,
            quad_points,
        }
    }
    pub fn length(&self) -> f64 {
        self.speed.dot(&self.quadrature.weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_affine_triangle_jacobian() {
        let quad = QuadratureRule::new(ReferenceShape::Triangle, 2);
        let nodes = array![[1.0, 1.0], [3.0, 1.0], [1.0, 2.0]];
        let map = GeometricMapping2d::new(1, nodes, &quad);
        for ig in 0..quad.num_points() {
            assert_relative_eq!(map.jacob_det[ig], 2.0, epsilon = 1e-14);
        }
        assert_relative_eq!(map.area(), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_quadratic_map_of_straight_quad_matches_bilinear() {
        let quad = QuadratureRule::new(ReferenceShape::Square, 4);
        let corners = array![[0.0, 0.0], [2.0, 0.0], [2.5, 1.0], [0.5, 1.5]];
        let mut nine = Array2::<f64>::zeros((9, 2));
        for i in 0..4 {
            nine.row_mut(i).assign(&corners.row(i));
            let j = (i + 1) % 4;
            nine.row_mut(4 + i)
                .assign(&((&corners.row(i) + &corners.row(j)) * 0.5));
        }
        nine.row_mut(8).assign(&corners.mean_axis(ndarray::Axis(0)).unwrap());
        let bilinear = GeometricMapping2d::new(1, corners, &quad);
        let quadratic = GeometricMapping2d::new(2, nine, &quad);
        for ig in 0..quad.num_points() {
            assert_relative_eq!(bilinear.jacob_det[ig], quadratic.jacob_det[ig], epsilon = 1e-12);
            assert_relative_eq!(
                bilinear.quad_points[(ig, 0)],
                quadratic.quad_points[(ig, 0)],
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_inverted_element_has_negative_jacobian() {
        let quad = QuadratureRule::new(ReferenceShape::Triangle, 1);
        let nodes = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0]];
        let map = GeometricMapping2d::new(1, nodes, &quad);
        assert!(map.min_jacob_det() < 0.0);
    }

    #[test]
    fn test_face_normal_and_speed() {
        let quad = QuadratureRule::new(ReferenceShape::Line, 2);
        // bottom edge of a counter-clockwise element, outward normal is -y
        let map = GeometricMapping1d::new(1, array![[0.0, 0.0], [3.0, 0.0]], &quad);
        for ig in 0..quad.num_points() {
            assert_relative_eq!(map.speed[ig], 1.5, epsilon = 1e-14);
            assert_relative_eq!(map.normals[ig][0], 0.0, epsilon = 1e-14);
            assert_relative_eq!(map.normals[ig][1], -1.0, epsilon = 1e-14);
        }
        assert_relative_eq!(map.length(), 3.0, epsilon = 1e-14);
    }

    #[test]
    fn test_map_points_sends_vertices_to_nodes() {
        let quad = QuadratureRule::new(ReferenceShape::Square, 2);
        let nodes = array![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let map = GeometricMapping2d::new(1, nodes.clone(), &quad);
        let refs = array![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
        let phys = map.map_points(refs.view());
        for i in 0..4 {
            assert_relative_eq!(phys[(i, 0)], nodes[(i, 0)], epsilon = 1e-14);
            assert_relative_eq!(phys[(i, 1)], nodes[(i, 1)], epsilon = 1e-14);
        }
    }
}
