use ndarray::{Array1, Array2, Array3, ArrayView2};
use serde::Deserialize;

use crate::{
    disc::{
        gauss_points::ReferenceShape,
        geometric::{GeometricMapping1d, GeometricMapping2d},
    },
    error::{Error, Result},
};

pub mod lagrange;
pub mod taylor;

use lagrange::LagrangeElement;
use taylor::TaylorElement;

/// Basis family, fixed for the lifetime of a discretization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasisType {
    /// Nodal basis, DOFs are point values.
    Lagrange,
    /// Modal basis, DOFs are scaled derivatives at the centroid.
    Taylor,
}

#[derive(Clone, Debug)]
pub enum Element {
    Lagrange(LagrangeElement),
    Taylor(TaylorElement),
    /// Zero-DOF stand-in for the exterior of a boundary face.
    Dummy(DummyElement),
}

#[derive(Clone, Debug)]
pub struct DummyElement {
    pub bfunc: Array2<f64>,
    pub bgrad: Array3<f64>,
}

impl Element {
    pub fn dummy() -> Self {
        Element::Dummy(DummyElement {
            bfunc: Array2::zeros((0, 0)),
            bgrad: Array3::zeros((0, 0, 2)),
        })
    }
    pub fn new(basis_type: BasisType, degree: usize, map: &GeometricMapping2d) -> Result<Self> {
        match basis_type {
            BasisType::Lagrange => {
                if degree > LagrangeElement::MAX_DEGREE {
                    return Err(Error::UnsupportedDegree {
                        basis: basis_type,
                        degree,
                    });
                }
                Ok(Element::Lagrange(LagrangeElement::new(degree, map)))
            }
            BasisType::Taylor => {
                if degree > TaylorElement::MAX_DEGREE {
                    return Err(Error::UnsupportedDegree {
                        basis: basis_type,
                        degree,
                    });
                }
                Ok(Element::Taylor(TaylorElement::new(degree, map)))
            }
        }
    }
    pub fn degree(&self) -> usize {
        match self {
            Element::Lagrange(e) => e.degree,
            Element::Taylor(e) => e.degree,
            Element::Dummy(_) => 0,
        }
    }
    pub fn num_dofs(&self) -> usize {
        match self {
            Element::Lagrange(e) => e.num_dofs(),
            Element::Taylor(e) => e.num_dofs(),
            Element::Dummy(_) => 0,
        }
    }
    /// Basis values at the domain quadrature points, (points × DOFs).
    pub fn basis_values(&self) -> ArrayView2<'_, f64> {
        match self {
            Element::Lagrange(e) => e.bfunc.view(),
            Element::Taylor(e) => e.bfunc.view(),
            Element::Dummy(e) => e.bfunc.view(),
        }
    }
    /// Physical basis gradients at the domain quadrature points, (points × DOFs × 2).
    pub fn basis_grads(&self) -> &Array3<f64> {
        match self {
            Element::Lagrange(e) => &e.bgrad,
            Element::Taylor(e) => &e.bgrad,
            Element::Dummy(e) => &e.bgrad,
        }
    }
    /// Values of every variable at the domain quadrature points. `u` is
    /// (variables × DOFs), the result is (points × variables).
    pub fn interpolate_all(&self, u: ArrayView2<f64>) -> Array2<f64> {
        self.basis_values().dot(&u.t())
    }
    pub fn interpolate_component(&self, comp: usize, u: ArrayView2<f64>) -> Array1<f64> {
        self.basis_values().dot(&u.row(comp))
    }
    /// Basis restricted to the quadrature points of a face, (face points × DOFs).
    pub fn face_basis(&self, local_face: usize, reversed: bool, map1d: &GeometricMapping1d) -> Array2<f64> {
        let ng = map1d.quadrature.num_points();
        match self {
            Element::Lagrange(e) => {
                e.face_basis(local_face, reversed, map1d.quadrature.points.column(0))
            }
            Element::Taylor(e) => e.basis_at(map1d.quad_points.view()),
            Element::Dummy(_) => Array2::zeros((ng, 0)),
        }
    }
}

/// Reference shape of an element with `nnode` geometric nodes.
pub fn shape_from_node_count(nnode: usize) -> ReferenceShape {
    match nnode {
        4 | 9 | 16 => ReferenceShape::Square,
        _ => ReferenceShape::Triangle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disc::gauss_points::QuadratureRule;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn tri_map(degree: usize) -> GeometricMapping2d {
        let quad = QuadratureRule::new(ReferenceShape::Triangle, 2 * degree.max(1));
        GeometricMapping2d::new(1, array![[0.0, 0.0], [2.0, 0.0], [0.0, 1.0]], &quad)
    }

    #[test]
    fn test_dof_counts() {
        for (degree, ndofs) in [(0, 1), (1, 3), (2, 6)] {
            let map = tri_map(degree);
            let lagrange = Element::new(BasisType::Lagrange, degree, &map).unwrap();
            let taylor = Element::new(BasisType::Taylor, degree, &map).unwrap();
            assert_eq!(lagrange.num_dofs(), ndofs);
            assert_eq!(taylor.num_dofs(), ndofs);
        }
        assert_eq!(Element::dummy().num_dofs(), 0);
    }

    #[test]
    fn test_unsupported_degree() {
        let map = tri_map(3);
        assert!(matches!(
            Element::new(BasisType::Lagrange, 3, &map),
            Err(Error::UnsupportedDegree { degree: 3, .. })
        ));
    }

    #[test]
    fn test_linear_field_has_constant_gradient() {
        // u = 3x - 2y through the nodal values of a P1 element
        let map = tri_map(1);
        let elem = Element::new(BasisType::Lagrange, 1, &map).unwrap();
        let u = array![[0.0, 6.0, -2.0]];
        let grads = elem.basis_grads();
        for ig in 0..map.quadrature.num_points() {
            let mut gx = 0.0;
            let mut gy = 0.0;
            for idof in 0..3 {
                gx += u[(0, idof)] * grads[(ig, idof, 0)];
                gy += u[(0, idof)] * grads[(ig, idof, 1)];
            }
            assert_relative_eq!(gx, 3.0, epsilon = 1e-13);
            assert_relative_eq!(gy, -2.0, epsilon = 1e-13);
        }
        let values = elem.interpolate_component(0, u.view());
        for ig in 0..values.len() {
            let p = map.quad_points.row(ig);
            assert_relative_eq!(values[ig], 3.0 * p[0] - 2.0 * p[1], epsilon = 1e-13);
        }
    }
}
