use ndarray::{Array2, ArrayView2};

use crate::disc::{basis::Element, geometric::GeometricMapping1d};

/// One side of a face: the element, the face's index among that element's
/// local faces, and whether the element walks the face against its node order.
#[derive(Clone, Copy, Debug)]
pub struct FaceSide {
    pub ielem: usize,
    pub local_face: usize,
    pub reversed: bool,
}

/// Basis tables of both neighbours restricted to a face's quadrature points.
/// Boundary faces have no right side and an empty (points × 0) right table.
#[derive(Clone, Debug)]
pub struct FaceElement {
    pub left: FaceSide,
    pub right: Option<FaceSide>,
    pub left_basis: Array2<f64>,
    pub right_basis: Array2<f64>,
}
impl FaceElement {
    pub fn new(
        left_elem: &Element,
        right_elem: &Element,
        map1d: &GeometricMapping1d,
        left: FaceSide,
        right: Option<FaceSide>,
    ) -> Self {
        let left_basis = left_elem.face_basis(left.local_face, left.reversed, map1d);
        let right_basis = match right {
            Some(side) => right_elem.face_basis(side.local_face, side.reversed, map1d),
            None => Array2::zeros((map1d.quadrature.num_points(), right_elem.num_dofs())),
        };
        Self {
            left,
            right,
            left_basis,
            right_basis,
        }
    }
    pub fn is_boundary(&self) -> bool {
        self.right.is_none()
    }
    pub fn left_basis(&self) -> ArrayView2<'_, f64> {
        self.left_basis.view()
    }
    pub fn right_basis(&self) -> ArrayView2<'_, f64> {
        self.right_basis.view()
    }
    /// Left trace of every variable, (face points × variables).
    pub fn interpolate_all_left(&self, u: ArrayView2<f64>) -> Array2<f64> {
        self.left_basis.dot(&u.t())
    }
    /// Right trace of every variable, (face points × variables).
    pub fn interpolate_all_right(&self, u: ArrayView2<f64>) -> Array2<f64> {
        self.right_basis.dot(&u.t())
    }
}
