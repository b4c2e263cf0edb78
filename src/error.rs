//! Error types for the spatial discretization.

use thiserror::Error;

use crate::disc::basis::BasisType;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Non-positive Jacobian determinant somewhere in an element.
    #[error("element {ielem} is degenerate or inverted (jacobian determinant {jacobian:e})")]
    DegenerateElement { ielem: usize, jacobian: f64 },

    #[error("mass matrix of element {ielem} is singular")]
    SingularMassMatrix { ielem: usize },

    /// An operation that only makes sense for one basis family was called on the other.
    #[error("{operation} requires a {expected:?} basis, but the discretization uses {found:?}")]
    BasisMismatch {
        operation: &'static str,
        expected: BasisType,
        found: BasisType,
    },

    #[error("{basis:?} elements of degree {degree} are not supported")]
    UnsupportedDegree { basis: BasisType, degree: usize },

    #[error("advection velocity must have 2 components, got {found}")]
    VelocityDimension { found: usize },

    #[error("component {comp} out of range for {nvars} physical variables")]
    ComponentOutOfRange { comp: usize, nvars: usize },

    #[error("face {iface} out of range for {nface} faces")]
    FaceOutOfRange { iface: usize, nface: usize },

    #[error("boundary face {iface} carries unknown boundary tag {tag}")]
    UnknownBoundaryTag { iface: usize, tag: i32 },

    #[error("initial condition needs {expected} functions, got {found}")]
    MissingInitialData { expected: usize, found: usize },

    /// Per-element storage handed in by the caller does not match the mesh.
    #[error("expected storage for {expected} elements, got {found}")]
    StorageMismatch { expected: usize, found: usize },

    #[error("element {ielem} storage is {found:?}, expected (variables, DOFs) = {expected:?}")]
    ElementStorageShape {
        ielem: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("at least one physical variable is required")]
    NoVariables,

    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse parameters: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
}
