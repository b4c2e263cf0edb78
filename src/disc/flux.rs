use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};

use crate::error::Result;

/// PDE-specific pieces of the residual assembly.
pub trait FluxPolicy {
    fn nvars(&self) -> usize;
    /// Checked once per boundary face when the discretization is built.
    fn validate_boundary_tag(&self, iface: usize, tag: i32) -> Result<()>;
    /// Exterior trace of a boundary face. `normals` and the rows of
    /// `instate`/`bstate` follow the face quadrature points, columns are
    /// variables. `bstate` arrives zeroed.
    fn compute_boundary_state(
        &self,
        iface: usize,
        tag: i32,
        normals: &[[f64; 2]],
        instate: ArrayView2<f64>,
        bstate: ArrayViewMut2<f64>,
    ) -> Result<()>;
    /// Single-valued flux through a face with unit normal `normal`, pointing from `ul` to `ur`.
    fn compute_numerical_flux(
        &self,
        ul: ArrayView1<f64>,
        ur: ArrayView1<f64>,
        normal: [f64; 2],
        flux: ArrayViewMut1<f64>,
    );
    fn compute_physical_flux(&self, u: ArrayView1<f64>, fx: ArrayViewMut1<f64>, fy: ArrayViewMut1<f64>);
    /// Largest wave speed normal to a face, used for the explicit time-step bound.
    fn max_normal_speed(&self, normal: [f64; 2]) -> f64;
}
