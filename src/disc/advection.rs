use log::info;
use ndarray::{ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Zip};

use crate::{
    disc::{
        boundary::{BoundaryFlags, BoundaryKind},
        flux::FluxPolicy,
    },
    error::{Error, Result},
};

/// Constant-velocity advection `u_t + a . grad(u) = 0`, applied to every variable.
#[derive(Clone, Debug)]
pub struct LinearAdvection {
    pub velocity: [f64; 2],
    pub boundary_value: f64,
    pub flags: BoundaryFlags,
    pub nvars: usize,
}
impl LinearAdvection {
    pub fn new(velocity: &[f64], boundary_value: f64, flags: BoundaryFlags, nvars: usize) -> Result<Self> {
        let velocity: [f64; 2] = velocity
            .try_into()
            .map_err(|_| Error::VelocityDimension { found: velocity.len() })?;
        if nvars == 0 {
            return Err(Error::NoVariables);
        }
        info!("advection velocity: ({}, {})", velocity[0], velocity[1]);
        Ok(Self {
            velocity,
            boundary_value,
            flags,
            nvars,
        })
    }
    fn a_dot_n(&self, normal: [f64; 2]) -> f64 {
        self.velocity[0] * normal[0] + self.velocity[1] * normal[1]
    }
}

impl FluxPolicy for LinearAdvection {
    fn nvars(&self) -> usize {
        self.nvars
    }
    fn validate_boundary_tag(&self, iface: usize, tag: i32) -> Result<()> {
        match self.flags.classify(tag) {
            Some(_) => Ok(()),
            None => Err(Error::UnknownBoundaryTag { iface, tag }),
        }
    }
    fn compute_boundary_state(
        &self,
        iface: usize,
        tag: i32,
        normals: &[[f64; 2]],
        instate: ArrayView2<f64>,
        mut bstate: ArrayViewMut2<f64>,
    ) -> Result<()> {
        match self.flags.classify(tag) {
            Some(BoundaryKind::Extrapolation) => bstate.assign(&instate),
            Some(BoundaryKind::InOutFlow) => {
                for (ig, normal) in normals.iter().enumerate() {
                    if self.a_dot_n(*normal) >= 0.0 {
                        bstate.row_mut(ig).assign(&instate.row(ig));
                    } else {
                        bstate[(ig, 0)] = self.boundary_value;
                    }
                }
            }
            None => return Err(Error::UnknownBoundaryTag { iface, tag }),
        }
        Ok(())
    }
    fn compute_numerical_flux(
        &self,
        ul: ArrayView1<f64>,
        ur: ArrayView1<f64>,
        normal: [f64; 2],
        mut flux: ArrayViewMut1<f64>,
    ) {
        let adotn = self.a_dot_n(normal);
        let upwind = if adotn >= 0.0 { ul.reborrow() } else { ur.reborrow() };
        Zip::from(&mut flux).and(&upwind).for_each(|f, &u| *f = adotn * u);
    }
    fn compute_physical_flux(&self, u: ArrayView1<f64>, mut fx: ArrayViewMut1<f64>, mut fy: ArrayViewMut1<f64>) {
        Zip::from(&mut fx)
            .and(&mut fy)
            .and(&u)
            .for_each(|fx, fy, &u| {
                *fx = self.velocity[0] * u;
                *fy = self.velocity[1] * u;
            });
    }
    fn max_normal_speed(&self, normal: [f64; 2]) -> f64 {
        self.a_dot_n(normal).abs()
    }
}
