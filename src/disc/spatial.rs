use faer::linalg::solvers::DenseSolveCore;
use faer_ext::{IntoFaer, IntoNdarray};
use log::{debug, info, warn};
use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::{
    disc::{
        basis::{BasisType, Element, shape_from_node_count, taylor::TaylorElement},
        face::{FaceElement, FaceSide},
        flux::FluxPolicy,
        gauss_points::{QuadratureRule, ReferenceShape, quadrature_degree},
        geometric::{GeometricMapping1d, GeometricMapping2d},
        mesh::mesh2d::Mesh2d,
    },
    error::{Error, Result},
};

/// Gram matrix `sum_g phi_i phi_j |J| w` of an element's basis.
pub fn mass_matrix(elem: &Element, map: &GeometricMapping2d) -> Array2<f64> {
    let bfunc = elem.basis_values();
    let jw = map.jacob_weights();
    let weighted = &bfunc * &jw.view().insert_axis(Axis(1));
    bfunc.t().dot(&weighted)
}

/// Discontinuous Galerkin discretization in space of a conservation law
/// described by `F`, on a static mesh.
///
/// The residual is assembled so that the semi-discrete system reads
/// `M du/dt = -res`.
pub struct SpatialDisc<'a, F: FluxPolicy> {
    pub mesh: &'a Mesh2d,
    pub p_degree: usize,
    pub basis_type: BasisType,
    pub policy: F,
    pub tri_quad: QuadratureRule,
    pub square_quad: QuadratureRule,
    pub line_quad: QuadratureRule,
    pub map2d: Vec<GeometricMapping2d>,
    pub map1d: Vec<GeometricMapping1d>,
    pub elems: Vec<Element>,
    pub dummy: Element,
    pub faces: Vec<FaceElement>,
    minv: Vec<Array2<f64>>,
    mets: Vec<f64>,
    boundary_tags: Vec<i32>,
    // scratch, rebuilt on every residual evaluation
    left_face_terms: Vec<Array2<f64>>,
    right_face_terms: Vec<Array2<f64>>,
    ntotaldofs: usize,
}

impl<'a, F: FluxPolicy> SpatialDisc<'a, F> {
    pub fn new(mesh: &'a Mesh2d, p_degree: usize, basis_type: BasisType, policy: F) -> Result<Self> {
        let mut boundary_tags = Vec::with_capacity(mesh.boundary_face_num());
        for iface in 0..mesh.boundary_face_num() {
            let tag = mesh.edges[iface]
                .tag
                .ok_or_else(|| Error::InvalidMesh(format!("boundary face {iface} has no tag")))?;
            policy.validate_boundary_tag(iface, tag)?;
            boundary_tags.push(tag);
        }
        let qdeg = quadrature_degree(p_degree);
        let tri_quad = QuadratureRule::new(ReferenceShape::Triangle, qdeg);
        let square_quad = QuadratureRule::new(ReferenceShape::Square, qdeg);
        let line_quad = QuadratureRule::new(ReferenceShape::Line, qdeg);
        info!(
            "domain quadrature strength {qdeg}: {} points on triangles, {} on quadrilaterals",
            tri_quad.num_points(),
            square_quad.num_points()
        );
        info!(
            "boundary quadrature strength {qdeg}: {} points",
            line_quad.num_points()
        );
        let mut disc = Self {
            mesh,
            p_degree,
            basis_type,
            policy,
            tri_quad,
            square_quad,
            line_quad,
            map2d: Vec::new(),
            map1d: Vec::new(),
            elems: Vec::new(),
            dummy: Element::dummy(),
            faces: Vec::new(),
            minv: Vec::new(),
            mets: Vec::new(),
            boundary_tags,
            left_face_terms: Vec::new(),
            right_face_terms: Vec::new(),
            ntotaldofs: 0,
        };
        disc.compute_fe_data()?;
        Ok(disc)
    }
    /// Builds mappings, elements and inverse mass matrices of every element,
    /// then the face elements, boundary faces first.
    pub fn compute_fe_data(&mut self) -> Result<()> {
        let mesh = self.mesh;
        let nvars = self.policy.nvars();
        self.map2d = Vec::with_capacity(mesh.elem_num);
        self.elems = Vec::with_capacity(mesh.elem_num);
        self.minv = Vec::with_capacity(mesh.elem_num);
        self.ntotaldofs = 0;
        for ielem in 0..mesh.elem_num {
            let coords = mesh.element_coords(ielem);
            let quadrature = match shape_from_node_count(coords.nrows()) {
                ReferenceShape::Square => &self.square_quad,
                _ => &self.tri_quad,
            };
            let map = GeometricMapping2d::new(mesh.degree, coords, quadrature);
            let min_det = map.min_jacob_det();
            if min_det.is_nan() || min_det <= 0.0 {
                return Err(Error::DegenerateElement {
                    ielem,
                    jacobian: min_det,
                });
            }
            let elem = Element::new(self.basis_type, self.p_degree, &map)?;
            let minv = Self::invert_mass_matrix(ielem, &elem, &map)?;
            self.ntotaldofs += elem.num_dofs();
            self.map2d.push(map);
            self.elems.push(elem);
            self.minv.push(minv);
        }

        self.map1d = Vec::with_capacity(mesh.face_num());
        self.faces = Vec::with_capacity(mesh.face_num());
        self.left_face_terms = Vec::with_capacity(mesh.face_num());
        self.right_face_terms = Vec::with_capacity(mesh.face_num());
        for iface in 0..mesh.face_num() {
            let edge = &mesh.edges[iface];
            let map = GeometricMapping1d::new(mesh.degree, mesh.face_coords(iface), &self.line_quad);
            let side = |k: usize| {
                let ielem = edge.parents[k];
                let local_face = edge.local_ids[k];
                FaceSide {
                    ielem,
                    local_face,
                    reversed: mesh.elements[ielem].inodes[local_face] != edge.inodes[0],
                }
            };
            let left = side(0);
            let right = edge.right().map(|_| side(1));
            let right_elem = match right {
                Some(s) => &self.elems[s.ielem],
                None => &self.dummy,
            };
            let face = FaceElement::new(&self.elems[left.ielem], right_elem, &map, left, right);
            self.left_face_terms
                .push(Array2::zeros((nvars, face.left_basis.ncols())));
            self.right_face_terms
                .push(Array2::zeros((nvars, face.right_basis.ncols())));
            self.map1d.push(map);
            self.faces.push(face);
        }
        info!(
            "{} elements, {} faces ({} boundary), degree {} {:?}, {} DOFs per variable",
            mesh.elem_num,
            mesh.face_num(),
            mesh.boundary_face_num(),
            self.p_degree,
            self.basis_type,
            self.ntotaldofs
        );
        self.mets = self.compute_max_time_steps();
        Ok(())
    }
    fn invert_mass_matrix(ielem: usize, elem: &Element, map: &GeometricMapping2d) -> Result<Array2<f64>> {
        let mass = mass_matrix(elem, map);
        let mass_inv = mass.view().into_faer().partial_piv_lu().inverse();
        let minv = mass_inv.as_ref().into_ndarray().to_owned();
        if minv.iter().any(|v| !v.is_finite()) {
            return Err(Error::SingularMassMatrix { ielem });
        }
        Ok(minv)
    }
    /// `area / sum_faces int max_normal_speed`, infinite where nothing moves.
    fn compute_max_time_steps(&self) -> Vec<f64> {
        let face_speeds: Vec<f64> = self
            .map1d
            .iter()
            .map(|map| {
                map.normals
                    .iter()
                    .zip(map.speed.iter())
                    .zip(map.quadrature.weights.iter())
                    .map(|((&n, sp), w)| self.policy.max_normal_speed(n) * sp * w)
                    .sum()
            })
            .collect();
        self.mesh
            .elements
            .iter()
            .zip(self.map2d.iter())
            .map(|(element, map)| {
                let flow: f64 = element.iedges.iter().map(|&iface| face_speeds[iface]).sum();
                if flow > 0.0 { map.area() / flow } else { f64::INFINITY }
            })
            .collect()
    }
    /// Sizes per-element unknowns and residuals as (variables × DOFs) and
    /// hands out the time-step bounds.
    pub fn spatial_setup(&self, u: &mut Vec<Array2<f64>>, res: &mut Vec<Array2<f64>>, mets: &mut Vec<f64>) {
        let nvars = self.policy.nvars();
        *u = self
            .elems
            .iter()
            .map(|elem| Array2::zeros((nvars, elem.num_dofs())))
            .collect();
        *res = u.clone();
        mets.clone_from(&self.mets);
    }
    /// Inverse mass matrix of every element.
    pub fn mass(&self) -> &[Array2<f64>] {
        &self.minv
    }
    pub fn max_explicit_time_step(&self) -> &[f64] {
        &self.mets
    }
    /// DOFs of one variable summed over all elements.
    pub fn num_total_dofs(&self) -> usize {
        self.ntotaldofs
    }
    /// Left and right flux terms of a face from the last residual evaluation.
    pub fn face_terms(&self, iface: usize) -> Result<(ArrayView2<'_, f64>, ArrayView2<'_, f64>)> {
        let nface = self.faces.len();
        if iface >= nface {
            return Err(Error::FaceOutOfRange { iface, nface });
        }
        Ok((
            self.left_face_terms[iface].view(),
            self.right_face_terms[iface].view(),
        ))
    }
    /// Per-element storage must hold one (variables × DOFs) block per element.
    fn check_storage(&self, storage: &[Array2<f64>]) -> Result<()> {
        if storage.len() != self.elems.len() {
            return Err(Error::StorageMismatch {
                expected: self.elems.len(),
                found: storage.len(),
            });
        }
        let nvars = self.policy.nvars();
        for (ielem, (block, elem)) in storage.iter().zip(self.elems.iter()).enumerate() {
            let expected = (nvars, elem.num_dofs());
            if block.dim() != expected {
                return Err(Error::ElementStorageShape {
                    ielem,
                    expected,
                    found: block.dim(),
                });
            }
        }
        Ok(())
    }
    fn check_component(&self, comp: usize) -> Result<()> {
        let nvars = self.policy.nvars();
        if comp >= nvars {
            return Err(Error::ComponentOutOfRange { comp, nvars });
        }
        Ok(())
    }

    /// Overwrites `res` with the spatial residual of `u`.
    pub fn update_residual(&mut self, u: &[Array2<f64>], res: &mut [Array2<f64>]) -> Result<()> {
        self.check_storage(u)?;
        self.check_storage(res)?;
        for r in res.iter_mut() {
            r.fill(0.0);
        }
        self.compute_face_terms(u)?;
        if self.p_degree > 0 {
            self.integrate_over_cells(u, res);
        }
        self.scatter_face_terms(res);
        Ok(())
    }
    fn compute_face_terms(&mut self, u: &[Array2<f64>]) -> Result<()> {
        let nvars = self.policy.nvars();
        for (iface, face) in self.faces.iter().enumerate() {
            let map = &self.map1d[iface];
            let ng = map.quadrature.num_points();
            let ul = face.interpolate_all_left(u[face.left.ielem].view());
            let ur = match face.right {
                Some(side) => face.interpolate_all_right(u[side.ielem].view()),
                None => {
                    let mut bstate = Array2::<f64>::zeros((ng, nvars));
                    self.policy.compute_boundary_state(
                        iface,
                        self.boundary_tags[iface],
                        &map.normals,
                        ul.view(),
                        bstate.view_mut(),
                    )?;
                    bstate
                }
            };
            let mut flux = Array2::<f64>::zeros((ng, nvars));
            for ig in 0..ng {
                self.policy.compute_numerical_flux(
                    ul.row(ig),
                    ur.row(ig),
                    map.normals[ig],
                    flux.row_mut(ig),
                );
            }
            let sw = &map.speed * &map.quadrature.weights;
            flux *= &sw.view().insert_axis(Axis(1));
            self.left_face_terms[iface] = flux.t().dot(&face.left_basis);
            self.right_face_terms[iface] = flux.t().dot(&face.right_basis);
        }
        Ok(())
    }
    fn integrate_over_cells(&self, u: &[Array2<f64>], res: &mut [Array2<f64>]) {
        let nvars = self.policy.nvars();
        let mut fx = Array1::<f64>::zeros(nvars);
        let mut fy = Array1::<f64>::zeros(nvars);
        for (ielem, elem) in self.elems.iter().enumerate() {
            let map = &self.map2d[ielem];
            let uq = elem.interpolate_all(u[ielem].view());
            let jw = map.jacob_weights();
            let grads = elem.basis_grads();
            let r = &mut res[ielem];
            for ig in 0..jw.len() {
                self.policy
                    .compute_physical_flux(uq.row(ig), fx.view_mut(), fy.view_mut());
                for ivar in 0..nvars {
                    for idof in 0..elem.num_dofs() {
                        r[(ivar, idof)] -= (fx[ivar] * grads[(ig, idof, 0)]
                            + fy[ivar] * grads[(ig, idof, 1)])
                            * jw[ig];
                    }
                }
            }
        }
    }
    fn scatter_face_terms(&self, res: &mut [Array2<f64>]) {
        for (ielem, element) in self.mesh.elements.iter().enumerate() {
            for &iface in element.iedges.iter() {
                if self.faces[iface].left.ielem == ielem {
                    res[ielem] += &self.left_face_terms[iface];
                } else {
                    res[ielem] -= &self.right_face_terms[iface];
                }
            }
        }
    }

    /// Subtracts `int f(x, y, t) phi |J| w` from variable 0 of the residual.
    pub fn add_source<G>(&self, source: G, time: f64, res: &mut [Array2<f64>]) -> Result<()>
    where
        G: Fn(f64, f64, f64) -> f64,
    {
        self.check_storage(res)?;
        for (ielem, elem) in self.elems.iter().enumerate() {
            let map = &self.map2d[ielem];
            let jw = map.jacob_weights();
            let fq = Array1::from_shape_fn(jw.len(), |ig| {
                let p = map.quad_points.row(ig);
                source(p[0], p[1], time) * jw[ig]
            });
            let contribution = elem.basis_values().t().dot(&fq);
            let mut row = res[ielem].row_mut(0);
            row -= &contribution;
        }
        Ok(())
    }

    /// Point values of `f` at the physical nodes of every element.
    pub fn set_initial_condition_nodal<G>(&self, comp: usize, f: G, u: &mut [Array2<f64>]) -> Result<()>
    where
        G: Fn(f64, f64) -> f64,
    {
        if self.basis_type != BasisType::Lagrange {
            warn!("nodal initial condition needs a Lagrange basis");
            return Err(Error::BasisMismatch {
                operation: "nodal initial condition",
                expected: BasisType::Lagrange,
                found: self.basis_type,
            });
        }
        self.check_component(comp)?;
        self.check_storage(u)?;
        for (ielem, elem) in self.elems.iter().enumerate() {
            if let Element::Lagrange(e) = elem {
                let nodes = self.map2d[ielem].map_points(e.reference_nodes());
                for (idof, p) in nodes.rows().into_iter().enumerate() {
                    u[ielem][(comp, idof)] = f(p[0], p[1]);
                }
            }
        }
        Ok(())
    }
    /// Taylor coefficients from the value and derivatives of a function at
    /// each centroid, ordered `f, f_x, f_y, f_xx, f_yy, f_xy` and truncated to
    /// the number of modes.
    pub fn set_initial_condition_modal(
        &self,
        comp: usize,
        funcs: &[&dyn Fn(f64, f64) -> f64],
        u: &mut [Array2<f64>],
    ) -> Result<()> {
        if self.basis_type != BasisType::Taylor {
            warn!("modal initial condition needs a Taylor basis");
            return Err(Error::BasisMismatch {
                operation: "modal initial condition",
                expected: BasisType::Taylor,
                found: self.basis_type,
            });
        }
        let expected = TaylorElement::num_modes(self.p_degree);
        if funcs.len() < expected {
            return Err(Error::MissingInitialData {
                expected,
                found: funcs.len(),
            });
        }
        self.check_component(comp)?;
        self.check_storage(u)?;
        for (ielem, elem) in self.elems.iter().enumerate() {
            if let Element::Taylor(e) = elem {
                let [xc, yc] = e.center;
                let derivs: Vec<f64> = funcs[..expected].iter().map(|f| f(xc, yc)).collect();
                let mut padded = [0.0; 6];
                padded[..expected].copy_from_slice(&derivs);
                u[ielem].row_mut(comp).assign(&e.coefficients_from_derivatives(&padded));
            }
        }
        Ok(())
    }
    /// L2 projection of `f`, valid for either basis.
    pub fn set_initial_condition_projected<G>(&self, comp: usize, f: G, u: &mut [Array2<f64>]) -> Result<()>
    where
        G: Fn(f64, f64) -> f64,
    {
        self.check_component(comp)?;
        self.check_storage(u)?;
        for (ielem, elem) in self.elems.iter().enumerate() {
            let map = &self.map2d[ielem];
            let jw = map.jacob_weights();
            let fq = Array1::from_shape_fn(jw.len(), |ig| {
                let p = map.quad_points.row(ig);
                f(p[0], p[1]) * jw[ig]
            });
            let rhs = elem.basis_values().t().dot(&fq);
            u[ielem].row_mut(comp).assign(&self.minv[ielem].dot(&rhs));
        }
        Ok(())
    }

    pub fn compute_l2_error<G>(&self, exact: G, time: f64, u: &[Array2<f64>], comp: usize) -> Result<f64>
    where
        G: Fn(f64, f64, f64) -> f64,
    {
        self.check_component(comp)?;
        self.check_storage(u)?;
        let mut error = 0.0;
        for (ielem, elem) in self.elems.iter().enumerate() {
            let map = &self.map2d[ielem];
            let uq = elem.interpolate_component(comp, u[ielem].view());
            let jw = map.jacob_weights();
            for ig in 0..jw.len() {
                let p = map.quad_points.row(ig);
                let diff = uq[ig] - exact(p[0], p[1], time);
                error += diff * diff * jw[ig];
            }
        }
        debug!("squared l2 error of component {comp}: {error:e}");
        Ok(error.sqrt())
    }
    pub fn compute_l2_norm(&self, u: &[Array2<f64>], comp: usize) -> Result<f64> {
        self.compute_l2_error(|_, _, _| 0.0, 0.0, u, comp)
    }
    /// Variable 0 averaged to the mesh vertices from the corner DOFs of nodal
    /// elements or the cell averages of modal ones. Nodes that are no
    /// element's vertex stay zero.
    pub fn postprocess(&self, u: &[Array2<f64>]) -> Result<Array1<f64>> {
        self.check_storage(u)?;
        let mut output = Array1::<f64>::zeros(self.mesh.node_num);
        let mut surelems = vec![0usize; self.mesh.node_num];
        for (ielem, elem) in self.elems.iter().enumerate() {
            let element = &self.mesh.elements[ielem];
            let corner_dofs = matches!(elem, Element::Lagrange(_)) && elem.degree() > 0;
            for ino in 0..element.num_vertices() {
                let inode = element.inodes[ino];
                let idof = if corner_dofs { ino } else { 0 };
                output[inode] += u[ielem][(0, idof)];
                surelems[inode] += 1;
            }
        }
        for (value, &count) in output.iter_mut().zip(surelems.iter()) {
            if count > 0 {
                *value /= count as f64;
            }
        }
        Ok(output)
    }
}
