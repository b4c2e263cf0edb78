use crate::{
    disc::{
        advection::LinearAdvection,
        boundary::BoundaryFlags,
        mesh::mesh2d::Mesh2d,
        spatial::SpatialDisc,
    },
    error::Result,
    io::param_parser::{MeshShape, SolverParamParser},
};

pub fn initialize_params_by_file(file_path: &str) -> Result<SolverParamParser> {
    SolverParamParser::parse(file_path)
}
/// Structured mesh on the configured rectangle. Faces on the left and bottom
/// sides carry the in/outflow flag, the rest the extrapolation flag.
pub fn initialize_mesh(params: &SolverParamParser) -> Result<Mesh2d> {
    let mesh_params = &params.mesh;
    let [x0, _] = mesh_params.x_range;
    let [y0, _] = mesh_params.y_range;
    let hx = (mesh_params.x_range[1] - x0) / mesh_params.nx as f64;
    let hy = (mesh_params.y_range[1] - y0) / mesh_params.ny as f64;
    let (inoutflow, extrapolation) = (params.inoutflow_flag, params.extrapolation_flag);
    let tag_fn = move |x: f64, y: f64| {
        if x - x0 < 0.25 * hx || y - y0 < 0.25 * hy {
            inoutflow
        } else {
            extrapolation
        }
    };
    match mesh_params.shape {
        MeshShape::Quadrilateral => Mesh2d::create_rect_quad_mesh(
            mesh_params.nx,
            mesh_params.ny,
            mesh_params.x_range,
            mesh_params.y_range,
            tag_fn,
        ),
        MeshShape::Triangle => Mesh2d::create_rect_tri_mesh(
            mesh_params.nx,
            mesh_params.ny,
            mesh_params.x_range,
            mesh_params.y_range,
            tag_fn,
        ),
    }
}
pub fn initialize_disc<'a>(
    mesh: &'a Mesh2d,
    params: &SolverParamParser,
) -> Result<SpatialDisc<'a, LinearAdvection>> {
    let flags = BoundaryFlags {
        inoutflow: params.inoutflow_flag,
        extrapolation: params.extrapolation_flag,
    };
    let policy = LinearAdvection::new(&params.velocity, params.boundary_value, flags, params.nvars)?;
    SpatialDisc::new(mesh, params.polynomial_order, params.basis, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{disc::basis::BasisType, error::Error};

    fn params(shape: &str) -> SolverParamParser {
        let json = format!(
            r#"{{
                "polynomial_order": 1,
                "basis": "lagrange",
                "velocity": [1.0, 1.0],
                "mesh": {{"shape": "{shape}", "nx": 3, "ny": 2, "x_range": [0.0, 3.0], "y_range": [-1.0, 1.0]}},
                "output_file": "out.csv"
            }}"#
        );
        SolverParamParser::from_json(&json).unwrap()
    }

    #[test]
    fn test_boundary_flags_by_side() {
        let params = params("quadrilateral");
        let mesh = initialize_mesh(&params).unwrap();
        let count = |tag| {
            mesh.edges[..mesh.boundary_face_num()]
                .iter()
                .filter(|e| e.tag == Some(tag))
                .count()
        };
        // left side has 2 faces, bottom side 3
        assert_eq!(count(1), 5);
        assert_eq!(count(2), 5);
    }

    #[test]
    fn test_disc_from_params() {
        let params = params("triangle");
        let mesh = initialize_mesh(&params).unwrap();
        let disc = initialize_disc(&mesh, &params).unwrap();
        assert_eq!(disc.basis_type, BasisType::Lagrange);
        assert_eq!(disc.num_total_dofs(), 12 * 3);
    }

    #[test]
    fn test_zero_variables_in_params_rejected() {
        let mut params = params("quadrilateral");
        params.nvars = 0;
        let mesh = initialize_mesh(&params).unwrap();
        assert!(matches!(initialize_disc(&mesh, &params), Err(Error::NoVariables)));
    }
}
