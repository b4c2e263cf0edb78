use serde::Deserialize;
use std::fs;

use crate::{disc::basis::BasisType, error::Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshShape {
    Quadrilateral,
    Triangle,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MeshParamParser {
    pub shape: MeshShape,
    pub nx: usize,
    pub ny: usize,
    pub x_range: [f64; 2],
    pub y_range: [f64; 2],
}

#[derive(Clone, Debug, Deserialize)]
pub struct SolverParamParser {
    pub polynomial_order: usize,
    pub basis: BasisType,
    #[serde(default = "default_nvars")]
    pub nvars: usize,
    pub velocity: Vec<f64>,
    #[serde(default)]
    pub boundary_value: f64,
    #[serde(default = "default_inoutflow_flag")]
    pub inoutflow_flag: i32,
    #[serde(default = "default_extrapolation_flag")]
    pub extrapolation_flag: i32,
    pub mesh: MeshParamParser,
    pub output_file: String,
}
fn default_nvars() -> usize {
    1
}
fn default_inoutflow_flag() -> i32 {
    1
}
fn default_extrapolation_flag() -> i32 {
    2
}
impl SolverParamParser {
    pub fn parse(file_path: &str) -> Result<Self> {
        let file_content = fs::read_to_string(file_path)?;
        Self::from_json(&file_content)
    }
    pub fn from_json(content: &str) -> Result<Self> {
        let param: SolverParamParser = serde_json::from_str(content)?;
        Ok(param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_parse_with_defaults() {
        let json = r#"{
            "polynomial_order": 1,
            "basis": "taylor",
            "velocity": [1.0, 0.5],
            "mesh": {"shape": "triangle", "nx": 4, "ny": 2, "x_range": [0.0, 1.0], "y_range": [0.0, 0.5]},
            "output_file": "out.csv"
        }"#;
        let param = SolverParamParser::from_json(json).unwrap();
        assert_eq!(param.basis, BasisType::Taylor);
        assert_eq!(param.nvars, 1);
        assert_eq!(param.inoutflow_flag, 1);
        assert_eq!(param.extrapolation_flag, 2);
        assert_eq!(param.mesh.shape, MeshShape::Triangle);
        assert_eq!(param.velocity, vec![1.0, 0.5]);
    }

    #[test]
    fn test_unknown_basis_rejected() {
        let json = r#"{
            "polynomial_order": 1,
            "basis": "legendre",
            "velocity": [1.0, 0.5],
            "mesh": {"shape": "triangle", "nx": 4, "ny": 2, "x_range": [0.0, 1.0], "y_range": [0.0, 0.5]},
            "output_file": "out.csv"
        }"#;
        assert!(matches!(SolverParamParser::from_json(json), Err(Error::Json(_))));
    }
}
