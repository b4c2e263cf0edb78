use csv::Writer;
use ndarray::ArrayView1;
use serde::Serialize;
use std::io;

use crate::{disc::mesh::mesh2d::Mesh2d, error::Result};

#[derive(Serialize)]
struct PointData {
    x: f64,
    y: f64,
    value: f64,
}

/// One `x, y, value` record per mesh node.
pub fn write_vertex_values<W: io::Write>(writer: W, mesh: &Mesh2d, values: ArrayView1<f64>) -> Result<()> {
    let mut writer = Writer::from_writer(writer);
    for (node, &value) in mesh.nodes.iter().zip(values.iter()) {
        writer.serialize(PointData {
            x: node.x,
            y: node.y,
            value,
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_to_csv(filename: &str, mesh: &Mesh2d, values: ArrayView1<f64>) -> Result<()> {
    let file = std::fs::File::create(filename)?;
    write_vertex_values(file, mesh, values)
}
