pub mod advection;
pub mod basis;
pub mod boundary;
pub mod face;
pub mod flux;
pub mod gauss_points;
pub mod geometric;
pub mod mesh;
pub mod spatial;
