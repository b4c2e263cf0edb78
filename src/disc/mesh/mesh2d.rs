use hashbrown::HashMap;
use ndarray::Array2;

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    pub x: f64,
    pub y: f64,
}

/// A face of the mesh. `parents[0]` is the left element, `parents[1]` the
/// right one (absent on the boundary). `inodes` are ordered so that the left
/// element walks them counter-clockwise; for quadratic meshes the mid-node
/// comes last.
#[derive(Clone, Debug)]
pub struct Edge {
    pub inodes: Vec<usize>,
    pub parents: Vec<usize>,
    pub local_ids: Vec<usize>,
    pub tag: Option<i32>,
}
impl Edge {
    pub fn is_boundary(&self) -> bool {
        self.parents.len() == 1
    }
    pub fn left(&self) -> usize {
        self.parents[0]
    }
    pub fn right(&self) -> Option<usize> {
        self.parents.get(1).copied()
    }
}

/// Element connectivity: vertices counter-clockwise, then edge mid-nodes,
/// then the centre node of nine-node quadrilaterals.
#[derive(Clone, Debug)]
pub struct MeshElement {
    pub inodes: Vec<usize>,
    pub iedges: Vec<usize>,
}
impl MeshElement {
    pub fn num_vertices(&self) -> usize {
        match self.inodes.len() {
            4 | 9 => 4,
            _ => 3,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Mesh2d {
    pub nodes: Vec<Node>,
    /// Boundary edges first, then interior edges.
    pub edges: Vec<Edge>,
    pub elements: Vec<MeshElement>,
    pub boundary_edge_num: usize,
    /// Polynomial degree of the geometry.
    pub degree: usize,
    pub elem_num: usize,
    pub node_num: usize,
}
impl Mesh2d {
    /// Builds face connectivity for elements given by node lists and tags
    /// every boundary face with `tag_fn` evaluated at its mid-point.
    pub fn new<F>(
        nodes: Vec<Node>,
        element_nodes: Vec<Vec<usize>>,
        degree: usize,
        tag_fn: F,
    ) -> Result<Mesh2d>
    where
        F: Fn(f64, f64) -> i32,
    {
        if degree != 1 && degree != 2 {
            return Err(Error::InvalidMesh(format!(
                "geometric degree {degree} is not supported"
            )));
        }
        let node_num = nodes.len();
        let mut elements = Vec::with_capacity(element_nodes.len());
        for (ielem, inodes) in element_nodes.into_iter().enumerate() {
            let valid_count = match degree {
                1 => inodes.len() == 3 || inodes.len() == 4,
                _ => inodes.len() == 6 || inodes.len() == 9,
            };
            if !valid_count {
                return Err(Error::InvalidMesh(format!(
                    "element {ielem} has {} nodes, not valid for geometric degree {degree}",
                    inodes.len()
                )));
            }
            if let Some(&bad) = inodes.iter().find(|&&inode| inode >= node_num) {
                return Err(Error::InvalidMesh(format!(
                    "element {ielem} references node {bad}, mesh has {node_num} nodes"
                )));
            }
            elements.push(MeshElement {
                iedges: Vec::new(),
                inodes,
            });
        }

        let mut edge_map: HashMap<(usize, usize), usize> = HashMap::new();
        let mut raw_edges: Vec<Edge> = Vec::new();
        for (ielem, element) in elements.iter().enumerate() {
            let nv = element.num_vertices();
            for lf in 0..nv {
                let a = element.inodes[lf];
                let b = element.inodes[(lf + 1) % nv];
                let key = (a.min(b), a.max(b));
                match edge_map.get(&key) {
                    None => {
                        let mut inodes = vec![a, b];
                        if degree == 2 {
                            inodes.push(element.inodes[nv + lf]);
                        }
                        edge_map.insert(key, raw_edges.len());
                        raw_edges.push(Edge {
                            inodes,
                            parents: vec![ielem],
                            local_ids: vec![lf],
                            tag: None,
                        });
                    }
                    Some(&iedge) => {
                        let edge = &mut raw_edges[iedge];
                        if edge.parents.len() == 2 {
                            return Err(Error::InvalidMesh(format!(
                                "edge ({a}, {b}) is shared by more than two elements"
                            )));
                        }
                        if edge.inodes[0] != b {
                            return Err(Error::InvalidMesh(format!(
                                "elements {} and {ielem} are not consistently oriented",
                                edge.parents[0]
                            )));
                        }
                        edge.parents.push(ielem);
                        edge.local_ids.push(lf);
                    }
                }
            }
        }

        // boundary edges first, discovery order otherwise kept
        let mut order: Vec<usize> = (0..raw_edges.len())
            .filter(|&i| raw_edges[i].is_boundary())
            .collect();
        let boundary_edge_num = order.len();
        order.extend((0..raw_edges.len()).filter(|&i| !raw_edges[i].is_boundary()));
        let mut edges: Vec<Edge> = order.iter().map(|&i| raw_edges[i].clone()).collect();
        for edge in edges.iter_mut().take(boundary_edge_num) {
            let p0 = nodes[edge.inodes[0]];
            let p1 = nodes[edge.inodes[1]];
            edge.tag = Some(tag_fn(0.5 * (p0.x + p1.x), 0.5 * (p0.y + p1.y)));
        }
        for element in elements.iter_mut() {
            element.iedges = vec![0; element.num_vertices()];
        }
        for (inew, edge) in edges.iter().enumerate() {
            for (side, &ielem) in edge.parents.iter().enumerate() {
                elements[ielem].iedges[edge.local_ids[side]] = inew;
            }
        }

        let elem_num = elements.len();
        Ok(Mesh2d {
            nodes,
            edges,
            elements,
            boundary_edge_num,
            degree,
            elem_num,
            node_num,
        })
    }
    /// `nx` by `ny` grid of counter-clockwise quadrilaterals on a rectangle.
    pub fn create_rect_quad_mesh<F>(
        nx: usize,
        ny: usize,
        x_range: [f64; 2],
        y_range: [f64; 2],
        tag_fn: F,
    ) -> Result<Mesh2d>
    where
        F: Fn(f64, f64) -> i32,
    {
        let nodes = Self::grid_nodes(nx, ny, x_range, y_range);
        let idx = |i: usize, j: usize| j * (nx + 1) + i;
        let mut element_nodes = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                element_nodes.push(vec![idx(i, j), idx(i + 1, j), idx(i + 1, j + 1), idx(i, j + 1)]);
            }
        }
        Self::new(nodes, element_nodes, 1, tag_fn)
    }
    /// Same grid as [`Mesh2d::create_rect_quad_mesh`] with every cell split
    /// along its lower-left to upper-right diagonal.
    pub fn create_rect_tri_mesh<F>(
        nx: usize,
        ny: usize,
        x_range: [f64; 2],
        y_range: [f64; 2],
        tag_fn: F,
    ) -> Result<Mesh2d>
    where
        F: Fn(f64, f64) -> i32,
    {
        let nodes = Self::grid_nodes(nx, ny, x_range, y_range);
        let idx = |i: usize, j: usize| j * (nx + 1) + i;
        let mut element_nodes = Vec::with_capacity(2 * nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                element_nodes.push(vec![idx(i, j), idx(i + 1, j), idx(i + 1, j + 1)]);
                element_nodes.push(vec![idx(i, j), idx(i + 1, j + 1), idx(i, j + 1)]);
            }
        }
        Self::new(nodes, element_nodes, 1, tag_fn)
    }
    fn grid_nodes(nx: usize, ny: usize, x_range: [f64; 2], y_range: [f64; 2]) -> Vec<Node> {
        let hx = (x_range[1] - x_range[0]) / nx as f64;
        let hy = (y_range[1] - y_range[0]) / ny as f64;
        let mut nodes = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                nodes.push(Node {
                    x: x_range[0] + i as f64 * hx,
                    y: y_range[0] + j as f64 * hy,
                });
            }
        }
        nodes
    }
    pub fn face_num(&self) -> usize {
        self.edges.len()
    }
    pub fn boundary_face_num(&self) -> usize {
        self.boundary_edge_num
    }
    pub fn num_faces_of(&self, ielem: usize) -> usize {
        self.elements[ielem].iedges.len()
    }
    /// Element across local face `local_face` of `ielem`, `None` on the boundary.
    pub fn neighbor(&self, ielem: usize, local_face: usize) -> Option<usize> {
        let edge = &self.edges[self.elements[ielem].iedges[local_face]];
        edge.parents.iter().copied().find(|&p| p != ielem)
    }
    /// Physical coordinates of an element's nodes, (nodes × 2).
    pub fn element_coords(&self, ielem: usize) -> Array2<f64> {
        self.coords_of(&self.elements[ielem].inodes)
    }
    /// Physical coordinates of a face's nodes, (nodes × 2).
    pub fn face_coords(&self, iface: usize) -> Array2<f64> {
        self.coords_of(&self.edges[iface].inodes)
    }
    fn coords_of(&self, inodes: &[usize]) -> Array2<f64> {
        let mut coords = Array2::<f64>::zeros((inodes.len(), 2));
        for (i, &inode) in inodes.iter().enumerate() {
            coords[(i, 0)] = self.nodes[inode].x;
            coords[(i, 1)] = self.nodes[inode].y;
        }
        coords
    }
}
