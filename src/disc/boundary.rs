use serde::Deserialize;

/// Boundary markers carried by the mesh's boundary faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct BoundaryFlags {
    pub inoutflow: i32,
    pub extrapolation: i32,
}
impl Default for BoundaryFlags {
    fn default() -> Self {
        Self {
            inoutflow: 1,
            extrapolation: 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryKind {
    /// Copy the interior trace where the flow leaves, impose a value where it enters.
    InOutFlow,
    /// Copy the interior trace.
    Extrapolation,
}
impl BoundaryFlags {
    pub fn classify(&self, tag: i32) -> Option<BoundaryKind> {
        if tag == self.inoutflow {
            Some(BoundaryKind::InOutFlow)
        } else if tag == self.extrapolation {
            Some(BoundaryKind::Extrapolation)
        } else {
            None
        }
    }
}
