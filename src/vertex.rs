use crate::camera::Projection;

/// Projected vertex with its screen position and depth
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub screen_position: [f64; 2],
    pub depth: f64,
}

impl From<Projection> for Vertex {
    fn from(projection: Projection) -> Self {
        Vertex {
            screen_position: [projection.x, projection.y],
            depth: projection.depth,
        }
    }
}
