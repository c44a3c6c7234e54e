//! Vector geometry beyond axis-aligned boxes.
//!
//! - Path commands, bounding boxes, orientation and polyline simplification
//! - Straight-skeleton vertices and bisector intersections

pub mod path;
pub mod skeleton;

pub use path::{Line, PagePath, PathCommand, bezier_bounding_box, flatten_bezier, simplify};
pub use skeleton::{
    Bisector, CollapseEvent, Vertex, collapse_events, distance_point_to_line, polygon_vertices,
};
