//! Image-specific constructions: pixel adjacency graphs, Khalimsky
//! contours, and the tree of shapes.

pub mod graph_image;
pub mod tree_of_shapes;
