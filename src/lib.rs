pub mod camera;
pub mod field;
pub mod geom;
pub mod quadtree;

pub use field::Field;
pub use field::Grid;
pub use geom::Point;
pub use geom::Size;
pub use quadtree::BuildError;
pub use quadtree::PointOutOfBounds;
pub use quadtree::QuadNode;
pub use quadtree::build;

#[cfg(feature = "parallel")]
pub use quadtree::build_parallel;

/// Signed coordinate in field space. Signed so that queries may land left of or above the origin.
pub type Coord = i32;

/// Extent of a field or node along one axis.
pub type Extent = u32;
