use core::fmt::Debug;
use core::fmt::Display;

use thiserror::Error;

use crate::Coord;
use crate::Extent;
use crate::geom::Point;
use crate::geom::Size;

pub use self::build::build;
#[cfg(feature = "parallel")]
pub use self::build::build_parallel;
pub use self::traverse::Leaves;

mod build;
mod traverse;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Field {dimension} must be between 1 and {max}, got {value}", max = Coord::MAX)]
    InvalidBounds {
        dimension: &'static str,
        value: Extent,
    },

    #[error("Minimum leaf size must be at least 1, got {value}")]
    InvalidMinSize { value: Extent },

    #[error("Field has no cell at ({x}, {y}) although it lies inside the field bounds")]
    MissingCell {
        x: Extent,
        y: Extent,
    },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Point {point} lies outside the node at {origin} with size {bounds}")]
pub struct PointOutOfBounds {
    pub point: Point,

    /// Top left corner of the node that was queried
    pub origin: Point,

    pub bounds: Size,
}

/// Position of a child inside its parent.
///
/// Children are always stored, built and visited in this order: row by row from the top, left to
/// right within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    TopLeft = 0,
    TopRight = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// `0` for the left column, `1` for the right one.
    pub fn column(self) -> usize {
        self as usize % 2
    }

    /// `0` for the top row, `1` for the bottom one.
    pub fn row(self) -> usize {
        self as usize / 2
    }

    /// The rectangle of this quadrant inside the parent rectangle at `position` with size `size`.
    ///
    /// Each axis is halved with [`Size::halve`]: the left column and top row get the rounded down
    /// half, the right column and bottom row get the rest. The four quadrants therefore tile the
    /// parent exactly, odd extents included.
    pub fn region(self, position: Point, size: Size) -> (Point, Size) {
        let (w0, w1) = Size::halve(size.width);
        let (h0, h1) = Size::halve(size.height);

        let (dx, w) = [(0, w0), (w0, w1)][self.column()];
        let (dy, h) = [(0, h0), (h0, h1)][self.row()];

        (position.offset(dx, dy), Size::new(w, h))
    }
}

/// A node of a region quadtree over a boolean [`Field`](crate::Field).
///
/// A node is either a leaf, in which case `value` stands for every cell of its rectangle, or has
/// exactly four children that tile its rectangle in [`Quadrant`] order. Internal nodes carry the
/// majority value of their rectangle, which renderers may use as a coarse approximation.
///
/// Trees are built once with [`build`] and never mutated afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct QuadNode {
    position: Point,
    size: Size,

    /// `None` if leaf
    children: Option<Box<[QuadNode; 4]>>,

    value: bool,
}

impl QuadNode {
    pub(crate) fn leaf(position: Point, size: Size, value: bool) -> Self {
        QuadNode {
            position,
            size,
            children: None,
            value,
        }
    }

    pub(crate) fn internal(
        position: Point,
        size: Size,
        value: bool,
        children: [QuadNode; 4],
    ) -> Self {
        QuadNode {
            position,
            size,
            children: Some(Box::new(children)),
            value,
        }
    }

    /// Top left corner of the node, in field space.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn area(&self) -> u64 {
        self.size.area()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// The children of this node, in [`Quadrant`] order. Empty for leaves.
    pub fn children(&self) -> &[QuadNode] {
        match &self.children {
            Some(children) => &children[..],
            None => &[],
        }
    }

    pub fn child(&self, quadrant: Quadrant) -> Option<&QuadNode> {
        self.children.as_ref().map(|c| &c[quadrant as usize])
    }

    /// Count nodes, leaves and depth of the tree rooted at this node.
    ///
    /// `min_size` is the value the tree was built with. It is only used to tell which leaves were
    /// forced by the minimum size rather than by a uniform region.
    pub fn stats(&self, min_size: Extent) -> TreeStats {
        let mut stats = TreeStats::default();
        let mut stack = vec![(self, 0)];

        while let Some((node, depth)) = stack.pop() {
            stats.nodes += 1;
            stats.depth = stats.depth.max(depth);

            if node.is_leaf() {
                stats.leaves += 1;

                if node.size.width <= min_size || node.size.height <= min_size {
                    stats.forced_leaves += 1;
                }
            }

            for c in node.children() {
                stack.push((c, depth + 1));
            }
        }

        stats
    }

    fn fmt_nested(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        let indent = 2 * depth;
        write!(f, "{:indent$}pos={}, size={}", "", self.position, self.size)?;

        if self.is_leaf() {
            writeln!(f, ", value={}", self.value)?;
        } else {
            writeln!(f)?;
        }

        for c in self.children() {
            c.fmt_nested(f, depth + 1)?;
        }

        Ok(())
    }
}

/// One line per node, children indented under their parent.
///
/// ```text
/// pos=(0, 0), size=4x4
///   pos=(0, 0), size=2x2, value=false
///   ...
/// ```
impl Display for QuadNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.fmt_nested(f, 0)
    }
}

impl Debug for QuadNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("QuadNode");
        s.field("position", &self.position)
            .field("size", &self.size)
            .field("value", &self.value);

        if !self.is_leaf() {
            s.field("children", &self.children());
        }

        s.finish()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    /// Total number of nodes, root included
    pub nodes: usize,

    pub leaves: usize,

    /// Leaves with a side of at most the minimum size, whether their region is uniform or not.
    pub forced_leaves: usize,

    /// Depth of the deepest leaf, `0` for a tree made of its root only
    pub depth: usize,
}
