use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::Coord;
use crate::Extent;
use crate::field::Field;
use crate::geom::Point;
use crate::geom::Size;
use crate::quadtree::BuildError;
use crate::quadtree::QuadNode;
use crate::quadtree::Quadrant;

/// Nodes smaller than this are built on the current thread by `build_parallel`.
#[cfg(feature = "parallel")]
const PARALLEL_MIN_AREA: u64 = 4096;

/// What to do with a node once its region has been tallied.
enum Step {
    Leaf(bool),
    Split {
        value: bool,
        children: [(Point, Size); 4],
    },
}

/// Build the region quadtree of `field`.
///
/// Starting from a root covering the whole field, every node is handled as follows:
///
/// 1. Tally the cells of the node's rectangle.
/// 2. If either side of the node is at most `min_size`, the node becomes a leaf holding the
///    majority value of its rectangle. Ties go to `true`.
/// 3. Otherwise, if the rectangle is uniform, the node becomes a leaf with that value.
/// 4. Otherwise, the node is split into four [`Quadrant`]s which are built recursively.
///
/// Fails without producing a tree if the field has a zero (or larger than [`Coord::MAX`]) side, if
/// `min_size` is zero, or if the field does not answer for a cell inside its own bounds.
///
/// ```
/// use quadfield::Grid;
/// use quadfield::Point;
///
/// // the bottom half is on
/// let field = Grid::from_fn(4, 4, |_, y| y >= 2);
/// let root = quadfield::build(&field, 1).unwrap();
///
/// assert_eq!(root.leaves().count(), 4);
/// assert!(root.value_at(Point::new(1, 3)).unwrap());
/// assert!(!root.value_at(Point::new(1, 0)).unwrap());
/// ```
pub fn build<F: Field + ?Sized>(field: &F, min_size: Extent) -> Result<QuadNode, BuildError> {
    let bounds = validate(field, min_size)?;

    debug!(%bounds, min_size, "Building quadtree");

    let root = build_node(field, Point::ORIGIN, bounds, min_size)?;

    log_stats(&root, min_size);

    Ok(root)
}

/// Same as [`build`], but the four children of large nodes are built concurrently on the rayon
/// thread pool. The resulting tree is identical to the one `build` returns.
#[cfg(feature = "parallel")]
pub fn build_parallel<F: Field + Sync + ?Sized>(
    field: &F,
    min_size: Extent,
) -> Result<QuadNode, BuildError> {
    let bounds = validate(field, min_size)?;

    debug!(%bounds, min_size, "Building quadtree in parallel");

    let root = build_node_parallel(field, Point::ORIGIN, bounds, min_size)?;

    log_stats(&root, min_size);

    Ok(root)
}

fn validate<F: Field + ?Sized>(field: &F, min_size: Extent) -> Result<Size, BuildError> {
    let bounds = field.bounds();

    for (dimension, value) in [("width", bounds.width), ("height", bounds.height)] {
        if value == 0 || value > Coord::MAX as Extent {
            return Err(BuildError::InvalidBounds { dimension, value });
        }
    }

    if min_size == 0 {
        return Err(BuildError::InvalidMinSize { value: min_size });
    }

    if min_size >= bounds.width.min(bounds.height) {
        warn!(%bounds, min_size, "Tree will be a single forced leaf");
    }

    Ok(bounds)
}

fn log_stats(root: &QuadNode, min_size: Extent) {
    let stats = root.stats(min_size);

    debug!(
        nodes = stats.nodes,
        leaves = stats.leaves,
        forced_leaves = stats.forced_leaves,
        depth = stats.depth,
        "Built quadtree"
    );
}

/// Count the cells that are on inside the rectangle at `position` with size `size`.
fn tally<F: Field + ?Sized>(field: &F, position: Point, size: Size) -> Result<u64, BuildError> {
    // node positions are never negative, see `validate`
    let (x0, y0) = (position.x as Extent, position.y as Extent);
    let mut on = 0;

    for y in y0..y0 + size.height {
        for x in x0..x0 + size.width {
            if field.get(x, y).ok_or(BuildError::MissingCell { x, y })? {
                on += 1;
            }
        }
    }

    Ok(on)
}

/// Decide whether the node at `position` with size `size` is a leaf.
///
/// The region is always tallied before the minimum size is checked, since forced leaves take the
/// majority of it.
fn classify<F: Field + ?Sized>(
    field: &F,
    position: Point,
    size: Size,
    min_size: Extent,
) -> Result<Step, BuildError> {
    let area = size.area();
    let on = tally(field, position, size)?;

    // rounded mean, with 0.5 rounding up
    let majority = 2 * on >= area;

    if size.width <= min_size || size.height <= min_size {
        trace!(%position, %size, on, area, value = majority, "Forced leaf");
        return Ok(Step::Leaf(majority));
    }

    if on == 0 || on == area {
        return Ok(Step::Leaf(on != 0));
    }

    Ok(Step::Split {
        value: majority,
        children: Quadrant::ALL.map(|q| q.region(position, size)),
    })
}

fn build_node<F: Field + ?Sized>(
    field: &F,
    position: Point,
    size: Size,
    min_size: Extent,
) -> Result<QuadNode, BuildError> {
    match classify(field, position, size, min_size)? {
        Step::Leaf(value) => Ok(QuadNode::leaf(position, size, value)),
        Step::Split { value, children } => {
            let [tl, tr, bl, br] = children;

            let children = [
                build_node(field, tl.0, tl.1, min_size)?,
                build_node(field, tr.0, tr.1, min_size)?,
                build_node(field, bl.0, bl.1, min_size)?,
                build_node(field, br.0, br.1, min_size)?,
            ];

            Ok(QuadNode::internal(position, size, value, children))
        }
    }
}

#[cfg(feature = "parallel")]
fn build_node_parallel<F: Field + Sync + ?Sized>(
    field: &F,
    position: Point,
    size: Size,
    min_size: Extent,
) -> Result<QuadNode, BuildError> {
    if size.area() < PARALLEL_MIN_AREA {
        return build_node(field, position, size, min_size);
    }

    match classify(field, position, size, min_size)? {
        Step::Leaf(value) => Ok(QuadNode::leaf(position, size, value)),
        Step::Split { value, children } => {
            let [tl, tr, bl, br] = children;
            let go = |(p, s): (Point, Size)| build_node_parallel(field, p, s, min_size);

            let ((tl, tr), (bl, br)) = rayon::join(
                || rayon::join(|| go(tl), || go(tr)),
                || rayon::join(|| go(bl), || go(br)),
            );

            let children = [tl?, tr?, bl?, br?];

            Ok(QuadNode::internal(position, size, value, children))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::build;
    use crate::field::Field;
    use crate::field::Grid;
    use crate::geom::Point;
    use crate::geom::Size;
    use crate::quadtree::BuildError;

    /// Claims to be 4x4 but only knows about its first row.
    struct Truncated;

    impl Field for Truncated {
        fn bounds(&self) -> Size {
            Size::new(4, 4)
        }

        fn get(&self, x: u32, y: u32) -> Option<bool> {
            (y == 0 && x < 4).then_some(x % 2 == 0)
        }
    }

    #[test]
    fn rejects_empty_bounds() {
        let res = build(&Grid::new(0, 3), 1);
        assert_eq!(
            res,
            Err(BuildError::InvalidBounds {
                dimension: "width",
                value: 0
            })
        );

        let res = build(&Grid::new(3, 0), 1);
        assert_eq!(
            res,
            Err(BuildError::InvalidBounds {
                dimension: "height",
                value: 0
            })
        );
    }

    #[test]
    fn rejects_zero_min_size() {
        let res = build(&Grid::new(2, 2), 0);

        assert_eq!(res, Err(BuildError::InvalidMinSize { value: 0 }));
    }

    #[test]
    fn broken_field_is_reported() {
        let res = build(&Truncated, 1);

        assert_eq!(res, Err(BuildError::MissingCell { x: 0, y: 1 }));
    }

    #[test]
    fn forced_leaf_takes_majority() {
        // 3 of 4 on
        let g = Grid::from_fn(2, 2, |x, y| x + y > 0);
        let root = build(&g, 2).unwrap();
        assert!(root.is_leaf());
        assert!(root.value());

        // 1 of 4 on
        let g = Grid::from_fn(2, 2, |x, y| x + y == 0);
        let root = build(&g, 2).unwrap();
        assert!(root.is_leaf());
        assert!(!root.value());
    }

    #[test]
    fn forced_leaf_tie_goes_to_true() {
        let g = Grid::from_fn(4, 4, |x, _| x < 2);
        let root = build(&g, 4).unwrap();

        assert!(root.is_leaf());
        assert!(root.value());
    }

    #[test]
    fn forced_leaf_when_one_side_is_small() {
        // 8 wide, 1 tall. The height reaches the minimum size immediately.
        let g = Grid::from_fn(8, 1, |x, _| x < 3);
        let root = build(&g, 1).unwrap();

        assert!(root.is_leaf());
        assert_eq!(root.size(), Size::new(8, 1));
        assert!(!root.value());
    }

    #[test]
    fn single_cell_in_the_corner() {
        let mut g = Grid::new(4, 4);
        g.set(3, 3, true).unwrap();

        let root = build(&g, 1).unwrap();

        // the bottom right 2x2 quadrant splits again, everything else is uniform
        let stats = root.stats(1);
        assert_eq!(stats.leaves, 7);
        assert_eq!(stats.depth, 2);

        let leaf = root.find_leaf(Point::new(3, 3)).unwrap();
        assert_eq!(leaf.size(), Size::new(1, 1));
        assert!(leaf.value());

        // internal nodes carry the majority of their region
        assert!(!root.value());
    }
}
