use std::iter::FusedIterator;

use crate::geom::Point;
use crate::geom::Size;
use crate::quadtree::PointOutOfBounds;
use crate::quadtree::QuadNode;

impl QuadNode {
    /// Whether `point` lies in the half-open rectangle `[position, position + size)` of this node.
    ///
    /// This is purely geometric and says nothing about the value at `point`, see
    /// [`QuadNode::value_at`] for that.
    pub fn contains(&self, point: Point) -> bool {
        let (x, y) = (point.x as i64, point.y as i64);
        let (x0, y0) = (self.position.x as i64, self.position.y as i64);

        let xs = x0..x0 + self.size.width as i64;
        let ys = y0..y0 + self.size.height as i64;

        xs.contains(&x) && ys.contains(&y)
    }

    /// The unique leaf under this node whose rectangle contains `point`.
    pub fn find_leaf(&self, point: Point) -> Result<&QuadNode, PointOutOfBounds> {
        let out_of_bounds = PointOutOfBounds {
            point,
            origin: self.position,
            bounds: self.size,
        };

        if !self.contains(point) {
            return Err(out_of_bounds);
        }

        let mut node = self;

        while !node.is_leaf() {
            // the children tile their parent, so exactly one of them matches
            let Some(child) = node.children().iter().find(|c| c.contains(point)) else {
                return Err(out_of_bounds);
            };

            node = child;
        }

        Ok(node)
    }

    /// The value of the cell at `point`, as recorded by the leaf containing it.
    pub fn value_at(&self, point: Point) -> Result<bool, PointOutOfBounds> {
        self.find_leaf(point).map(QuadNode::value)
    }

    /// Depth first iterator over every leaf, children visited in [`Quadrant`](super::Quadrant)
    /// order.
    ///
    /// The iterator borrows the tree, so it can be created as many times as needed.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }

    /// Call `f(position, size, value)` on every leaf, in the same order as [`QuadNode::leaves`].
    pub fn visit_leaves<F>(&self, mut f: F)
    where
        F: FnMut(Point, Size, bool),
    {
        for leaf in self.leaves() {
            f(leaf.position, leaf.size, leaf.value);
        }
    }
}

#[derive(Clone)]
pub struct Leaves<'a> {
    /// Nodes left to visit, the next one on top
    stack: Vec<&'a QuadNode>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a QuadNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            if node.is_leaf() {
                return Some(node);
            }

            // pushed in reverse so the top left child comes out first
            self.stack.extend(node.children().iter().rev());
        }

        None
    }
}

impl FusedIterator for Leaves<'_> {}

#[cfg(test)]
mod tests {
    use crate::field::Grid;
    use crate::geom::Point;
    use crate::geom::Size;
    use crate::quadtree::PointOutOfBounds;
    use crate::quadtree::Quadrant;
    use crate::quadtree::build;

    #[test]
    fn contains_is_half_open() {
        let root = build(&Grid::new(3, 2), 1).unwrap();

        assert!(root.contains(Point::new(0, 0)));
        assert!(root.contains(Point::new(2, 1)));
        assert!(!root.contains(Point::new(3, 1)));
        assert!(!root.contains(Point::new(2, 2)));
        assert!(!root.contains(Point::new(-1, 0)));
    }

    #[test]
    fn contains_near_coord_limits() {
        let root = build(&Grid::new(1, 1), 1).unwrap();

        assert!(!root.contains(Point::new(i32::MAX, i32::MAX)));
        assert!(!root.contains(Point::new(i32::MIN, 0)));
    }

    #[test]
    fn find_leaf_out_of_bounds() {
        let root = build(&Grid::new(4, 4), 1).unwrap();

        assert_eq!(
            root.find_leaf(Point::new(4, 0)).unwrap_err(),
            PointOutOfBounds {
                point: Point::new(4, 0),
                origin: Point::ORIGIN,
                bounds: Size::new(4, 4)
            }
        );
        assert!(root.value_at(Point::new(0, -1)).is_err());
    }

    #[test]
    fn find_leaf_on_a_subtree() {
        let g = Grid::from_fn(4, 4, |x, y| (x + y) % 2 == 0);
        let root = build(&g, 1).unwrap();
        let br = root.child(Quadrant::BottomRight).unwrap();

        assert_eq!(
            br.find_leaf(Point::new(3, 2)).unwrap().position(),
            Point::new(3, 2)
        );

        let err = br.find_leaf(Point::new(1, 1)).unwrap_err();
        assert_eq!(
            err,
            PointOutOfBounds {
                point: Point::new(1, 1),
                origin: Point::new(2, 2),
                bounds: Size::new(2, 2)
            }
        );
        assert_eq!(
            err.to_string(),
            "Point (1, 1) lies outside the node at (2, 2) with size 2x2"
        );
    }

    #[test]
    fn value_at_reads_the_leaf() {
        let g = Grid::from_fn(4, 4, |x, y| x >= 2 && y < 2);
        let root = build(&g, 1).unwrap();

        assert_eq!(root.value_at(Point::new(3, 0)), Ok(true));
        assert_eq!(root.value_at(Point::new(1, 0)), Ok(false));
        assert_eq!(root.value_at(Point::new(3, 3)), Ok(false));
    }

    #[test]
    fn leaves_in_quadrant_order() {
        let g = Grid::from_fn(4, 4, |x, y| (x + y) % 2 == 0);
        let root = build(&g, 1).unwrap();

        let positions: Vec<_> = root
            .leaves()
            .map(|l| (l.position().x, l.position().y))
            .collect();

        #[rustfmt::skip]
        let expected = vec![
            (0, 0), (1, 0), (0, 1), (1, 1),
            (2, 0), (3, 0), (2, 1), (3, 1),
            (0, 2), (1, 2), (0, 3), (1, 3),
            (2, 2), (3, 2), (2, 3), (3, 3),
        ];

        assert_eq!(positions, expected);
    }

    #[test]
    fn leaves_is_restartable() {
        let g = Grid::from_fn(5, 5, |x, y| x * y % 3 == 1);
        let root = build(&g, 1).unwrap();

        let first: Vec<_> = root.leaves().collect();
        let second: Vec<_> = root.leaves().collect();

        assert_eq!(first, second);

        let mut visited = Vec::new();
        root.visit_leaves(|p, s, v| visited.push((p, s, v)));

        let expected: Vec<_> = first
            .iter()
            .map(|l| (l.position(), l.size(), l.value()))
            .collect();
        assert_eq!(visited, expected);
    }

    #[test]
    fn leaves_iterator_is_fused() {
        let root = build(&Grid::new(2, 2), 1).unwrap();
        let mut it = root.leaves();

        assert!(it.next().is_some());
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }
}
