use core::fmt::Debug;
use core::fmt::Display;

use crate::Coord;
use crate::Extent;

/// An absolute position in field space. The origin is the top left corner and `y` grows downward.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: Coord, y: Coord) -> Self {
        Point { x, y }
    }

    /// Move the point right by `dx` and down by `dy`.
    ///
    /// Callers only offset node origins by extents of the same node, which are validated to fit in
    /// a [`Coord`] when the tree is built.
    pub(crate) fn offset(self, dx: Extent, dy: Extent) -> Self {
        Point {
            x: self.x + dx as Coord,
            y: self.y + dy as Coord,
        }
    }
}

impl From<(Coord, Coord)> for Point {
    fn from((x, y): (Coord, Coord)) -> Self {
        Point { x, y }
    }
}

impl Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

/// Width and height of a rectangle. Every node of a built tree has both strictly positive.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: Extent,
    pub height: Extent,
}

impl Size {
    pub const fn new(width: Extent, height: Extent) -> Self {
        Size { width, height }
    }

    /// Number of cells covered. Widened so that a `u32::MAX` square cannot overflow.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Split an extent into two halves. The first half is rounded down and the second half takes
    /// the remainder, so `first + second == extent` always holds for odd extents too.
    pub(crate) fn halve(extent: Extent) -> (Extent, Extent) {
        let first = extent / 2;

        (first, extent - first)
    }
}

impl From<(Extent, Extent)> for Size {
    fn from((width, height): (Extent, Extent)) -> Self {
        Size { width, height }
    }
}

impl Debug for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::Point;
    use super::Size;

    #[test]
    fn halve_keeps_remainder() {
        let cases = [
            (1, (0, 1)),
            (2, (1, 1)),
            (3, (1, 2)),
            (8, (4, 4)),
            (9, (4, 5)),
        ];

        for (extent, want) in cases {
            let have = Size::halve(extent);

            assert_eq!(have, want, "halving {extent}");
            assert_eq!(have.0 + have.1, extent);
        }
    }

    #[test]
    fn area_does_not_overflow() {
        let s = Size::new(u32::MAX, u32::MAX);

        assert_eq!(s.area(), (u32::MAX as u64) * (u32::MAX as u64));
    }

    #[test]
    fn formatting() {
        assert_eq!(format!("{}", Point::new(-3, 4)), "(-3, 4)");
        assert_eq!(format!("{:?}", Size::new(16, 9)), "16x9");
    }
}
