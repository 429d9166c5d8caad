use core::fmt::Debug;
use core::fmt::Display;

use thiserror::Error;

use crate::Extent;
use crate::geom::Size;

mod parse;

/// A read-only two dimensional boolean source.
///
/// The quadtree builder only ever reads cells inside `bounds()`. Implementors must return
/// `Some(_)` for every such cell, and `None` for anything outside.
pub trait Field {
    fn bounds(&self) -> Size;

    fn get(&self, x: Extent, y: Extent) -> Option<bool>;
}

impl<F: Field + ?Sized> Field for &F {
    fn bounds(&self) -> Size {
        (**self).bounds()
    }

    fn get(&self, x: Extent, y: Extent) -> Option<bool> {
        (**self).get(x, y)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("Cell ({x}, {y}) is outside the {bounds} grid")]
    OutOfBounds {
        x: Extent,
        y: Extent,
        bounds: Size,
    },

    #[error("Grid has no cells")]
    Empty,

    #[error("Invalid character '{got}' at line {line}, column {column}")]
    InvalidChar {
        line: usize,
        column: usize,
        got: char,
    },
}

/// A dense, owned [`Field`], stored row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<bool>,

    /// Width of the grid
    w: Extent,

    /// Height of the grid
    h: Extent,
}

impl Grid {
    /// Create a `w` by `h` grid with every cell off.
    pub fn new(w: Extent, h: Extent) -> Self {
        Self::filled(w, h, false)
    }

    pub fn filled(w: Extent, h: Extent, value: bool) -> Self {
        Grid {
            cells: vec![value; w as usize * h as usize],
            w,
            h,
        }
    }

    /// Create a grid by evaluating `f(x, y)` on every cell.
    pub fn from_fn<F>(w: Extent, h: Extent, mut f: F) -> Self
    where
        F: FnMut(Extent, Extent) -> bool,
    {
        let mut cells = Vec::with_capacity(w as usize * h as usize);

        for y in 0..h {
            for x in 0..w {
                cells.push(f(x, y));
            }
        }

        Grid { cells, w, h }
    }

    pub fn width(&self) -> Extent {
        self.w
    }

    pub fn height(&self) -> Extent {
        self.h
    }

    pub fn set(&mut self, x: Extent, y: Extent, value: bool) -> Result<(), GridError> {
        let i = self.index(x, y).ok_or(GridError::OutOfBounds {
            x,
            y,
            bounds: self.bounds(),
        })?;

        self.cells[i] = value;

        Ok(())
    }

    /// Set every cell of the rectangle at `(x, y)` with size `size` to `value`. The whole rectangle
    /// must lie inside the grid, otherwise nothing is written.
    pub fn fill_rect(
        &mut self,
        x: Extent,
        y: Extent,
        size: Size,
        value: bool,
    ) -> Result<(), GridError> {
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }

        // check the far corner first so a failing fill leaves the grid untouched
        let (x1, y1) = (
            x.saturating_add(size.width - 1),
            y.saturating_add(size.height - 1),
        );

        if self.index(x1, y1).is_none() || self.index(x, y).is_none() {
            return Err(GridError::OutOfBounds {
                x: x1,
                y: y1,
                bounds: self.bounds(),
            });
        }

        for row in y..=y1 {
            let start = row as usize * self.w as usize;
            let (a, b) = (start + x as usize, start + x1 as usize);
            self.cells[a..=b].fill(value);
        }

        Ok(())
    }

    /// Number of cells that are on.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    fn index(&self, x: Extent, y: Extent) -> Option<usize> {
        if x < self.w && y < self.h {
            Some(y as usize * self.w as usize + x as usize)
        } else {
            None
        }
    }
}

impl Field for Grid {
    fn bounds(&self) -> Size {
        Size::new(self.w, self.h)
    }

    fn get(&self, x: Extent, y: Extent) -> Option<bool> {
        self.index(x, y).map(|i| self.cells[i])
    }
}

/// Writes the grid in the plaintext format understood by `Grid::from_str`.
impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.w.max(1) as usize) {
            for &c in row {
                f.write_str(if c { "O" } else { "." })?;
            }

            f.write_str("\n")?;
        }

        Ok(())
    }
}

impl Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Grid {}x{}", self.w, self.h)?;
        Display::fmt(self, f)
    }
}
