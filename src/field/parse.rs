use std::str::FromStr;

use crate::Extent;
use crate::field::Grid;
use crate::field::GridError;

/// Parse a single plaintext cell.
fn read_cell(c: char) -> Option<bool> {
    match c {
        'O' | 'o' | '#' | '*' | '1' => Some(true),
        '.' | '0' | '_' => Some(false),
        _ => None,
    }
}

/// Parse one row of cells. `line` is 1-based and only used for error reporting.
fn read_row(line: usize, row: &str) -> Result<Vec<bool>, GridError> {
    row.chars()
        .enumerate()
        .map(|(i, got)| {
            read_cell(got).ok_or(GridError::InvalidChar {
                line,
                column: i + 1,
                got,
            })
        })
        .collect()
}

/// Parse the plaintext grid format.
///
/// ```text
/// ! comments start with a bang
/// .O..
/// ..O
/// OOO.
/// ```
///
/// Short rows are padded with off cells up to the longest row. Empty lines are rows of off cells.
impl FromStr for Grid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rows = Vec::new();

        for (i, line) in s.lines().enumerate() {
            if line.starts_with('!') {
                continue;
            }

            rows.push(read_row(i + 1, line.trim_end())?);
        }

        let w = rows.iter().map(Vec::len).max().unwrap_or(0);
        if w == 0 {
            return Err(GridError::Empty);
        }

        let (Ok(w), Ok(h)) = (Extent::try_from(w), Extent::try_from(rows.len())) else {
            return Err(GridError::Empty);
        };

        Ok(Grid::from_fn(w, h, |x, y| {
            rows[y as usize].get(x as usize).copied().unwrap_or(false)
        }))
    }
}
