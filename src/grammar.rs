//! Parser for the grid spec grammar.
//!
//! A grid spec is a comma-separated list of groups.  Inside a group,
//! whitespace separates tokens of two kinds:
//!
//! * `WxH` — a grid header, `W` columns by `H` rows.  It stays active for
//!   every following group until the next header.
//! * `C:R` — a cell coordinate (column, row), 0-based.
//!
//! A group holds one coordinate (a single cell) or two coordinates (the
//! start and the inclusive end corner of a span), optionally preceded by a
//! header:
//!
//! ```text
//! 4x1 1:0 2:0, 2x1 0:0, 1:0
//! ```
//!
//! yields a 4×1 span over columns 1–2, then the left and right halves of a
//! 2×1 grid.

use crate::geometry::GridCell;

/// Largest accepted grid dimension.  Cells are scaled with `i32` pixel
/// arithmetic, so every coordinate must fit in an `i32`.
pub const MAX_GRID_SIZE: u32 = i32::MAX as u32;

/// Errors produced while parsing a grid spec.
///
/// Every variant carries the 1-based number of the comma-separated group in
/// which the problem was found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    /// A coordinate is not inside the active grid.
    #[error("group {group}: coordinate outside grid: {col}:{row} is not inside a {cols}x{rows} grid")]
    OutsideGrid {
        group: usize,
        col: u32,
        row: u32,
        cols: u32,
        rows: u32,
    },

    /// The end corner of a span lies left of or above its start corner.
    #[error("group {group}: end position precedes start: {end_col}:{end_row} is before {start_col}:{start_row}")]
    EndBeforeStart {
        group: usize,
        start_col: u32,
        start_row: u32,
        end_col: u32,
        end_row: u32,
    },

    /// Malformed token stream: bad numbers, unknown tokens, a coordinate
    /// with no grid header, or too many coordinates in one group.
    #[error("group {group}: incomplete position: {reason}")]
    Incomplete { group: usize, reason: String },

    /// A grid header with a zero dimension, or one larger than
    /// [`MAX_GRID_SIZE`].
    #[error("group {group}: invalid grid size {cols}x{rows}")]
    InvalidGrid { group: usize, cols: u32, rows: u32 },
}

impl GrammarError {
    fn incomplete(group: usize, reason: impl Into<String>) -> Self {
        GrammarError::Incomplete {
            group,
            reason: reason.into(),
        }
    }
}

/// A single lexical token inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Header { cols: u32, rows: u32 },
    Coord { col: u32, row: u32 },
}

fn parse_number(s: &str, what: &str, token: &str, group: usize) -> Result<u32, GrammarError> {
    s.parse()
        .map_err(|_| GrammarError::incomplete(group, format!("invalid {} in {:?}", what, token)))
}

fn lex(token: &str, group: usize) -> Result<Token, GrammarError> {
    if let Some((c, r)) = token.split_once(':') {
        let col = parse_number(c, "column", token, group)?;
        let row = parse_number(r, "row", token, group)?;
        return Ok(Token::Coord { col, row });
    }
    if let Some((w, h)) = token.split_once(['x', 'X']) {
        let cols = parse_number(w, "grid width", token, group)?;
        let rows = parse_number(h, "grid height", token, group)?;
        if cols == 0 || rows == 0 || cols > MAX_GRID_SIZE || rows > MAX_GRID_SIZE {
            return Err(GrammarError::InvalidGrid { group, cols, rows });
        }
        return Ok(Token::Header { cols, rows });
    }
    Err(GrammarError::incomplete(
        group,
        format!("unexpected token {:?}", token),
    ))
}

/// A coordinate waiting to learn whether it starts a span.
#[derive(Debug, Clone, Copy)]
struct Pending {
    col: u32,
    row: u32,
    cols: u32,
    rows: u32,
}

impl Pending {
    fn into_unit(self) -> GridCell {
        GridCell::unit(self.col, self.row, self.cols, self.rows)
    }
}

/// Parse a grid spec into its cells, in textual order.
///
/// Empty groups are skipped, so `""` parses to an empty list and a trailing
/// comma is harmless.  A group with only a header switches the grid without
/// producing a cell.
pub fn parse(spec: &str) -> Result<Vec<GridCell>, GrammarError> {
    let mut cells = Vec::new();
    let mut grid: Option<(u32, u32)> = None;

    for (index, text) in spec.split(',').enumerate() {
        let group = index + 1;
        let mut pending: Option<Pending> = None;
        // Set once the group has produced a span; a further coordinate is an
        // error until a header starts a fresh run.
        let mut closed = false;

        for token in text.split_whitespace() {
            match lex(token, group)? {
                Token::Header { cols, rows } => {
                    if let Some(p) = pending.take() {
                        cells.push(p.into_unit());
                    }
                    grid = Some((cols, rows));
                    closed = false;
                }
                Token::Coord { col, row } => {
                    let (cols, rows) = grid.ok_or_else(|| {
                        GrammarError::incomplete(
                            group,
                            format!("coordinate {:?} before any grid size", token),
                        )
                    })?;
                    if closed {
                        return Err(GrammarError::incomplete(
                            group,
                            "more than two positions in one group",
                        ));
                    }
                    if col >= cols || row >= rows {
                        return Err(GrammarError::OutsideGrid {
                            group,
                            col,
                            row,
                            cols,
                            rows,
                        });
                    }
                    match pending.take() {
                        None => {
                            pending = Some(Pending {
                                col,
                                row,
                                cols,
                                rows,
                            })
                        }
                        Some(start) => {
                            cells.push(span(group, start, col, row)?);
                            closed = true;
                        }
                    }
                }
            }
        }

        if let Some(p) = pending {
            cells.push(p.into_unit());
        }
    }

    Ok(cells)
}

fn span(group: usize, start: Pending, end_col: u32, end_row: u32) -> Result<GridCell, GrammarError> {
    if end_col < start.col || end_row < start.row {
        return Err(GrammarError::EndBeforeStart {
            group,
            start_col: start.col,
            start_row: start.row,
            end_col,
            end_row,
        });
    }
    Ok(GridCell {
        x: start.col,
        y: start.row,
        width: end_col - start.col + 1,
        height: end_row - start.row + 1,
        grid_cols: start.cols,
        grid_rows: start.rows,
    })
}

//  Tests
