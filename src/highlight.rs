//! Cross-highlight resolution.
//!
//! Given the cell a pointer is on and every cell of the grid, each resolver
//! returns the indices of the cells that light up together with it. The
//! resolvers are pure: they read grid positions and keys and never touch
//! cell state.

use crate::cell::Cell;

fn position(cell: &Cell) -> Option<(usize, usize)> {
    Some((cell.data.row()?, cell.data.column()?))
}

fn select(cells: &[Cell], keep: impl Fn(&Cell) -> bool) -> Vec<usize> {
    cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| keep(cell))
        .map(|(i, _)| i)
        .collect()
}

/// Key/value pairs: cells sharing key, row and value with the origin.
pub fn pair_links(cells: &[Cell], origin: usize) -> Vec<usize> {
    let Some(o) = cells.get(origin) else {
        return Vec::new();
    };
    select(cells, |c| {
        c.data.key == o.data.key && c.data.row() == o.data.row() && c.data.value == o.data.value
    })
}

/// Every cell of the origin's field.
pub fn same_key(cells: &[Cell], origin: usize) -> Vec<usize> {
    let Some(o) = cells.get(origin) else {
        return Vec::new();
    };
    select(cells, |c| c.data.key == o.data.key)
}

/// Cells in the origin's row at or left of it, plus cells in its column at
/// or below it.
pub fn l_shaped(cells: &[Cell], origin: usize) -> Vec<usize> {
    let Some((r, c)) = cells.get(origin).and_then(position) else {
        return Vec::new();
    };
    select(cells, |cell| match position(cell) {
        Some((row, col)) => (row == r && col <= c) || (col == c && row >= r),
        None => false,
    })
}

pub fn whole_row(cells: &[Cell], origin: usize) -> Vec<usize> {
    let Some(r) = cells.get(origin).and_then(|o| o.data.row()) else {
        return Vec::new();
    };
    select(cells, |c| c.data.row() == Some(r))
}

pub fn whole_column(cells: &[Cell], origin: usize) -> Vec<usize> {
    let Some(col) = cells.get(origin).and_then(|o| o.data.column()) else {
        return Vec::new();
    };
    select(cells, |c| c.data.column() == Some(col))
}

/// Single-header tables: a header lights its field, a body cell its L-shape.
pub fn column_links(cells: &[Cell], origin: usize) -> Vec<usize> {
    match cells.get(origin) {
        Some(o) if o.is_header() => same_key(cells, origin),
        Some(_) => l_shaped(cells, origin),
        None => Vec::new(),
    }
}

/// Two-dimensional tables with row and column headers.
///
/// The corner resolves to nothing.
pub fn cross_links(cells: &[Cell], origin: usize) -> Vec<usize> {
    let Some(role) = cells.get(origin).map(Cell::role) else {
        return Vec::new();
    };
    if role.is_corner() {
        Vec::new()
    } else if role.heads_column() {
        whole_column(cells, origin)
    } else if role.heads_row() {
        whole_row(cells, origin)
    } else {
        l_shaped(cells, origin)
    }
}
