//! Column width resolution.
//!
//! A column's natural width is the widest of its header and content
//! measurements, capped at [`MAX_COL_WIDTH`]. When the natural widths leave
//! part of the viewport empty, the remainder is spread over a set of
//! receiving columns chosen by the variant.

use super::metrics::MAX_COL_WIDTH;
use crate::error::{Result, TableError};

/// Space a grid has to fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidthBudget {
    pub viewport: f64,
    /// Width taken by a vertical scrollbar, zero when there is none.
    pub scrollbar: f64,
}

impl WidthBudget {
    pub fn new(viewport: f64) -> Self {
        Self {
            viewport,
            scrollbar: 0.0,
        }
    }

    #[must_use]
    pub fn with_scrollbar(mut self, scrollbar: f64) -> Self {
        self.scrollbar = scrollbar;
        self
    }

    /// Whether natural widths summing to `sum` leave space to fill.
    pub fn underfilled(&self, sum: f64) -> bool {
        sum < self.viewport
    }

    /// Share of the leftover space for each of `receivers` columns.
    pub fn offset(&self, sum: f64, receivers: usize) -> f64 {
        if receivers == 0 {
            return 0.0;
        }
        (self.viewport - sum - self.scrollbar) / receivers as f64
    }
}

/// Natural width of a column.
pub fn natural_width(header: f64, contents: impl IntoIterator<Item = f64>) -> f64 {
    contents
        .into_iter()
        .fold(header, f64::max)
        .min(MAX_COL_WIDTH)
}

/// Column-wise maximum of per-key measurement arrays, each capped at
/// [`MAX_COL_WIDTH`]. Returns the widths and their sum.
///
/// Every array holds one measurement per visual column; arrays of differing
/// lengths are a caller bug and fail with [`TableError::MeasurementMismatch`].
pub fn find_max_at_indices(measurements: &[Vec<f64>]) -> Result<(Vec<f64>, f64)> {
    let Some(first) = measurements.first() else {
        return Ok((Vec::new(), 0.0));
    };
    let expected = first.len();
    if let Some((index, found)) = measurements
        .iter()
        .map(Vec::len)
        .enumerate()
        .find(|(_, len)| *len != expected)
    {
        return Err(TableError::MeasurementMismatch {
            index,
            expected,
            found,
        });
    }

    let widths: Vec<f64> = (0..expected)
        .map(|i| {
            measurements
                .iter()
                .filter_map(|m| m.get(i).copied())
                .fold(0.0, f64::max)
                .min(MAX_COL_WIDTH)
        })
        .collect();
    let sum = widths.iter().sum();
    Ok((widths, sum))
}

/// Add the leftover space to columns already at the cap, or to every column
/// when none is. Returns whether anything was added.
pub fn compensate_capped(widths: &mut [f64], budget: WidthBudget) -> bool {
    let sum: f64 = widths.iter().sum();
    if !budget.underfilled(sum) {
        return false;
    }
    let capped: Vec<usize> = widths
        .iter()
        .enumerate()
        .filter(|(_, w)| **w >= MAX_COL_WIDTH)
        .map(|(i, _)| i)
        .collect();
    let receivers: Vec<usize> = if capped.is_empty() {
        (0..widths.len()).collect()
    } else {
        capped
    };
    spread(widths, &receivers, budget.offset(sum, receivers.len()));
    true
}

/// Split the leftover space equally across every column except the first
/// `skip` ones; across all columns when that leaves none.
pub fn compensate_body(widths: &mut [f64], skip: usize, budget: WidthBudget) -> bool {
    let sum: f64 = widths.iter().sum();
    if !budget.underfilled(sum) {
        return false;
    }
    let receivers: Vec<usize> = if widths.len() > skip {
        (skip..widths.len()).collect()
    } else {
        (0..widths.len()).collect()
    };
    spread(widths, &receivers, budget.offset(sum, receivers.len()));
    true
}

fn spread(widths: &mut [f64], receivers: &[usize], offset: f64) {
    for i in receivers {
        if let Some(w) = widths.get_mut(*i) {
            *w += offset;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(40.0, &[10.0, 80.0], 80.0 ; "content wins")]
    #[test_case(90.0, &[10.0], 90.0 ; "header wins")]
    #[test_case(40.0, &[500.0], MAX_COL_WIDTH ; "capped")]
    fn test_natural_width(header: f64, contents: &[f64], expected: f64) {
        assert_eq!(natural_width(header, contents.iter().copied()), expected);
    }

    #[test]
    fn test_find_max_at_indices() {
        let (widths, sum) =
            find_max_at_indices(&[vec![10.0, 250.0, 30.0], vec![20.0, 5.0, 25.0]]).unwrap();
        assert_eq!(widths, vec![20.0, 200.0, 30.0]);
        assert_eq!(sum, 250.0);
    }

    #[test]
    fn test_find_max_at_indices_rejects_ragged_input() {
        let err = find_max_at_indices(&[vec![1.0, 2.0], vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            TableError::MeasurementMismatch {
                index: 1,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_compensate_capped_prefers_capped_columns() {
        let mut widths = vec![100.0, 200.0, 50.0];
        assert!(compensate_capped(&mut widths, WidthBudget::new(500.0)));
        assert_eq!(widths, vec![100.0, 350.0, 50.0]);
    }

    #[test]
    fn test_compensate_capped_falls_back_to_all() {
        let mut widths = vec![100.0, 50.0];
        compensate_capped(&mut widths, WidthBudget::new(300.0).with_scrollbar(10.0));
        assert_eq!(widths, vec![170.0, 120.0]);
    }

    #[test]
    fn test_compensate_body_skips_row_headers() {
        let mut widths = vec![80.0, 60.0, 60.0];
        assert!(compensate_body(&mut widths, 1, WidthBudget::new(400.0)));
        assert_eq!(widths, vec![80.0, 160.0, 160.0]);
        assert!(widths.iter().sum::<f64>() >= 400.0);
    }

    #[test]
    fn test_no_compensation_when_full() {
        let mut widths = vec![300.0, 300.0];
        assert!(!compensate_body(&mut widths, 1, WidthBudget::new(500.0)));
        assert_eq!(widths, vec![300.0, 300.0]);
    }
}
