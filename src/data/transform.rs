//! Dataset transforms used by sorting.
//!
//! Transforms never touch their input: they return a fresh, reordered copy.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::{CellValue, Record};

/// Direction of a sort transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Stable sort of a copy of `records` by `key`.
///
/// Values are compared through [`sort_value`]. Records whose value has no
/// sort key stay after every comparable record in both directions, keeping
/// their relative order.
pub fn sort_records(records: &[Record], key: &str, order: SortOrder, is_date: bool) -> Vec<Record> {
    let mut keyed: Vec<(Option<f64>, &Record)> = records
        .iter()
        .map(|record| (record.get(key).and_then(|v| sort_value(v, is_date)), record))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => {
            let ord = a.partial_cmp(b).unwrap_or(Ordering::Equal);
            match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    keyed
        .into_iter()
        .map(|(_, record)| record.clone())
        .collect()
}

/// Sort key of a single value.
///
/// Date fields compare by timestamp (falling back to a numeric parse);
/// everything else by numeric value (falling back to a date parse).
pub fn sort_value(value: &CellValue, is_date: bool) -> Option<f64> {
    match value {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Text(text) if is_date => parse_timestamp(text).or_else(|| value.as_f64()),
        CellValue::Text(text) => value.as_f64().or_else(|| parse_timestamp(text)),
        _ => None,
    }
}

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Milliseconds since the epoch for the date shapes hosts send.
fn parse_timestamp(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis() as f64);
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.and_utc().timestamp_millis() as f64);
        }
    }

    // Year-month values ("2024-03") sort as the first of the month.
    let padded;
    let candidate = if text.len() == 7 && text.as_bytes().get(4) == Some(&b'-') {
        padded = format!("{text}-01");
        padded.as_str()
    } else {
        text
    };
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(candidate, fmt) {
            let midnight = date.and_hms_opt(0, 0, 0)?;
            return Some(midnight.and_utc().timestamp_millis() as f64);
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::float_cmp)]
mod tests {
    use super::*;

    fn records(values: &[CellValue]) -> Vec<Record> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let mut r = Record::new();
                r.insert("id".into(), CellValue::Number(i as f64));
                r.insert("v".into(), v.clone());
                r
            })
            .collect()
    }

    fn ids(records: &[Record]) -> Vec<f64> {
        records.iter().map(|r| r["id"].as_f64().unwrap()).collect()
    }

    #[test]
    fn test_numeric_sort_is_stable() {
        let input = records(&[
            CellValue::Number(3.0),
            CellValue::Number(1.0),
            CellValue::from("3"),
            CellValue::Number(2.0),
        ]);
        let asc = sort_records(&input, "v", SortOrder::Ascending, false);
        assert_eq!(ids(&asc), [1.0, 3.0, 0.0, 2.0]);
        let desc = sort_records(&input, "v", SortOrder::Descending, false);
        assert_eq!(ids(&desc), [0.0, 2.0, 3.0, 1.0]);
        // Input untouched.
        assert_eq!(ids(&input), [0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_missing_values_sort_last() {
        let input = records(&[CellValue::Null, CellValue::Number(5.0), CellValue::Number(1.0)]);
        assert_eq!(
            ids(&sort_records(&input, "v", SortOrder::Ascending, false)),
            [2.0, 1.0, 0.0]
        );
        assert_eq!(
            ids(&sort_records(&input, "v", SortOrder::Descending, false)),
            [1.0, 2.0, 0.0]
        );
    }

    #[test]
    fn test_date_sort() {
        let input = records(&[
            CellValue::from("2024-03-01"),
            CellValue::from("2023/12/31"),
            CellValue::from("2024-01"),
        ]);
        let asc = sort_records(&input, "v", SortOrder::Ascending, true);
        assert_eq!(ids(&asc), [1.0, 2.0, 0.0]);
    }

    #[test]
    fn test_sort_value_fallbacks() {
        assert_eq!(sort_value(&CellValue::from("42"), true), Some(42.0));
        assert!(sort_value(&CellValue::from("2020-01-01"), false).is_some());
        assert_eq!(sort_value(&CellValue::from("n/a"), false), None);
        assert_eq!(sort_value(&CellValue::Bool(true), false), None);
    }
}
