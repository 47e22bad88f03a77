//! Display-text transformation for cell values.
//!
//! Numbers are never formatted here: numeric fields go through the host's
//! [`FormatData`] hook. This module only decides placeholders, units for
//! non-numeric fields, and strips inline markup before measuring.

use std::borrow::Cow;

use super::CellValue;
use crate::config::{DataMetaInfo, FormatData};

/// Rendered for missing values and empty strings.
pub const PLACEHOLDER: &str = "--";

/// Transform a raw value into the text a cell shows.
///
/// - missing value or `""` → [`PLACEHOLDER`]
/// - explicit `null` → empty string
/// - numeric field → `format(key, value, show_unit)`
/// - anything else → plain text, with the unit appended when `show_unit`
pub fn display_text(
    key: &str,
    value: Option<&CellValue>,
    show_unit: bool,
    meta: &DataMetaInfo,
    format: &FormatData,
) -> String {
    let Some(value) = value else {
        return PLACEHOLDER.to_string();
    };
    if value.is_empty_text() {
        return PLACEHOLDER.to_string();
    }
    if value.is_null() {
        return String::new();
    }

    let field = meta.get(key);
    if field.is_some_and(|f| f.is_number()) {
        return strip_markup(&format.call(key, value, show_unit)).into_owned();
    }

    let mut text = strip_markup(&value.to_plain_string()).into_owned();
    if show_unit {
        if let Some(unit) = field.and_then(|f| f.unit.as_deref()) {
            text.push_str(unit);
        }
    }
    text
}

/// Header label for a field, with its unit in parentheses when one exists.
pub fn labelled_header(key: &str, meta: &DataMetaInfo) -> String {
    match meta.get(key).and_then(|f| f.unit.as_deref()) {
        Some(unit) if !unit.is_empty() => format!("{key} ({unit})"),
        _ => key.to_string(),
    }
}

/// Remove inline HTML tags and decode the handful of entities hosts emit.
///
/// Returns the input untouched when it contains neither tags nor entities.
pub fn strip_markup(text: &str) -> Cow<'_, str> {
    if !text.contains('<') && !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for ch in text.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }

    if out.contains('&') {
        out = out
            .replace("&nbsp;", "\u{a0}")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&");
    }
    Cow::Owned(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::FieldMeta;
    use test_case::test_case;

    fn meta() -> DataMetaInfo {
        let mut meta = DataMetaInfo::new();
        meta.insert("revenue".into(), FieldMeta::number(Some("%")));
        meta.insert("city".into(), FieldMeta::text(Some("市")));
        meta
    }

    fn hook() -> FormatData {
        FormatData::new(|_, value, show_unit| {
            let n = value.as_f64().unwrap_or_default();
            if show_unit {
                format!("{n:.1}%")
            } else {
                format!("{n:.1}")
            }
        })
    }

    #[test_case(None, "--" ; "missing")]
    #[test_case(Some(&CellValue::Text(String::new())), "--" ; "empty string")]
    #[test_case(Some(&CellValue::Null), "" ; "null")]
    fn test_placeholders(value: Option<&CellValue>, expected: &str) {
        assert_eq!(
            display_text("city", value, true, &meta(), &hook()),
            expected
        );
    }

    #[test]
    fn test_numeric_fields_use_hook() {
        let value = CellValue::Number(12.345);
        assert_eq!(
            display_text("revenue", Some(&value), true, &meta(), &hook()),
            "12.3%"
        );
        assert_eq!(
            display_text("revenue", Some(&value), false, &meta(), &hook()),
            "12.3"
        );
    }

    #[test]
    fn test_text_fields_append_unit() {
        let value = CellValue::from("杭州");
        assert_eq!(
            display_text("city", Some(&value), true, &meta(), &hook()),
            "杭州市"
        );
        assert_eq!(
            display_text("city", Some(&value), false, &meta(), &hook()),
            "杭州"
        );
    }

    #[test]
    fn test_labelled_header() {
        assert_eq!(labelled_header("revenue", &meta()), "revenue (%)");
        assert_eq!(labelled_header("other", &meta()), "other");
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(strip_markup("plain"), "plain");
        assert_eq!(strip_markup("<b>bold</b> &amp; <i>it</i>"), "bold & it");
    }
}
