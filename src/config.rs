//! Table configuration.
//!
//! Everything a host passes at construction, deserializable from the same
//! camelCase JSON shape the JavaScript API accepts. Optional sections fall
//! back to defaults instead of erroring.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::data::{CellValue, TableData};
use crate::error::{Result, TableError};

/// Default rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Default table max height in pixels.
pub const DEFAULT_MAX_HEIGHT: f64 = 520.0;
/// Default table width in pixels.
pub const DEFAULT_WIDTH: f64 = 570.0;
/// Default logical sub-columns of a horizontal table (one key/value pair).
pub const DEFAULT_COLUMNS_NUM: usize = 2;

/// Which layout strategy renders the table (`tableType` in JSON).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutKind {
    /// Key/value pairs of the first record.
    #[default]
    Horizontal,
    /// One column per field, one row per record.
    Vertical,
    /// Records as rows with a row-header column.
    MultiX,
    /// Records as columns, fields as row headers.
    MultiY,
    /// Like `MultiY` with collapsible hierarchical row headers.
    Tree,
}

/// Semantic type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Number,
    String,
    Date,
    Percentage,
}

/// Metadata for one field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldMeta {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<FieldKind>,
    pub unit: Option<String>,
    pub format: Option<String>,
    /// Legacy flag form of `type: "number"`.
    pub is_number: bool,
    /// Legacy flag form of `type: "date"`.
    pub is_date: bool,
}

impl FieldMeta {
    pub fn number(unit: Option<&str>) -> Self {
        Self {
            kind: Some(FieldKind::Number),
            unit: unit.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn text(unit: Option<&str>) -> Self {
        Self {
            kind: Some(FieldKind::String),
            unit: unit.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn date() -> Self {
        Self {
            kind: Some(FieldKind::Date),
            ..Self::default()
        }
    }

    /// Numeric fields (percentages included) are formatted by the host hook.
    pub fn is_number(&self) -> bool {
        self.is_number || matches!(self.kind, Some(FieldKind::Number | FieldKind::Percentage))
    }

    pub fn is_date(&self) -> bool {
        self.is_date || matches!(self.kind, Some(FieldKind::Date))
    }

    /// Numeric and date fields get a sort affordance.
    pub fn is_sortable(&self) -> bool {
        self.is_number() || self.is_date()
    }
}

/// Field key to metadata.
pub type DataMetaInfo = HashMap<String, FieldMeta>;

/// Host number-formatting hook: `(key, raw value, show unit) -> text`.
pub type FormatFn = dyn Fn(&str, &CellValue, bool) -> String;

/// Shared handle to the host's [`FormatFn`].
#[derive(Clone)]
pub struct FormatData(Rc<FormatFn>);

impl FormatData {
    pub fn new(f: impl Fn(&str, &CellValue, bool) -> String + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, key: &str, value: &CellValue, show_unit: bool) -> String {
        (self.0)(key, value, show_unit)
    }
}

impl Default for FormatData {
    /// Prints numbers in shortest form and ignores units.
    fn default() -> Self {
        Self::new(|_, value, _| value.to_plain_string())
    }
}

impl fmt::Debug for FormatData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FormatData(..)")
    }
}

/// The dataset and its shape description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableOption {
    pub data: TableData,
    /// Fields laid out as rows (horizontal, multiY, tree).
    pub rows: Vec<String>,
    /// Fields laid out as columns (vertical, multiX) or column labels (multiY, tree).
    pub columns: Vec<String>,
    pub data_meta_info: DataMetaInfo,
    /// Logical sub-columns of a horizontal table; must be even.
    pub columns_num: Option<usize>,
}

impl TableOption {
    pub fn meta(&self, key: &str) -> Option<&FieldMeta> {
        self.data_meta_info.get(key)
    }
}

/// Pagination settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PaginationOptions {
    pub page_size: usize,
    pub current_page: usize,
    /// Defaults to the dataset length.
    pub total_count: Option<usize>,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            current_page: 1,
            total_count: None,
        }
    }
}

/// Outer box of the table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableStyle {
    pub max_height: f64,
    pub width: f64,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            max_height: DEFAULT_MAX_HEIGHT,
            width: DEFAULT_WIDTH,
        }
    }
}

/// Complete table configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableConfig {
    pub option: TableOption,
    pub table_type: LayoutKind,
    pub pagination: PaginationOptions,
    pub table_style: TableStyle,
    /// Styling variables forwarded to the surface as CSS custom properties.
    pub token: Option<serde_json::Value>,
    #[serde(skip)]
    pub format_data: FormatData,
}

impl TableConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Replace the formatting hook.
    #[must_use]
    pub fn with_format_data(mut self, format: FormatData) -> Self {
        self.format_data = format;
        self
    }

    /// Logical sub-columns for horizontal tables.
    pub fn columns_num(&self) -> usize {
        self.option.columns_num.unwrap_or(DEFAULT_COLUMNS_NUM)
    }

    /// Fill defaults for degenerate values and reject unusable setups.
    pub fn validate(&mut self) -> Result<()> {
        if self.pagination.page_size == 0 {
            self.pagination.page_size = DEFAULT_PAGE_SIZE;
        }
        if self.pagination.current_page == 0 {
            self.pagination.current_page = 1;
        }
        if !(self.table_style.width.is_finite() && self.table_style.width > 0.0) {
            self.table_style.width = DEFAULT_WIDTH;
        }
        if !(self.table_style.max_height.is_finite() && self.table_style.max_height > 0.0) {
            self.table_style.max_height = DEFAULT_MAX_HEIGHT;
        }

        match self.table_type {
            LayoutKind::Horizontal => {
                let n = self.columns_num();
                if n == 0 || !n.is_multiple_of(2) {
                    return Err(TableError::Config(format!(
                        "columnsNum must be a positive even number, got {n}"
                    )));
                }
                self.require_flat()
            }
            LayoutKind::Vertical | LayoutKind::MultiX | LayoutKind::MultiY => self.require_flat(),
            LayoutKind::Tree => {
                if self.option.data.tree().is_none() {
                    return Err(TableError::Config(
                        "tree tables need {id, pid, level, rank, value} records".into(),
                    ));
                }
                Ok(())
            }
        }
    }

    fn require_flat(&self) -> Result<()> {
        if self.option.data.flat().is_none() {
            return Err(TableError::Config(format!(
                "{:?} tables need flat records",
                self.table_type
            )));
        }
        Ok(())
    }

    /// String entries of `token.<section>`, e.g. `dvTable` or `dvPagination`.
    pub fn token_vars(&self, section: &str) -> Vec<(String, String)> {
        self.token
            .as_ref()
            .and_then(|t| t.get(section))
            .and_then(serde_json::Value::as_object)
            .map(|vars| {
                vars.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_defaults_from_minimal_json() {
        let config = TableConfig::from_json(r#"{"option": {"data": [{"a": 1}]}}"#).unwrap();
        assert_eq!(config.table_type, LayoutKind::Horizontal);
        assert_eq!(config.pagination.page_size, 10);
        assert_eq!(config.pagination.current_page, 1);
        assert_eq!(config.table_style.max_height, 520.0);
        assert_eq!(config.table_style.width, 570.0);
        assert_eq!(config.columns_num(), 2);
    }

    #[test_case("vertical", LayoutKind::Vertical)]
    #[test_case("multiX", LayoutKind::MultiX)]
    #[test_case("multiY", LayoutKind::MultiY)]
    #[test_case("tree", LayoutKind::Tree)]
    fn test_table_type_names(name: &str, kind: LayoutKind) {
        let json = format!(r#"{{"tableType": "{name}"}}"#);
        assert_eq!(TableConfig::from_json(&json).unwrap().table_type, kind);
    }

    #[test]
    fn test_field_meta_flags() {
        let meta: DataMetaInfo = serde_json::from_str(
            r#"{
                "a": {"type": "percentage"},
                "b": {"isDate": true},
                "c": {"type": "string", "unit": "个"}
            }"#,
        )
        .unwrap();
        assert!(meta["a"].is_number());
        assert!(meta["b"].is_date());
        assert!(meta["b"].is_sortable());
        assert!(!meta["c"].is_sortable());
        assert_eq!(meta["c"].unit.as_deref(), Some("个"));
    }

    #[test]
    fn test_validate_fixes_degenerate_values() {
        let mut config = TableConfig::from_json(
            r#"{"tableType": "vertical", "pagination": {"pageSize": 0, "currentPage": 0}}"#,
        )
        .unwrap();
        config.validate().unwrap();
        assert_eq!(config.pagination.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.pagination.current_page, 1);
    }

    #[test]
    fn test_validate_rejects_odd_columns() {
        let mut config =
            TableConfig::from_json(r#"{"option": {"columnsNum": 3, "data": [{"a": 1}]}}"#).unwrap();
        assert!(matches!(config.validate(), Err(TableError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_shape_mismatch() {
        let mut config =
            TableConfig::from_json(r#"{"tableType": "tree", "option": {"data": [{"a": 1}]}}"#)
                .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_vars() {
        let config = TableConfig::from_json(
            r##"{"token": {"dvTable": {"headerBg": "#fafafa", "size": 3}}}"##,
        )
        .unwrap();
        assert_eq!(
            config.token_vars("dvTable"),
            vec![("headerBg".to_string(), "#fafafa".to_string())]
        );
        assert!(config.token_vars("dvPagination").is_empty());
    }
}
