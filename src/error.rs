//! Structured error types for dvtable.
//!
//! Most of the engine is defensive (missing config falls back to defaults),
//! so errors are reserved for caller data-integrity bugs and invalid setups.

/// All errors that can occur while configuring or laying out a table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Per-column measurement arrays disagree on length.
    #[error("measurement array {index} has {found} entries, expected {expected}")]
    MeasurementMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    /// Invalid table configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON (de)serialization failure.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The render surface is unavailable.
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TableError>;

#[cfg(target_arch = "wasm32")]
impl From<TableError> for wasm_bindgen::JsValue {
    fn from(e: TableError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
