//! Events a table emits to its host.

use std::rc::Rc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::cell::CellData;
use crate::data::CellValue;

/// Whether a selection picked a field name or a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectedType {
    Key,
    Value,
}

/// Raw data behind one selected cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedDatum {
    pub data_index: Option<usize>,
    pub key: String,
    pub value: CellValue,
}

impl From<&CellData> for SelectedDatum {
    fn from(data: &CellData) -> Self {
        Self {
            data_index: data.data_index,
            key: data.key.clone(),
            value: data.value.clone(),
        }
    }
}

/// Payload of `cell:selected`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub data: Vec<SelectedDatum>,
    pub selected_value: CellValue,
    pub selected_type: SelectedType,
}

/// Envelope category of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    DataTransfer,
    ViewUpdate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    CellSelected(Selection),
    PageChanged { page: usize },
    TreeSelected { id: String },
    CellExpand { is_expand: bool },
}

impl TableEvent {
    /// Name hosts subscribe with.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CellSelected(_) => "cell:selected",
            Self::PageChanged { .. } => "page:changed",
            Self::TreeSelected { .. } => "tree:selected",
            Self::CellExpand { .. } => "cell:expand",
        }
    }

    pub const fn event_type(&self) -> EventType {
        match self {
            Self::CellSelected(_) => EventType::DataTransfer,
            Self::PageChanged { .. } | Self::TreeSelected { .. } | Self::CellExpand { .. } => {
                EventType::ViewUpdate
            }
        }
    }

    /// JSON payload as delivered to hosts.
    pub fn payload(&self) -> Value {
        let kind = self.event_type();
        match self {
            Self::CellSelected(selection) => json!({ "type": kind, "data": selection }),
            Self::PageChanged { page } => json!({ "type": kind, "page": page }),
            Self::TreeSelected { id } => json!({ "type": kind, "id": id }),
            Self::CellExpand { is_expand } => json!({ "type": kind, "isExpand": is_expand }),
        }
    }
}

/// Host callback for table events.
pub type EventListener = Rc<dyn Fn(&TableEvent)>;
