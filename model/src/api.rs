// Bodies exchanged between the frontend and the backend over HTTP

use serde::{Deserialize, Serialize};

use crate::converter::Unit;
use crate::history::ConversionRecord;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ConvertRequest {
    pub value: f64,
    pub unit: Unit,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SessionOpened {
    pub session_id: String,
}

// A record along with the line used to display it.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub record: ConversionRecord,
    pub line: String,
}

impl From<&ConversionRecord> for HistoryEntry {
    fn from(record: &ConversionRecord) -> Self {
        Self {
            record: record.clone(),
            line: record.to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Converted {
    pub entry: HistoryEntry,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct History {
    pub entries: Vec<HistoryEntry>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
