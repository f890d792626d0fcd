use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::is_default;
use crate::Identified;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferView {
    pub id: String,
    pub buffer: usize,
    pub byte_length: usize,
    pub byte_offset: usize,
    pub other: Map<String, Value>,
}

impl Identified for BufferView {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BufferViewJson {
    pub buffer: usize,
    pub byte_length: usize,
    #[serde(default, skip_serializing_if = "is_default")]
    pub byte_offset: usize,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl BufferView {
    pub(crate) fn from_json(index: usize, json: BufferViewJson) -> Self {
        Self {
            id: index.to_string(),
            buffer: json.buffer,
            byte_length: json.byte_length,
            byte_offset: json.byte_offset,
            other: json.other,
        }
    }

    pub(crate) fn to_json(&self) -> BufferViewJson {
        BufferViewJson {
            buffer: self.buffer,
            byte_length: self.byte_length,
            byte_offset: self.byte_offset,
            other: self.other.clone(),
        }
    }
}
