use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Identified;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Texture {
    pub id: String,
    pub source: Option<usize>,
    pub sampler: Option<usize>,
    pub other: Map<String, Value>,
}

impl Texture {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl Identified for Texture {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TextureJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampler: Option<usize>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Texture {
    pub(crate) fn from_json(index: usize, json: TextureJson) -> Self {
        Self {
            id: index.to_string(),
            source: json.source,
            sampler: json.sampler,
            other: json.other,
        }
    }

    pub(crate) fn to_json(&self) -> TextureJson {
        TextureJson {
            source: self.source,
            sampler: self.sampler,
            other: self.other.clone(),
        }
    }
}
