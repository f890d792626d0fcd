use serde::{Deserialize, Serialize};

use super::{Punctual, LIGHTS_PUNCTUAL_NAME};
use crate::{
    extensions::parse_object, json::Document, Error, ExtensionDeserializer, ExtensionSerializer,
    Result,
};

/// Node-level `KHR_lights_punctual`: a reference into the document's lights.
///
/// The id is not checked when parsing; it is resolved by [`LightNode::light`]
/// and when the node is written back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LightNode {
    pub light_id: String,
}

impl LightNode {
    pub fn new(light_id: impl Into<String>) -> Self {
        Self {
            light_id: light_id.into(),
        }
    }

    pub fn light<'a>(&self, doc: &'a Document) -> Result<&'a Punctual> {
        doc.lights()
            .and_then(|lights| lights.lights.get(&self.light_id))
            .ok_or_else(|| self.dangling())
    }

    fn dangling(&self) -> Error {
        Error::DanglingReference {
            extension: LIGHTS_PUNCTUAL_NAME,
            kind: "light",
            id: self.light_id.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LightNodeJson {
    light: usize,
}

pub fn serialize_for_node(
    node: &LightNode,
    doc: &Document,
    _ser: &ExtensionSerializer,
) -> Result<String> {
    let light = doc
        .lights()
        .and_then(|lights| lights.lights.index_of(&node.light_id))
        .ok_or_else(|| node.dangling())?;

    Ok(serde_json::to_string(&LightNodeJson { light })?)
}

pub fn deserialize_light_node(json: &str, _de: &ExtensionDeserializer) -> Result<LightNode> {
    let json: LightNodeJson = parse_object(json, LIGHTS_PUNCTUAL_NAME)?;

    Ok(LightNode::new(json.light.to_string()))
}
