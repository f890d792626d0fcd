use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::parse_object;
use crate::{json::Document, Error, ExtensionDeserializer, ExtensionSerializer, Result};

pub const DRACO_MESH_COMPRESSION_NAME: &str = "KHR_draco_mesh_compression";

/// Declares that a primitive's geometry is Draco-compressed in a buffer view.
///
/// Both fields are required on the wire; there are no defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DracoMeshCompression {
    pub buffer_view_id: String,
    /// Attribute semantic (`POSITION`, `NORMAL`, ...) to Draco attribute id.
    pub attributes: HashMap<String, u32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DracoMeshCompressionJson {
    buffer_view: usize,
    attributes: HashMap<String, u32>,
}

impl DracoMeshCompression {
    pub fn new(buffer_view_id: impl Into<String>) -> Self {
        Self {
            buffer_view_id: buffer_view_id.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, id: u32) -> Self {
        self.attributes.insert(name.into(), id);
        self
    }
}

pub fn serialize_draco_mesh_compression(
    draco: &DracoMeshCompression,
    doc: &Document,
    _ser: &ExtensionSerializer,
) -> Result<String> {
    let buffer_view =
        doc.buffer_views
            .index_of(&draco.buffer_view_id)
            .ok_or_else(|| Error::DanglingReference {
                extension: DRACO_MESH_COMPRESSION_NAME,
                kind: "bufferView",
                id: draco.buffer_view_id.clone(),
            })?;

    let json = DracoMeshCompressionJson {
        buffer_view,
        attributes: draco.attributes.clone(),
    };

    Ok(serde_json::to_string(&json)?)
}

pub fn deserialize_draco_mesh_compression(
    json: &str,
    _de: &ExtensionDeserializer,
) -> Result<DracoMeshCompression> {
    let json: DracoMeshCompressionJson = parse_object(json, DRACO_MESH_COMPRESSION_NAME)?;

    Ok(DracoMeshCompression {
        buffer_view_id: json.buffer_view.to_string(),
        attributes: json.attributes,
    })
}

#[cfg(test)]
use crate::{json::BufferView, khr_deserializer, khr_serializer};

#[test]
fn required_fields() {
    let de = khr_deserializer();

    for json in [
        r#"{ "attributes": { "POSITION": 0 } }"#,
        r#"{ "bufferView": 1 }"#,
        r#"{ "bufferView": 1, "attributes": [0, 1] }"#,
        r#"{ "bufferView": 1, "attributes": { "POSITION": "zero" } }"#,
        r#"{ "bufferView": 1, "attributes": { "POSITION": -1 } }"#,
        r#"{ "bufferView": "1", "attributes": { "POSITION": 0 } }"#,
    ] {
        assert!(
            matches!(
                deserialize_draco_mesh_compression(json, &de),
                Err(Error::Schema {
                    extension: DRACO_MESH_COMPRESSION_NAME,
                    ..
                })
            ),
            "{json}"
        );
    }
}

#[test]
fn schema_errors_name_the_field() {
    let err = deserialize_draco_mesh_compression(
        r#"{ "bufferView": 1, "attributes": { "POSITION": "zero" } }"#,
        &khr_deserializer(),
    )
    .unwrap_err();

    assert!(matches!(&err, Error::Schema { path, .. } if path == "attributes.POSITION"));
    assert!(err.to_string().contains("`attributes.POSITION`"), "{err}");
}

#[test]
fn missing_buffer_view_is_reported() {
    let err = deserialize_draco_mesh_compression(
        r#"{ "attributes": { "POSITION": 0 } }"#,
        &khr_deserializer(),
    )
    .unwrap_err();

    assert!(err.to_string().contains("bufferView"));
}

#[test]
fn buffer_view_must_exist() {
    let draco = DracoMeshCompression::new("7").with_attribute("POSITION", 0);

    assert!(matches!(
        serialize_draco_mesh_compression(&draco, &Document::default(), &khr_serializer()),
        Err(Error::DanglingReference { id, .. }) if id == "7"
    ));
}

#[test]
fn round_trip() -> Result<()> {
    let mut doc = Document::default();
    for id in ["0", "1"] {
        doc.buffer_views.push(BufferView {
            id: id.to_string(),
            ..Default::default()
        })?;
    }

    let draco = DracoMeshCompression::new("1")
        .with_attribute("POSITION", 0)
        .with_attribute("NORMAL", 1)
        .with_attribute("TEXCOORD_0", 2);

    let json = serialize_draco_mesh_compression(&draco, &doc, &khr_serializer())?;
    let value: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(value["bufferView"], serde_json::json!(1));

    assert_eq!(deserialize_draco_mesh_compression(&json, &khr_deserializer())?, draco);

    Ok(())
}
