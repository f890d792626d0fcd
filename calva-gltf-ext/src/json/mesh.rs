use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::{raw_extensions, resolve, Document, Material};
use crate::{
    extensions::{Extensions, Target},
    ExtensionDeserializer, ExtensionSerializer, Identified, Result,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub id: String,
    pub name: String,
    pub primitives: Vec<MeshPrimitive>,
    pub other: Map<String, Value>,
}

impl Identified for Mesh {
    fn id(&self) -> &str {
        &self.id
    }
}

/// `attributes` and `indices` are accessor indices; accessors are kept as
/// unmodelled document members.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshPrimitive {
    pub attributes: HashMap<String, usize>,
    pub indices: Option<usize>,
    pub material_id: Option<String>,
    pub extensions: Extensions,
    pub other: Map<String, Value>,
}

impl MeshPrimitive {
    pub fn material<'a: 'b, 'b>(&'a self, doc: &'b Document) -> Option<&'b Material> {
        self.material_id.as_ref().and_then(|id| doc.materials.get(id))
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MeshJson {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub primitives: Vec<MeshPrimitiveJson>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MeshPrimitiveJson {
    pub attributes: HashMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indices: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Mesh {
    pub(crate) fn from_json(
        index: usize,
        json: MeshJson,
        de: &ExtensionDeserializer,
    ) -> Result<Self> {
        let primitives = json
            .primitives
            .into_iter()
            .map(|primitive| {
                Ok(MeshPrimitive {
                    attributes: primitive.attributes,
                    indices: primitive.indices,
                    material_id: primitive.material.map(|index| index.to_string()),
                    extensions: raw_extensions(primitive.extensions, Target::MeshPrimitive, de)?,
                    other: primitive.other,
                })
            })
            .collect::<Result<_>>()?;

        Ok(Self {
            id: index.to_string(),
            name: json.name,
            primitives,
            other: json.other,
        })
    }

    pub(crate) fn to_json(&self, doc: &Document, ser: &ExtensionSerializer) -> Result<MeshJson> {
        let primitives = self
            .primitives
            .iter()
            .map(|primitive| {
                Ok(MeshPrimitiveJson {
                    attributes: primitive.attributes.clone(),
                    indices: primitive.indices,
                    material: primitive
                        .material_id
                        .as_ref()
                        .and_then(|id| resolve(&doc.materials, "Material", id)),
                    extensions: ser.serialize_all(
                        &primitive.extensions,
                        Target::MeshPrimitive,
                        doc,
                    )?,
                    other: primitive.other.clone(),
                })
            })
            .collect::<Result<_>>()?;

        Ok(MeshJson {
            name: self.name.clone(),
            primitives,
            other: self.other.clone(),
        })
    }
}

#[test]
fn material_is_referenced_by_id() -> Result<()> {
    let mut doc = Document::default();
    doc.materials.push(Material::new("unused"))?;
    doc.materials.push(Material::new("brick"))?;

    let mesh = Mesh {
        id: "wall".into(),
        primitives: vec![
            MeshPrimitive {
                material_id: Some("brick".into()),
                ..Default::default()
            },
            MeshPrimitive {
                material_id: Some("gone".into()),
                ..Default::default()
            },
        ],
        ..Default::default()
    };

    assert_eq!(mesh.primitives[0].material(&doc).map(|m| m.id.as_str()), Some("brick"));

    let json = mesh.to_json(&doc, &crate::khr_serializer())?;
    assert_eq!(json.primitives[0].material, Some(1));
    assert_eq!(json.primitives[1].material, None);

    Ok(())
}
