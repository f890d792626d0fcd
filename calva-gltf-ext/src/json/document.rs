use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::*;
use crate::{
    extensions::{Extensions, LightExtension, Target},
    Config, Error, ExtensionDeserializer, ExtensionSerializer, IndexedContainer,
};

fn default_version() -> String {
    "2.0".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Default for Asset {
    fn default() -> Self {
        Self {
            version: default_version(),
            generator: None,
            other: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub asset: Asset,
    pub buffer_views: IndexedContainer<BufferView>,
    pub textures: IndexedContainer<Texture>,
    pub materials: IndexedContainer<Material>,
    pub meshes: IndexedContainer<Mesh>,
    pub nodes: IndexedContainer<Node>,
    pub extensions: Extensions,
    pub extensions_required: Vec<String>,
    /// Top-level members this crate does not model (`accessors`, `buffers`,
    /// `scenes`, ...), written back as read.
    pub other: Map<String, Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentJson {
    #[serde(default)]
    asset: Asset,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    extensions_used: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    extensions_required: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    buffer_views: Vec<BufferViewJson>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    textures: Vec<TextureJson>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    materials: Vec<MaterialJson>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    meshes: Vec<MeshJson>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    nodes: Vec<NodeJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extensions: Option<Map<String, Value>>,
    #[serde(flatten)]
    other: Map<String, Value>,
}

impl Document {
    /// Root `KHR_lights_punctual` collection, if the document has one.
    pub fn lights(&self) -> Option<&LightExtension> {
        self.extensions.get::<LightExtension>()
    }

    pub fn read(json: &str, config: &Config) -> Result<Self> {
        Self::from_json(json, &config.khr_deserializer())
    }

    pub fn write(&self, config: &Config) -> Result<String> {
        let ser = config.khr_serializer();
        if config.pretty {
            self.to_json_pretty(&ser)
        } else {
            self.to_json(&ser)
        }
    }

    pub fn from_json(json: &str, de: &ExtensionDeserializer) -> Result<Self> {
        let raw: DocumentJson = serde_json::from_str(json).context("Invalid glTF JSON")?;

        for name in &raw.extensions_required {
            if !de.supports(name) {
                return Err(Error::RequiredExtension { name: name.clone() }.into());
            }
        }

        let mut doc = Document {
            asset: raw.asset,
            extensions_required: raw.extensions_required,
            other: raw.other,
            ..Default::default()
        };

        for (index, json) in raw.buffer_views.into_iter().enumerate() {
            doc.buffer_views.push(BufferView::from_json(index, json))?;
        }

        for (index, json) in raw.textures.into_iter().enumerate() {
            doc.textures.push(Texture::from_json(index, json))?;
        }

        for (index, json) in raw.materials.into_iter().enumerate() {
            let material =
                Material::from_json(index, json, de).with_context(|| format!("Material {index}"))?;
            doc.materials.push(material)?;
        }

        for (index, json) in raw.meshes.into_iter().enumerate() {
            let mesh = Mesh::from_json(index, json, de).with_context(|| format!("Mesh {index}"))?;
            doc.meshes.push(mesh)?;
        }

        for (index, json) in raw.nodes.into_iter().enumerate() {
            let node = Node::from_json(index, json, de).with_context(|| format!("Node {index}"))?;
            doc.nodes.push(node)?;
        }

        if let Some(raw) = raw.extensions {
            doc.extensions = de
                .deserialize_all(&raw, Target::Document)
                .context("Document extensions")?;
        }

        Ok(doc)
    }

    pub fn to_json(&self, ser: &ExtensionSerializer) -> Result<String> {
        Ok(serde_json::to_string(&self.to_value(ser)?)?)
    }

    pub fn to_json_pretty(&self, ser: &ExtensionSerializer) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value(ser)?)?)
    }

    fn to_value(&self, ser: &ExtensionSerializer) -> Result<Value> {
        let mut raw = DocumentJson {
            asset: self.asset.clone(),
            extensions_required: self.extensions_required.clone(),
            buffer_views: self.buffer_views.iter().map(BufferView::to_json).collect(),
            textures: self.textures.iter().map(Texture::to_json).collect(),
            other: self.other.clone(),
            ..Default::default()
        };

        for material in &self.materials {
            raw.materials.push(
                material
                    .to_json(self, ser)
                    .with_context(|| format!("Material `{}`", material.id))?,
            );
        }

        for mesh in &self.meshes {
            raw.meshes.push(
                mesh.to_json(self, ser)
                    .with_context(|| format!("Mesh `{}`", mesh.id))?,
            );
        }

        for node in &self.nodes {
            raw.nodes.push(
                node.to_json(self, ser)
                    .with_context(|| format!("Node `{}`", node.id))?,
            );
        }

        raw.extensions = ser
            .serialize_all(&self.extensions, Target::Document, self)
            .context("Document extensions")?;

        let mut value = serde_json::to_value(&raw)?;

        let mut used = BTreeSet::new();
        collect_extension_names(&value, &mut used);
        used.extend(self.extensions_required.iter().cloned());
        if !used.is_empty() {
            value["extensionsUsed"] = used.into_iter().collect();
        }

        Ok(value)
    }
}

fn collect_extension_names(value: &Value, names: &mut BTreeSet<String>) {
    match value {
        Value::Object(object) => {
            for (key, value) in object {
                if key == "extensions" {
                    if let Value::Object(extensions) = value {
                        names.extend(extensions.keys().cloned());
                    }
                }
                collect_extension_names(value, names);
            }
        }
        Value::Array(values) => values.iter().for_each(|v| collect_extension_names(v, names)),
        _ => {}
    }
}

#[test]
fn required_extension_must_be_supported() {
    let err = Document::from_json(
        r#"{ "asset": { "version": "2.0" }, "extensionsRequired": ["EXT_meshopt_compression"] }"#,
        &crate::khr_deserializer(),
    )
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::RequiredExtension { name }) if name == "EXT_meshopt_compression"
    ));
}

#[test]
fn extensions_used_is_collected() -> Result<()> {
    let doc = Document::from_json(
        r#"{
        "asset": { "version": "2.0" },
        "textures": [{ "source": 0 }],
        "materials": [{
            "extensions": {
                "KHR_materials_unlit": {},
                "KHR_materials_pbrSpecularGlossiness": {
                    "diffuseTexture": {
                        "index": 0,
                        "extensions": { "KHR_texture_transform": { "rotation": 1.5 } }
                    }
                }
            }
        }]
    }"#,
        &crate::khr_deserializer(),
    )?;

    let out: Value = serde_json::from_str(&doc.to_json(&crate::khr_serializer())?)?;
    assert_eq!(
        out["extensionsUsed"],
        serde_json::json!([
            "KHR_materials_pbrSpecularGlossiness",
            "KHR_materials_unlit",
            "KHR_texture_transform"
        ])
    );

    Ok(())
}

#[test]
fn errors_name_the_element() {
    let err = Document::from_json(
        r#"{ "meshes": [{ "primitives": [{
            "attributes": { "POSITION": 0 },
            "extensions": { "KHR_draco_mesh_compression": { "attributes": { "POSITION": 0 } } }
        }] }] }"#,
        &crate::khr_deserializer(),
    )
    .unwrap_err();

    assert_eq!(err.to_string(), "Mesh 0");
    assert!(format!("{err:#}").contains("KHR_draco_mesh_compression"));
}

#[test]
fn unmodelled_members_are_written_back() -> Result<()> {
    let input = serde_json::json!({
        "asset": { "version": "2.0", "copyright": "nobody" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "buffers": [{ "byteLength": 64, "uri": "data.bin" }],
        "bufferViews": [{ "buffer": 0, "byteLength": 64, "byteStride": 12 }],
        "accessors": [{ "bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3" }],
        "materials": [{
            "pbrMetallicRoughness": { "baseColorFactor": [1.0, 0.0, 0.0, 1.0] },
            "extras": { "id": 7 }
        }],
        "meshes": [{
            "primitives": [{ "attributes": { "POSITION": 0 }, "material": 0, "mode": 4 }],
            "weights": [0.5]
        }],
        "nodes": [{ "matrix": [1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1], "mesh": 0 }]
    });

    let doc = Document::from_json(&input.to_string(), &crate::khr_deserializer())?;
    let out: Value = serde_json::from_str(&doc.to_json(&crate::khr_serializer())?)?;

    assert_eq!(out, input);

    Ok(())
}
