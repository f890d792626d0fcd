use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{raw_extensions, resolve, Document, Mesh};
use crate::{
    extensions::{Extensions, Target},
    ExtensionDeserializer, ExtensionSerializer, Identified, Result,
};

fn default_translation() -> glam::Vec3 {
    glam::vec3(0.0, 0.0, 0.0)
}

fn default_rotation() -> glam::Quat {
    glam::quat(0.0, 0.0, 0.0, 1.0)
}

fn default_scale() -> glam::Vec3 {
    glam::vec3(1.0, 1.0, 1.0)
}

fn is_default_translation(value: &glam::Vec3) -> bool {
    *value == default_translation()
}

fn is_default_rotation(value: &glam::Quat) -> bool {
    *value == default_rotation()
}

fn is_default_scale(value: &glam::Vec3) -> bool {
    *value == default_scale()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub translation: glam::Vec3,
    pub rotation: glam::Quat,
    pub scale: glam::Vec3,
    pub mesh_id: Option<String>,
    pub children: Vec<String>,
    pub extensions: Extensions,
    /// `matrix`, `camera`, `skin`, `extras` and other members kept as read.
    pub other: Map<String, Value>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            translation: default_translation(),
            rotation: default_rotation(),
            scale: default_scale(),
            mesh_id: None,
            children: Vec::new(),
            extensions: Extensions::new(),
            other: Map::new(),
        }
    }
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn mesh<'a: 'b, 'b>(&'a self, doc: &'b Document) -> Option<&'b Mesh> {
        self.mesh_id.as_ref().and_then(|id| doc.meshes.get(id))
    }

    pub fn children<'a: 'b, 'b>(&'a self, doc: &'b Document) -> NodeIterator<'b> {
        NodeIterator {
            doc,
            iter: self.children.iter(),
        }
    }
}

impl Identified for Node {
    fn id(&self) -> &str {
        &self.id
    }
}

pub struct NodeIterator<'a> {
    doc: &'a Document,
    iter: std::slice::Iter<'a, String>,
}

impl<'a> Iterator for NodeIterator<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.by_ref().find_map(|id| self.doc.nodes.get(id))
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NodeJson {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(
        default = "default_translation",
        skip_serializing_if = "is_default_translation"
    )]
    pub translation: glam::Vec3,
    #[serde(default = "default_rotation", skip_serializing_if = "is_default_rotation")]
    pub rotation: glam::Quat,
    #[serde(default = "default_scale", skip_serializing_if = "is_default_scale")]
    pub scale: glam::Vec3,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Node {
    pub(crate) fn from_json(
        index: usize,
        json: NodeJson,
        de: &ExtensionDeserializer,
    ) -> Result<Self> {
        Ok(Self {
            id: index.to_string(),
            name: json.name,
            translation: json.translation,
            rotation: json.rotation,
            scale: json.scale,
            mesh_id: json.mesh.map(|index| index.to_string()),
            children: json.children.iter().map(usize::to_string).collect(),
            extensions: raw_extensions(json.extensions, Target::Node, de)?,
            other: json.other,
        })
    }

    pub(crate) fn to_json(&self, doc: &Document, ser: &ExtensionSerializer) -> Result<NodeJson> {
        Ok(NodeJson {
            name: self.name.clone(),
            translation: self.translation,
            rotation: self.rotation,
            scale: self.scale,
            mesh: self
                .mesh_id
                .as_ref()
                .and_then(|id| resolve(&doc.meshes, "Mesh", id)),
            children: self
                .children
                .iter()
                .filter_map(|id| resolve(&doc.nodes, "Node", id))
                .collect(),
            extensions: ser.serialize_all(&self.extensions, Target::Node, doc)?,
            other: self.other.clone(),
        })
    }
}

#[test]
fn children() -> anyhow::Result<()> {
    let doc = Document::from_json(
        r#"{
        "asset": { "version": "2.0" },
        "nodes": [
            { "name" : "node_1", "children": [1] },
            { "name" : "node_2", "children": [2] },
            { "name" : "node_3" }
        ]
    }"#,
        &crate::khr_deserializer(),
    )?;

    let root = doc.nodes.at(0).expect("node_1");
    let children: Vec<_> = root.children(&doc).collect();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "node_2");
    assert_eq!(children[0].id, "1");

    let children: Vec<_> = children[0].children(&doc).collect();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "node_3");

    let children: Vec<_> = children[0].children(&doc).collect();
    assert_eq!(children.len(), 0);

    Ok(())
}

#[test]
fn links_are_ids() -> Result<()> {
    let mut doc = Document::default();
    doc.meshes.push(Mesh {
        id: "teapot".into(),
        ..Default::default()
    })?;
    doc.nodes.push(Node::new("lid"))?;

    let root = Node {
        mesh_id: Some("teapot".into()),
        children: vec!["lid".into(), "spout".into()],
        ..Node::new("root")
    };
    doc.nodes.push(root.clone())?;

    assert_eq!(root.mesh(&doc).map(|mesh| mesh.id.as_str()), Some("teapot"));
    assert_eq!(root.children(&doc).count(), 1);

    let json = root.to_json(&doc, &crate::khr_serializer())?;
    assert_eq!(json.mesh, Some(0));
    assert_eq!(json.children, [0]);

    Ok(())
}

#[test]
fn matrix_nodes_keep_their_shape() -> Result<()> {
    let json: NodeJson = serde_json::from_str(
        r#"{ "matrix": [1,0,0,0, 0,1,0,0, 0,0,1,0, 2,0,0,1], "extras": { "tag": "a" } }"#,
    )?;
    let node = Node::from_json(0, json, &crate::khr_deserializer())?;
    assert!(node.other.contains_key("matrix"));

    let out = serde_json::to_value(node.to_json(&Document::default(), &crate::khr_serializer())?)?;
    for trs in ["translation", "rotation", "scale"] {
        assert!(out.get(trs).is_none(), "{trs}");
    }
    assert_eq!(out["extras"], serde_json::json!({ "tag": "a" }));

    Ok(())
}
