use serde::{Deserialize, Serialize};

mod light;
mod node;

pub use light::*;
pub use node::*;

use crate::{
    extensions::parse_object, json::Document, ExtensionDeserializer, ExtensionSerializer,
    IndexedContainer, Result,
};

pub const LIGHTS_PUNCTUAL_NAME: &str = "KHR_lights_punctual";

/// Document-level `KHR_lights_punctual`: the ordered light collection nodes
/// refer to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightExtension {
    pub lights: IndexedContainer<Punctual>,
}

impl LightExtension {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a light. An empty id is replaced by the next unused index.
    pub fn push(&mut self, mut light: Punctual) -> Result<usize> {
        if light.id.is_empty() {
            let mut next = self.lights.len();
            while self.lights.contains(&next.to_string()) {
                next += 1;
            }
            light.id = next.to_string();
        }

        self.lights.push(light)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LightExtensionJson {
    lights: Vec<PunctualJson>,
}

pub fn serialize_lights(
    light_ext: &LightExtension,
    _doc: &Document,
    _ser: &ExtensionSerializer,
) -> Result<String> {
    let json = LightExtensionJson {
        lights: light_ext.lights.iter().map(Punctual::to_json).collect(),
    };

    Ok(serde_json::to_string(&json)?)
}

pub fn deserialize_light(json: &str, _de: &ExtensionDeserializer) -> Result<LightExtension> {
    let json: LightExtensionJson = parse_object(json, LIGHTS_PUNCTUAL_NAME)?;

    let mut light_ext = LightExtension::new();
    for (index, light) in json.lights.into_iter().enumerate() {
        light_ext.lights.push(Punctual::from_json(index, light)?)?;
    }

    Ok(light_ext)
}

#[cfg(test)]
use crate::{extensions::Extension, khr_deserializer, khr_serializer, json::Node, Error};

#[cfg(test)]
fn doc_with_lights() -> Result<Document> {
    let mut lights = LightExtension::new();
    lights.push(Punctual::directional("sun"))?;
    lights.push(Punctual::spot("", 0.1, 0.6))?;

    let mut doc = Document::default();
    doc.extensions.insert(lights);
    Ok(doc)
}

#[test]
fn spot_requires_cone_angles() {
    let de = khr_deserializer();

    for (json, missing) in [
        (r#"{ "lights": [{ "type": "spot" }] }"#, "lights[0].spot"),
        (
            r#"{ "lights": [
                { "type": "point" },
                { "type": "spot", "spot": { "outerConeAngle": 0.5 } }
            ] }"#,
            "lights[1].spot.innerConeAngle",
        ),
        (
            r#"{ "lights": [{ "type": "spot", "spot": { "innerConeAngle": 0.1 } }] }"#,
            "lights[0].spot.outerConeAngle",
        ),
    ] {
        assert!(
            matches!(
                deserialize_light(json, &de),
                Err(Error::MissingField {
                    extension: LIGHTS_PUNCTUAL_NAME,
                    field,
                }) if field == missing
            ),
            "{json}"
        );
    }
}

#[test]
fn point_light_needs_no_cone_angles() -> Result<()> {
    let lights = deserialize_light(
        r#"{ "lights": [{ "type": "point", "range": 10.0 }] }"#,
        &khr_deserializer(),
    )?;

    let light = lights.lights.get("0").expect("light 0");
    assert_eq!(light.light_type(), LightType::Point);
    assert_eq!(light.range, 10.0);
    assert_eq!(light.color, glam::Vec3::ONE);
    assert_eq!(light.intensity, 1.0);

    Ok(())
}

#[test]
fn type_is_required() {
    assert!(matches!(
        deserialize_light(r#"{ "lights": [{ "name": "lamp" }] }"#, &khr_deserializer()),
        Err(Error::Schema { .. })
    ));
}

#[test]
fn push_assigns_ids() -> Result<()> {
    let doc = doc_with_lights()?;
    let lights = doc.lights().expect("lights");

    assert_eq!(lights.lights.index_of("sun"), Some(0));
    assert_eq!(lights.lights.at(1).map(|light| light.id.as_str()), Some("1"));

    Ok(())
}

#[test]
fn root_round_trip() -> Result<()> {
    let doc = doc_with_lights()?;
    let lights = doc.lights().expect("lights");

    let json = serialize_lights(lights, &doc, &khr_serializer())?;
    let parsed = deserialize_light(&json, &khr_deserializer())?;

    // Ids come back as wire indices.
    assert_eq!(parsed.lights.len(), 2);
    assert_eq!(
        parsed.lights.get("0").map(Punctual::light_type),
        Some(LightType::Directional)
    );
    let spot = parsed.lights.get("1").expect("spot");
    assert_eq!((spot.inner_cone_angle, spot.outer_cone_angle), (0.1, 0.6));

    let json = serialize_lights(&parsed, &doc, &khr_serializer())?;
    assert_eq!(deserialize_light(&json, &khr_deserializer())?, parsed);

    Ok(())
}

#[test]
fn authored_lights_round_trip() -> Result<()> {
    let mut lights = LightExtension::new();
    lights.push(Punctual {
        name: "sun".into(),
        intensity: 4.0,
        ..Punctual::directional("")
    })?;
    lights.push(Punctual {
        color: glam::vec3(1.0, 0.8, 0.6),
        range: 12.5,
        ..Punctual::point("")
    })?;
    lights.push(Punctual {
        range: 30.0,
        ..Punctual::spot("", 0.2, 0.9)
    })?;
    lights.push(Punctual {
        inner_cone_angle: 0.3,
        outer_cone_angle: 0.6,
        ..Punctual::new("", "")
    })?;

    let doc = Document::default();
    let json = serialize_lights(&lights, &doc, &khr_serializer())?;
    assert_eq!(deserialize_light(&json, &khr_deserializer())?, lights);

    Ok(())
}

#[test]
fn node_shape_is_only_a_reference() -> Result<()> {
    let doc = doc_with_lights()?;

    let json = serialize_for_node(&LightNode::new("1"), &doc, &khr_serializer())?;
    assert_eq!(json, r#"{"light":1}"#);

    let value: serde_json::Value = serde_json::from_str(&json)?;
    for key in ["type", "color", "intensity", "lights"] {
        assert!(value.get(key).is_none(), "{key}");
    }

    Ok(())
}

#[test]
fn node_reference_resolution_is_deferred() -> Result<()> {
    let doc = doc_with_lights()?;
    let de = khr_deserializer();

    let valid = deserialize_light_node(r#"{ "light": 0 }"#, &de)?;
    let dangling = deserialize_light_node(r#"{ "light": 9 }"#, &de)?;
    assert_eq!(dangling.light_id, "9");

    // Ids from a parsed node refer to wire indices, so resolve against a
    // document whose lights were read from the same file.
    let json = serialize_lights(doc.lights().expect("lights"), &doc, &khr_serializer())?;
    let read = deserialize_light(&json, &de)?;
    let mut read_doc = Document::default();
    read_doc.extensions.insert(read);

    assert_eq!(valid.light(&read_doc)?.light_type(), LightType::Directional);
    assert!(matches!(
        dangling.light(&read_doc),
        Err(Error::DanglingReference { id, .. }) if id == "9"
    ));
    assert!(matches!(
        serialize_for_node(&dangling, &read_doc, &khr_serializer()),
        Err(Error::DanglingReference { .. })
    ));
    assert!(valid.light(&Document::default()).is_err());

    Ok(())
}

#[test]
fn node_light_lives_on_a_node() -> Result<()> {
    let mut doc = doc_with_lights()?;
    let mut node = Node::new("lamp");
    node.extensions.insert(LightNode::new("sun"));
    doc.nodes.push(node)?;

    let node = doc.nodes.get("lamp").expect("node");
    let light_node = node.extensions.get::<LightNode>().expect("light node");
    assert_eq!(light_node.light(&doc)?.id, "sun");

    let as_extension: Extension = light_node.clone().into();
    assert_ne!(as_extension, Extension::from(LightExtension::new()));

    Ok(())
}
