use serde_json::{Map, Value};

use super::parse_object;
use crate::{json::Document, ExtensionDeserializer, ExtensionSerializer, Result};

pub const UNLIT_NAME: &str = "KHR_materials_unlit";

/// Marker extension: its presence switches a material to unlit shading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unlit;

pub fn serialize_unlit(
    _unlit: &Unlit,
    _doc: &Document,
    _ser: &ExtensionSerializer,
) -> Result<String> {
    Ok("{}".to_string())
}

pub fn deserialize_unlit(json: &str, _de: &ExtensionDeserializer) -> Result<Unlit> {
    let _: Map<String, Value> = parse_object(json, UNLIT_NAME)?;
    Ok(Unlit)
}

#[cfg(test)]
use crate::{khr_deserializer, khr_serializer, Error};

#[test]
fn empty_object() -> Result<()> {
    let de = khr_deserializer();
    assert_eq!(deserialize_unlit("{}", &de)?, Unlit);
    assert_eq!(deserialize_unlit(r#"{ "extras": { "note": 1 } }"#, &de)?, Unlit);

    let json = serialize_unlit(&Unlit, &Document::default(), &khr_serializer())?;
    assert_eq!(json, "{}");

    Ok(())
}

#[test]
fn not_an_object() {
    assert!(matches!(
        deserialize_unlit("true", &khr_deserializer()),
        Err(Error::Schema {
            extension: UNLIT_NAME,
            ..
        })
    ));
}
