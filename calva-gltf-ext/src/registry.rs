//! Name-keyed handler tables.
//!
//! A registry is built once from a fixed list of `(name, target, handler)`
//! triples and is read-only afterwards. It is passed by reference into every
//! (de)serialize call so handlers can dispatch nested extensions.

use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::{
    config::UnknownExtensionPolicy,
    extensions::*,
    json::Document,
    Error, Result,
};

pub type SerializeFn = fn(&Extension, &Document, &ExtensionSerializer) -> Result<String>;
pub type DeserializeFn = fn(&str, &ExtensionDeserializer) -> Result<Extension>;

#[derive(Clone)]
pub struct ExtensionSerializer {
    handlers: HashMap<Target, HashMap<String, SerializeFn>>,
    policy: UnknownExtensionPolicy,
}

impl ExtensionSerializer {
    pub fn new<N: Into<String>>(
        handlers: impl IntoIterator<Item = (N, Target, SerializeFn)>,
    ) -> Self {
        let mut table: HashMap<Target, HashMap<String, SerializeFn>> = HashMap::new();
        for (name, target, handler) in handlers {
            table.entry(target).or_default().insert(name.into(), handler);
        }

        Self {
            handlers: table,
            policy: UnknownExtensionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnknownExtensionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> UnknownExtensionPolicy {
        self.policy
    }

    pub fn resolve_serializer(&self, name: &str, target: Target) -> Option<SerializeFn> {
        self.handlers.get(&target)?.get(name).copied()
    }

    /// Serialize every slot of an element into its `extensions` object.
    ///
    /// Returns `None` when nothing was written.
    pub fn serialize_all(
        &self,
        extensions: &Extensions,
        target: Target,
        doc: &Document,
    ) -> Result<Option<Map<String, Value>>> {
        let mut out = Map::new();

        for ext in extensions.iter() {
            let Some(handler) = self.resolve_serializer(ext.name(), target) else {
                self.unknown(ext.name(), target)?;
                continue;
            };

            let json = handler(ext, doc, self)?;
            out.insert(ext.name().to_string(), serde_json::from_str(&json)?);
        }

        for (name, value) in extensions.raw_iter() {
            match self.policy {
                UnknownExtensionPolicy::Preserve => {
                    out.insert(name.to_string(), value.clone());
                }
                _ => self.unknown(name, target)?,
            }
        }

        Ok((!out.is_empty()).then_some(out))
    }

    fn unknown(&self, name: &str, target: Target) -> Result<()> {
        match self.policy {
            UnknownExtensionPolicy::Fail => Err(Error::UnknownExtension {
                name: name.to_string(),
                target,
            }),
            _ => {
                warn!("No serializer for {name} on {target:?}, skipping");
                Ok(())
            }
        }
    }
}

#[derive(Clone)]
pub struct ExtensionDeserializer {
    handlers: HashMap<Target, HashMap<String, DeserializeFn>>,
    policy: UnknownExtensionPolicy,
}

impl ExtensionDeserializer {
    pub fn new<N: Into<String>>(
        handlers: impl IntoIterator<Item = (N, Target, DeserializeFn)>,
    ) -> Self {
        let mut table: HashMap<Target, HashMap<String, DeserializeFn>> = HashMap::new();
        for (name, target, handler) in handlers {
            table.entry(target).or_default().insert(name.into(), handler);
        }

        Self {
            handlers: table,
            policy: UnknownExtensionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnknownExtensionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> UnknownExtensionPolicy {
        self.policy
    }

    pub fn resolve_deserializer(&self, name: &str, target: Target) -> Option<DeserializeFn> {
        self.handlers.get(&target)?.get(name).copied()
    }

    /// Whether `name` has a handler on any target.
    pub fn supports(&self, name: &str) -> bool {
        self.handlers.values().any(|names| names.contains_key(name))
    }

    /// Parse an element's `extensions` object into typed slots.
    pub fn deserialize_all(&self, raw: &Map<String, Value>, target: Target) -> Result<Extensions> {
        let mut extensions = Extensions::new();

        for (name, value) in raw {
            let Some(handler) = self.resolve_deserializer(name, target) else {
                match self.policy {
                    UnknownExtensionPolicy::Preserve => {
                        debug!("No deserializer for {name} on {target:?}, keeping raw JSON");
                        extensions.insert_raw(name.clone(), value.clone());
                    }
                    UnknownExtensionPolicy::Skip => {
                        warn!("No deserializer for {name} on {target:?}, skipping");
                    }
                    UnknownExtensionPolicy::Fail => {
                        return Err(Error::UnknownExtension {
                            name: name.clone(),
                            target,
                        })
                    }
                }
                continue;
            };

            extensions.insert(handler(&value.to_string(), self)?);
        }

        Ok(extensions)
    }
}

impl std::fmt::Debug for ExtensionSerializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionSerializer")
            .field("handlers", &handler_names(&self.handlers))
            .field("policy", &self.policy)
            .finish()
    }
}

impl std::fmt::Debug for ExtensionDeserializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensionDeserializer")
            .field("handlers", &handler_names(&self.handlers))
            .field("policy", &self.policy)
            .finish()
    }
}

fn handler_names<F>(handlers: &HashMap<Target, HashMap<String, F>>) -> Vec<(Target, &str)> {
    let mut names: Vec<_> = handlers
        .iter()
        .flat_map(|(target, names)| names.keys().map(|name| (*target, name.as_str())))
        .collect();
    names.sort();
    names
}

/// Serializers for every `KHR_*` extension this crate implements.
pub fn khr_serializer() -> ExtensionSerializer {
    let handlers: [(&str, Target, SerializeFn); 6] = [
        (PBR_SPECULAR_GLOSSINESS_NAME, Target::Material, |ext, doc, ser| {
            serialize_pbr_spec_gloss(ext.downcast()?, doc, ser)
        }),
        (UNLIT_NAME, Target::Material, |ext, doc, ser| {
            serialize_unlit(ext.downcast()?, doc, ser)
        }),
        (DRACO_MESH_COMPRESSION_NAME, Target::MeshPrimitive, |ext, doc, ser| {
            serialize_draco_mesh_compression(ext.downcast()?, doc, ser)
        }),
        (TEXTURE_TRANSFORM_NAME, Target::TextureInfo, |ext, doc, ser| {
            serialize_texture_transform(ext.downcast()?, doc, ser)
        }),
        (LIGHTS_PUNCTUAL_NAME, Target::Document, |ext, doc, ser| {
            serialize_lights(ext.downcast()?, doc, ser)
        }),
        (LIGHTS_PUNCTUAL_NAME, Target::Node, |ext, doc, ser| {
            serialize_for_node(ext.downcast()?, doc, ser)
        }),
    ];

    ExtensionSerializer::new(handlers)
}

/// Deserializers for every `KHR_*` extension this crate implements.
pub fn khr_deserializer() -> ExtensionDeserializer {
    let handlers: [(&str, Target, DeserializeFn); 6] = [
        (PBR_SPECULAR_GLOSSINESS_NAME, Target::Material, |json, de| {
            deserialize_pbr_spec_gloss(json, de).map(Extension::from)
        }),
        (UNLIT_NAME, Target::Material, |json, de| {
            deserialize_unlit(json, de).map(Extension::from)
        }),
        (DRACO_MESH_COMPRESSION_NAME, Target::MeshPrimitive, |json, de| {
            deserialize_draco_mesh_compression(json, de).map(Extension::from)
        }),
        (TEXTURE_TRANSFORM_NAME, Target::TextureInfo, |json, de| {
            deserialize_texture_transform(json, de).map(Extension::from)
        }),
        (LIGHTS_PUNCTUAL_NAME, Target::Document, |json, de| {
            deserialize_light(json, de).map(Extension::from)
        }),
        (LIGHTS_PUNCTUAL_NAME, Target::Node, |json, de| {
            deserialize_light_node(json, de).map(Extension::from)
        }),
    ];

    ExtensionDeserializer::new(handlers)
}

#[test]
fn registry_miss_is_not_an_error() {
    let de = khr_deserializer();
    assert!(de.resolve_deserializer("KHR_unknown_extension", Target::Material).is_none());
    assert!(!de.supports("KHR_unknown_extension"));

    let ser = khr_serializer();
    assert!(ser.resolve_serializer("KHR_unknown_extension", Target::Material).is_none());
}

#[test]
fn lookup_is_per_target() {
    let de = khr_deserializer();
    assert!(de.resolve_deserializer(UNLIT_NAME, Target::Material).is_some());
    assert!(de.resolve_deserializer(UNLIT_NAME, Target::Node).is_none());
    assert!(de.resolve_deserializer(LIGHTS_PUNCTUAL_NAME, Target::Document).is_some());
    assert!(de.resolve_deserializer(LIGHTS_PUNCTUAL_NAME, Target::Node).is_some());
    assert!(de.supports(DRACO_MESH_COMPRESSION_NAME));
}

#[test]
fn deserialize_all_policies() -> Result<()> {
    let raw: Map<String, Value> = serde_json::from_str(
        r#"{ "KHR_materials_unlit": {}, "EXT_vendor_thing": { "a": 1 } }"#,
    )?;

    let preserved = khr_deserializer().deserialize_all(&raw, Target::Material)?;
    assert!(preserved.contains::<Unlit>());
    assert_eq!(preserved.raw("EXT_vendor_thing"), Some(&serde_json::json!({ "a": 1 })));

    let skipped = khr_deserializer()
        .with_policy(UnknownExtensionPolicy::Skip)
        .deserialize_all(&raw, Target::Material)?;
    assert_eq!(skipped.len(), 1);

    let failed = khr_deserializer()
        .with_policy(UnknownExtensionPolicy::Fail)
        .deserialize_all(&raw, Target::Material);
    assert!(matches!(
        failed,
        Err(Error::UnknownExtension { name, .. }) if name == "EXT_vendor_thing"
    ));

    Ok(())
}

#[test]
fn serialize_all_policies() -> Result<()> {
    let doc = Document::default();
    let mut extensions = Extensions::new();
    extensions.insert(Unlit);
    extensions.insert_raw("EXT_vendor_thing".into(), serde_json::json!({ "a": 1 }));

    let out = khr_serializer().serialize_all(&extensions, Target::Material, &doc)?;
    let out = out.unwrap_or_default();
    assert_eq!(out.get(UNLIT_NAME), Some(&serde_json::json!({})));
    assert_eq!(out.get("EXT_vendor_thing"), Some(&serde_json::json!({ "a": 1 })));

    let out = khr_serializer()
        .with_policy(UnknownExtensionPolicy::Skip)
        .serialize_all(&extensions, Target::Material, &doc)?
        .unwrap_or_default();
    assert_eq!(out.len(), 1);

    // Unlit has no serializer on nodes.
    let failed = khr_serializer()
        .with_policy(UnknownExtensionPolicy::Fail)
        .serialize_all(&extensions, Target::Node, &doc);
    assert!(matches!(failed, Err(Error::UnknownExtension { .. })));

    assert_eq!(
        khr_serializer().serialize_all(&Extensions::new(), Target::Node, &doc)?,
        None
    );

    Ok(())
}
