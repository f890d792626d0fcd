use std::collections::BTreeMap;

use super::{Extension, ExtensionKind};

/// Per-element extension slots, keyed by extension name.
///
/// Holds at most one typed value per name. Extensions read without a
/// registered handler stay here as raw JSON when the policy preserves them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extensions {
    known: BTreeMap<&'static str, Extension>,
    raw: BTreeMap<String, serde_json::Value>,
}

impl Extensions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `ext`, returning whatever occupied its slot before.
    pub fn insert(&mut self, ext: impl Into<Extension>) -> Option<Extension> {
        let ext = ext.into();
        self.raw.remove(ext.name());
        self.known.insert(ext.name(), ext)
    }

    pub fn get<E: ExtensionKind>(&self) -> Option<&E> {
        self.known.get(E::NAME).and_then(E::from_ref)
    }

    pub fn get_mut<E: ExtensionKind>(&mut self) -> Option<&mut E> {
        self.known.get_mut(E::NAME).and_then(E::from_mut)
    }

    pub fn contains<E: ExtensionKind>(&self) -> bool {
        self.get::<E>().is_some()
    }

    pub fn remove<E: ExtensionKind>(&mut self) -> Option<E> {
        match self.known.get(E::NAME).and_then(E::from_ref) {
            Some(_) => self.known.remove(E::NAME).and_then(E::from_owned),
            None => None,
        }
    }

    pub fn by_name(&self, name: &str) -> Option<&Extension> {
        self.known.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Extension> {
        self.known.values()
    }

    pub fn raw(&self, name: &str) -> Option<&serde_json::Value> {
        self.raw.get(name)
    }

    pub fn raw_iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.raw.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub(crate) fn insert_raw(&mut self, name: String, value: serde_json::Value) {
        if !self.known.contains_key(name.as_str()) {
            self.raw.insert(name, value);
        }
    }

    /// Every name held, typed or raw.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.known
            .keys()
            .copied()
            .chain(self.raw.keys().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.known.len() + self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty() && self.raw.is_empty()
    }

    pub fn clear(&mut self) {
        self.known.clear();
        self.raw.clear();
    }
}

#[cfg(test)]
use super::{TextureTransform, Unlit};

#[test]
fn one_instance_per_name() {
    let mut slots = Extensions::new();
    assert!(slots.insert(TextureTransform::default()).is_none());

    let previous = slots.insert(TextureTransform {
        rotation: 1.0,
        ..Default::default()
    });
    assert_eq!(previous, Some(TextureTransform::default().into()));
    assert_eq!(slots.len(), 1);
    assert_eq!(slots.get::<TextureTransform>().map(|t| t.rotation), Some(1.0));
}

#[test]
fn typed_access() {
    let mut slots = Extensions::new();
    slots.insert(Unlit);

    assert!(slots.contains::<Unlit>());
    assert!(!slots.contains::<TextureTransform>());
    assert!(slots.by_name("KHR_materials_unlit").is_some());

    assert_eq!(slots.remove::<TextureTransform>(), None);
    assert_eq!(slots.remove::<Unlit>(), Some(Unlit));
    assert!(slots.is_empty());
}

#[test]
fn typed_value_replaces_raw() {
    let mut slots = Extensions::new();
    slots.insert_raw("KHR_materials_unlit".into(), serde_json::json!({}));
    slots.insert_raw("EXT_custom".into(), serde_json::json!({ "a": 1 }));
    assert_eq!(slots.len(), 2);

    slots.insert(Unlit);
    assert!(slots.raw("KHR_materials_unlit").is_none());
    assert_eq!(slots.names().collect::<Vec<_>>(), ["KHR_materials_unlit", "EXT_custom"]);

    let copy = slots.clone();
    slots.clear();
    assert_eq!(copy.len(), 2);
}
