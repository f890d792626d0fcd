//! Minimal glTF document model: just enough elements to carry extension
//! slots and the ids extensions refer to.

mod buffer_view;
mod document;
mod material;
mod mesh;
mod node;
mod texture;

pub use buffer_view::*;
pub use document::*;
pub use material::*;
pub use mesh::*;
pub use node::*;
pub use texture::*;

pub(crate) fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// Index of `id` for writing; an unknown id drops the reference.
pub(crate) fn resolve<T: crate::Identified>(
    container: &crate::IndexedContainer<T>,
    kind: &str,
    id: &str,
) -> Option<usize> {
    let index = container.index_of(id);
    if index.is_none() {
        log::warn!("{kind} `{id}` not found, omitting reference");
    }
    index
}

pub(crate) fn raw_extensions(
    extensions: Option<serde_json::Map<String, serde_json::Value>>,
    target: crate::extensions::Target,
    de: &crate::ExtensionDeserializer,
) -> crate::Result<crate::extensions::Extensions> {
    match extensions {
        Some(raw) => de.deserialize_all(&raw, target),
        None => Ok(Default::default()),
    }
}
