//! Typed `KHR_*` extensions and the slot map elements keep them in.
//!
//! Every supported extension is one variant of [`Extension`]. Cloning an
//! [`Extension`] deep-copies it; equality compares field values and is
//! `false` across variants.

mod khr_draco_mesh_compression;
mod khr_lights_punctual;
mod khr_materials_pbr_specular_glossiness;
mod khr_materials_unlit;
mod khr_texture_transform;
mod slots;

pub use khr_draco_mesh_compression::*;
pub use khr_lights_punctual::*;
pub use khr_materials_pbr_specular_glossiness::*;
pub use khr_materials_unlit::*;
pub use khr_texture_transform::*;
pub use slots::*;

use crate::{Error, Result};

/// Parse an extension fragment, which must be a JSON object.
///
/// Type errors inside the object carry the path of the offending field.
pub(crate) fn parse_object<T: serde::de::DeserializeOwned>(
    json: &str,
    extension: &'static str,
) -> Result<T> {
    let object: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(json).map_err(Error::schema(extension))?;

    serde_path_to_error::deserialize(serde_json::Value::Object(object)).map_err(|err| {
        let path = match err.path().to_string() {
            root if root == "." => String::new(),
            path => path,
        };

        Error::Schema {
            extension,
            path,
            source: err.into_inner(),
        }
    })
}

/// Kind of element an extension object is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    Document,
    Node,
    Material,
    MeshPrimitive,
    TextureInfo,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Extension {
    PbrSpecularGlossiness(PbrSpecularGlossiness),
    Unlit(Unlit),
    DracoMeshCompression(DracoMeshCompression),
    TextureTransform(TextureTransform),
    LightsPunctual(LightExtension),
    LightsPunctualNode(LightNode),
}

impl Extension {
    /// Wire name, also the registry and slot key.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PbrSpecularGlossiness(_) => PbrSpecularGlossiness::NAME,
            Self::Unlit(_) => Unlit::NAME,
            Self::DracoMeshCompression(_) => DracoMeshCompression::NAME,
            Self::TextureTransform(_) => TextureTransform::NAME,
            Self::LightsPunctual(_) => LightExtension::NAME,
            Self::LightsPunctualNode(_) => LightNode::NAME,
        }
    }

    pub fn target(&self) -> Target {
        match self {
            Self::PbrSpecularGlossiness(_) => PbrSpecularGlossiness::TARGET,
            Self::Unlit(_) => Unlit::TARGET,
            Self::DracoMeshCompression(_) => DracoMeshCompression::TARGET,
            Self::TextureTransform(_) => TextureTransform::TARGET,
            Self::LightsPunctual(_) => LightExtension::TARGET,
            Self::LightsPunctualNode(_) => LightNode::TARGET,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::PbrSpecularGlossiness(_) => "PbrSpecularGlossiness",
            Self::Unlit(_) => "Unlit",
            Self::DracoMeshCompression(_) => "DracoMeshCompression",
            Self::TextureTransform(_) => "TextureTransform",
            Self::LightsPunctual(_) => "LightExtension",
            Self::LightsPunctualNode(_) => "LightNode",
        }
    }

    /// Borrow the concrete value, or fail with [`Error::KindMismatch`].
    pub fn downcast<E: ExtensionKind>(&self) -> Result<&E> {
        E::from_ref(self).ok_or(Error::KindMismatch {
            expected: E::KIND,
            actual: self.kind(),
        })
    }
}

/// Implemented by every concrete extension type.
pub trait ExtensionKind: Into<Extension> + Sized {
    const NAME: &'static str;
    const TARGET: Target;
    const KIND: &'static str;

    fn from_ref(ext: &Extension) -> Option<&Self>;
    fn from_mut(ext: &mut Extension) -> Option<&mut Self>;
    fn from_owned(ext: Extension) -> Option<Self>;
}

macro_rules! extension_kind {
    ($ty:ident, $variant:ident, $name:expr, $target:expr) => {
        impl ExtensionKind for $ty {
            const NAME: &'static str = $name;
            const TARGET: Target = $target;
            const KIND: &'static str = stringify!($ty);

            fn from_ref(ext: &Extension) -> Option<&Self> {
                match ext {
                    Extension::$variant(value) => Some(value),
                    _ => None,
                }
            }

            fn from_mut(ext: &mut Extension) -> Option<&mut Self> {
                match ext {
                    Extension::$variant(value) => Some(value),
                    _ => None,
                }
            }

            fn from_owned(ext: Extension) -> Option<Self> {
                match ext {
                    Extension::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Extension {
            fn from(value: $ty) -> Self {
                Extension::$variant(value)
            }
        }
    };
}

extension_kind!(
    PbrSpecularGlossiness,
    PbrSpecularGlossiness,
    PBR_SPECULAR_GLOSSINESS_NAME,
    Target::Material
);
extension_kind!(Unlit, Unlit, UNLIT_NAME, Target::Material);
extension_kind!(
    DracoMeshCompression,
    DracoMeshCompression,
    DRACO_MESH_COMPRESSION_NAME,
    Target::MeshPrimitive
);
extension_kind!(
    TextureTransform,
    TextureTransform,
    TEXTURE_TRANSFORM_NAME,
    Target::TextureInfo
);
extension_kind!(
    LightExtension,
    LightsPunctual,
    LIGHTS_PUNCTUAL_NAME,
    Target::Document
);
extension_kind!(
    LightNode,
    LightsPunctualNode,
    LIGHTS_PUNCTUAL_NAME,
    Target::Node
);

#[test]
fn cross_kind_equality() {
    let unlit: Extension = Unlit.into();
    let transform: Extension = TextureTransform::default().into();
    let gloss: Extension = PbrSpecularGlossiness::default().into();

    assert_eq!(unlit, unlit.clone());
    assert_ne!(unlit, transform);
    assert_ne!(transform, unlit);
    assert_ne!(gloss, transform);
}

#[test]
fn lights_share_a_name_but_not_a_target() {
    let root: Extension = LightExtension::default().into();
    let node: Extension = LightNode::new("0").into();

    assert_eq!(root.name(), node.name());
    assert_eq!(root.target(), Target::Document);
    assert_eq!(node.target(), Target::Node);
    assert_ne!(root, node);
}

#[test]
fn downcast() {
    let ext: Extension = TextureTransform::default().into();
    assert!(ext.downcast::<TextureTransform>().is_ok());
    assert!(matches!(
        ext.downcast::<Unlit>(),
        Err(Error::KindMismatch {
            expected: "Unlit",
            actual: "TextureTransform"
        })
    ));
}

#[test]
fn clone_is_independent() {
    let original: Extension = TextureTransform {
        rotation: 0.5,
        ..Default::default()
    }
    .into();

    let mut copy = original.clone();
    assert_eq!(original, copy);

    if let Extension::TextureTransform(t) = &mut copy {
        t.rotation = 1.0;
        t.tex_coord = Some(2);
    }
    assert_ne!(original, copy);
    assert_eq!(
        original.downcast::<TextureTransform>().map(|t| t.rotation).ok(),
        Some(0.5)
    );
}
