use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::{is_default, raw_extensions, resolve, Document, Texture};
use crate::{
    extensions::{Extensions, Target},
    ExtensionDeserializer, ExtensionSerializer, Identified, Result,
};

fn default_alpha_cutoff() -> f32 {
    0.5
}

fn is_default_alpha_cutoff(value: &f32) -> bool {
    *value == default_alpha_cutoff()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub id: String,
    pub name: String,
    pub alpha_mode: MaterialAlphaMode,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
    pub extensions: Extensions,
    /// Core members this crate does not model (`pbrMetallicRoughness`,
    /// `normalTexture`, `extras`, ...), written back as read.
    pub other: Map<String, Value>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            alpha_mode: MaterialAlphaMode::default(),
            alpha_cutoff: default_alpha_cutoff(),
            double_sided: false,
            extensions: Extensions::new(),
            other: Map::new(),
        }
    }
}

impl Material {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

impl Identified for Material {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MaterialJson {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_default")]
    pub alpha_mode: MaterialAlphaMode,
    #[serde(
        default = "default_alpha_cutoff",
        skip_serializing_if = "is_default_alpha_cutoff"
    )]
    pub alpha_cutoff: f32,
    #[serde(default, skip_serializing_if = "is_default")]
    pub double_sided: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Material {
    pub(crate) fn from_json(
        index: usize,
        json: MaterialJson,
        de: &ExtensionDeserializer,
    ) -> Result<Self> {
        Ok(Self {
            id: index.to_string(),
            name: json.name,
            alpha_mode: json.alpha_mode,
            alpha_cutoff: json.alpha_cutoff,
            double_sided: json.double_sided,
            extensions: raw_extensions(json.extensions, Target::Material, de)?,
            other: json.other,
        })
    }

    pub(crate) fn to_json(
        &self,
        doc: &Document,
        ser: &ExtensionSerializer,
    ) -> Result<MaterialJson> {
        Ok(MaterialJson {
            name: self.name.clone(),
            alpha_mode: self.alpha_mode,
            alpha_cutoff: self.alpha_cutoff,
            double_sided: self.double_sided,
            extensions: ser.serialize_all(&self.extensions, Target::Material, doc)?,
            other: self.other.clone(),
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum MaterialAlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

impl<'de> Deserialize<'de> for MaterialAlphaMode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match String::deserialize(deserializer)?.as_str() {
            "OPAQUE" => Ok(Self::Opaque),
            "MASK" => Ok(Self::Mask),
            "BLEND" => Ok(Self::Blend),

            value => Err(serde::de::Error::invalid_value(
                serde::de::Unexpected::Str(value),
                &r#"one of ["OPAQUE" ,"MASK" ,"BLEND"]"#,
            )),
        }
    }
}

impl Serialize for MaterialAlphaMode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(match self {
            Self::Opaque => "OPAQUE",
            Self::Mask => "MASK",
            Self::Blend => "BLEND",
        })
    }
}

/// Reference from a material to a texture, with its own extension slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureInfo {
    pub texture_id: String,
    pub tex_coord: u32,
    pub extensions: Extensions,
    pub other: Map<String, Value>,
}

impl TextureInfo {
    pub fn new(texture_id: impl Into<String>) -> Self {
        Self {
            texture_id: texture_id.into(),
            ..Default::default()
        }
    }

    pub fn texture<'a: 'b, 'b>(&'a self, doc: &'b Document) -> Option<&'b Texture> {
        doc.textures.get(&self.texture_id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TextureInfoJson {
    pub index: usize,
    #[serde(default, skip_serializing_if = "is_default")]
    pub tex_coord: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl TextureInfo {
    pub(crate) fn from_json(json: TextureInfoJson, de: &ExtensionDeserializer) -> Result<Self> {
        Ok(Self {
            texture_id: json.index.to_string(),
            tex_coord: json.tex_coord,
            extensions: raw_extensions(json.extensions, Target::TextureInfo, de)?,
            other: json.other,
        })
    }

    /// `None` when the texture id does not resolve in `doc`; such references
    /// are dropped from the output.
    pub(crate) fn to_json(
        &self,
        doc: &Document,
        ser: &ExtensionSerializer,
    ) -> Result<Option<TextureInfoJson>> {
        let Some(index) = resolve(&doc.textures, "Texture", &self.texture_id) else {
            return Ok(None);
        };

        Ok(Some(TextureInfoJson {
            index,
            tex_coord: self.tex_coord,
            extensions: ser.serialize_all(&self.extensions, Target::TextureInfo, doc)?,
            other: self.other.clone(),
        }))
    }
}

#[test]
fn alpha_mode() -> serde_json::Result<()> {
    assert_eq!(
        serde_json::from_str::<MaterialAlphaMode>(r#""MASK""#)?,
        MaterialAlphaMode::Mask
    );
    assert_eq!(serde_json::to_string(&MaterialAlphaMode::Blend)?, r#""BLEND""#);
    assert!(serde_json::from_str::<MaterialAlphaMode>(r#""CUTOUT""#).is_err());

    Ok(())
}

#[test]
fn material_defaults() -> Result<()> {
    let json: MaterialJson = serde_json::from_str("{}")?;
    let material = Material::from_json(3, json, &crate::khr_deserializer())?;

    assert_eq!(material.id, "3");
    assert_eq!(material.alpha_mode, MaterialAlphaMode::Opaque);
    assert_eq!(material.alpha_cutoff, 0.5);
    assert!(material.extensions.is_empty());

    Ok(())
}
