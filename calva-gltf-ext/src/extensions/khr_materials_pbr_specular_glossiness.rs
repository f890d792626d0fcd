use serde::{Deserialize, Serialize};

use super::parse_object;
use crate::{
    json::{Document, TextureInfo, TextureInfoJson},
    ExtensionDeserializer, ExtensionSerializer, Result,
};

pub const PBR_SPECULAR_GLOSSINESS_NAME: &str = "KHR_materials_pbrSpecularGlossiness";

fn default_diffuse_factor() -> glam::Vec4 {
    glam::vec4(1.0, 1.0, 1.0, 1.0)
}

fn default_specular_factor() -> glam::Vec3 {
    glam::vec3(1.0, 1.0, 1.0)
}

fn default_glossiness_factor() -> f32 {
    1.0
}

/// Specular-glossiness shading model layered onto a material.
#[derive(Debug, Clone, PartialEq)]
pub struct PbrSpecularGlossiness {
    pub diffuse_factor: glam::Vec4,
    pub diffuse_texture: Option<TextureInfo>,
    pub specular_factor: glam::Vec3,
    pub glossiness_factor: f32,
    pub specular_glossiness_texture: Option<TextureInfo>,
}

impl Default for PbrSpecularGlossiness {
    fn default() -> Self {
        Self {
            diffuse_factor: default_diffuse_factor(),
            diffuse_texture: None,
            specular_factor: default_specular_factor(),
            glossiness_factor: default_glossiness_factor(),
            specular_glossiness_texture: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PbrSpecularGlossinessJson {
    #[serde(default = "default_diffuse_factor")]
    diffuse_factor: glam::Vec4,
    #[serde(skip_serializing_if = "Option::is_none")]
    diffuse_texture: Option<TextureInfoJson>,
    #[serde(default = "default_specular_factor")]
    specular_factor: glam::Vec3,
    #[serde(default = "default_glossiness_factor")]
    glossiness_factor: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    specular_glossiness_texture: Option<TextureInfoJson>,
}

pub fn serialize_pbr_spec_gloss(
    spec_gloss: &PbrSpecularGlossiness,
    doc: &Document,
    ser: &ExtensionSerializer,
) -> Result<String> {
    let texture = |info: &Option<TextureInfo>| match info {
        Some(info) => info.to_json(doc, ser),
        None => Ok(None),
    };

    let json = PbrSpecularGlossinessJson {
        diffuse_factor: spec_gloss.diffuse_factor,
        diffuse_texture: texture(&spec_gloss.diffuse_texture)?,
        specular_factor: spec_gloss.specular_factor,
        glossiness_factor: spec_gloss.glossiness_factor,
        specular_glossiness_texture: texture(&spec_gloss.specular_glossiness_texture)?,
    };

    Ok(serde_json::to_string(&json)?)
}

pub fn deserialize_pbr_spec_gloss(
    json: &str,
    de: &ExtensionDeserializer,
) -> Result<PbrSpecularGlossiness> {
    let json: PbrSpecularGlossinessJson = parse_object(json, PBR_SPECULAR_GLOSSINESS_NAME)?;

    let texture = |info: Option<TextureInfoJson>| {
        info.map(|info| TextureInfo::from_json(info, de)).transpose()
    };

    Ok(PbrSpecularGlossiness {
        diffuse_factor: json.diffuse_factor,
        diffuse_texture: texture(json.diffuse_texture)?,
        specular_factor: json.specular_factor,
        glossiness_factor: json.glossiness_factor,
        specular_glossiness_texture: texture(json.specular_glossiness_texture)?,
    })
}

#[cfg(test)]
use crate::{extensions::TextureTransform, json::Texture, khr_deserializer, khr_serializer, Error};

#[test]
fn defaults_on_empty_object() -> Result<()> {
    let spec_gloss = deserialize_pbr_spec_gloss("{}", &khr_deserializer())?;

    assert_eq!(spec_gloss.diffuse_factor, glam::Vec4::ONE);
    assert_eq!(spec_gloss.specular_factor, glam::Vec3::ONE);
    assert_eq!(spec_gloss.glossiness_factor, 1.0);
    assert_eq!(spec_gloss.diffuse_texture, None);
    assert_eq!(spec_gloss, PbrSpecularGlossiness::default());

    Ok(())
}

#[test]
fn wrong_field_type_is_a_schema_error() {
    let de = khr_deserializer();

    for json in [
        r#"[]"#,
        r#"{ "glossinessFactor": "shiny" }"#,
        r#"{ "diffuseFactor": [1.0, 1.0] }"#,
        r#"{ "diffuseTexture": { "texCoord": 1 } }"#,
    ] {
        assert!(
            matches!(
                deserialize_pbr_spec_gloss(json, &de),
                Err(Error::Schema {
                    extension: PBR_SPECULAR_GLOSSINESS_NAME,
                    ..
                })
            ),
            "{json}"
        );
    }
}

#[test]
fn schema_errors_name_the_field() {
    let err = deserialize_pbr_spec_gloss(
        r#"{ "glossinessFactor": "shiny" }"#,
        &khr_deserializer(),
    )
    .unwrap_err();

    assert!(matches!(&err, Error::Schema { path, .. } if path == "glossinessFactor"));
    assert!(err.to_string().contains("`glossinessFactor`"), "{err}");
}

#[test]
fn nested_texture_transform() -> Result<()> {
    let spec_gloss = deserialize_pbr_spec_gloss(
        r#"{
            "diffuseFactor": [0.5, 0.5, 0.5, 1.0],
            "diffuseTexture": {
                "index": 2,
                "texCoord": 1,
                "extensions": { "KHR_texture_transform": { "offset": [0.5, 0.0] } }
            }
        }"#,
        &khr_deserializer(),
    )?;

    let diffuse = spec_gloss.diffuse_texture.expect("diffuse texture");
    assert_eq!(diffuse.texture_id, "2");
    assert_eq!(diffuse.tex_coord, 1);
    assert_eq!(
        diffuse.extensions.get::<TextureTransform>().map(|t| t.offset),
        Some(glam::vec2(0.5, 0.0))
    );

    Ok(())
}

#[test]
fn unresolved_textures_are_omitted() -> Result<()> {
    let mut doc = Document::default();
    doc.textures.push(Texture::new("albedo"))?;

    let spec_gloss = PbrSpecularGlossiness {
        diffuse_texture: Some(TextureInfo::new("albedo")),
        specular_glossiness_texture: Some(TextureInfo::new("missing")),
        glossiness_factor: 0.25,
        ..Default::default()
    };

    let out: serde_json::Value =
        serde_json::from_str(&serialize_pbr_spec_gloss(&spec_gloss, &doc, &khr_serializer())?)?;

    assert_eq!(out["diffuseTexture"], serde_json::json!({ "index": 0 }));
    assert_eq!(out["glossinessFactor"], serde_json::json!(0.25));
    assert!(out.get("specularGlossinessTexture").is_none());

    Ok(())
}

#[test]
fn round_trip() -> Result<()> {
    let mut doc = Document::default();
    doc.textures.push(Texture::new("0"))?;
    doc.textures.push(Texture::new("1"))?;

    let mut specular = TextureInfo::new("1");
    specular.tex_coord = 1;
    specular.extensions.insert(TextureTransform {
        rotation: 0.3,
        ..Default::default()
    });

    let spec_gloss = PbrSpecularGlossiness {
        diffuse_factor: glam::vec4(0.2, 0.4, 0.6, 0.8),
        diffuse_texture: Some(TextureInfo::new("0")),
        specular_factor: glam::vec3(0.5, 0.5, 0.5),
        glossiness_factor: 0.75,
        specular_glossiness_texture: Some(specular),
    };

    let json = serialize_pbr_spec_gloss(&spec_gloss, &doc, &khr_serializer())?;
    assert_eq!(deserialize_pbr_spec_gloss(&json, &khr_deserializer())?, spec_gloss);

    Ok(())
}
