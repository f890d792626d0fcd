use serde::{Deserialize, Serialize};

use super::parse_object;
use crate::{json::Document, ExtensionDeserializer, ExtensionSerializer, Result};

pub const TEXTURE_TRANSFORM_NAME: &str = "KHR_texture_transform";

fn default_offset() -> glam::Vec2 {
    glam::vec2(0.0, 0.0)
}

fn default_rotation() -> f32 {
    0.0
}

fn default_scale() -> glam::Vec2 {
    glam::vec2(1.0, 1.0)
}

/// UV transform applied to one texture reference.
///
/// Composed as scale, then counter-clockwise rotation (radians), then
/// translation by `offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureTransform {
    pub offset: glam::Vec2,
    pub rotation: f32,
    pub scale: glam::Vec2,
    /// Overrides the texture coordinate set of the owning reference.
    pub tex_coord: Option<u32>,
}

impl Default for TextureTransform {
    fn default() -> Self {
        Self {
            offset: default_offset(),
            rotation: default_rotation(),
            scale: default_scale(),
            tex_coord: None,
        }
    }
}

impl TextureTransform {
    pub fn matrix(&self) -> glam::Mat3 {
        glam::Mat3::from_scale_angle_translation(self.scale, self.rotation, self.offset)
    }

    pub fn transform_uv(&self, uv: glam::Vec2) -> glam::Vec2 {
        self.matrix().transform_point2(uv)
    }

    /// Coordinate set the transform reads from; slot 0 when unset.
    pub fn coordinate_set(&self) -> u32 {
        self.tex_coord.unwrap_or(0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextureTransformJson {
    #[serde(default = "default_offset")]
    offset: glam::Vec2,
    #[serde(default = "default_rotation")]
    rotation: f32,
    #[serde(default = "default_scale")]
    scale: glam::Vec2,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tex_coord: Option<u32>,
}

pub fn serialize_texture_transform(
    transform: &TextureTransform,
    _doc: &Document,
    _ser: &ExtensionSerializer,
) -> Result<String> {
    let json = TextureTransformJson {
        offset: transform.offset,
        rotation: transform.rotation,
        scale: transform.scale,
        tex_coord: transform.tex_coord,
    };

    Ok(serde_json::to_string(&json)?)
}

pub fn deserialize_texture_transform(
    json: &str,
    _de: &ExtensionDeserializer,
) -> Result<TextureTransform> {
    let json: TextureTransformJson = parse_object(json, TEXTURE_TRANSFORM_NAME)?;

    Ok(TextureTransform {
        offset: json.offset,
        rotation: json.rotation,
        scale: json.scale,
        tex_coord: json.tex_coord,
    })
}

#[cfg(test)]
use crate::{khr_deserializer, khr_serializer, Error};

#[test]
fn defaults_on_empty_object() -> Result<()> {
    let transform = deserialize_texture_transform("{}", &khr_deserializer())?;

    assert_eq!(transform.offset, glam::Vec2::ZERO);
    assert_eq!(transform.rotation, 0.0);
    assert_eq!(transform.scale, glam::Vec2::ONE);
    assert_eq!(transform.tex_coord, None);
    assert_eq!(transform.coordinate_set(), 0);
    assert_eq!(transform.matrix(), glam::Mat3::IDENTITY);

    Ok(())
}

#[test]
fn tex_coord_must_be_non_negative() {
    assert!(matches!(
        deserialize_texture_transform(r#"{ "texCoord": -1 }"#, &khr_deserializer()),
        Err(Error::Schema { .. })
    ));
}

#[test]
fn scale_rotate_translate() {
    let transform = TextureTransform {
        offset: glam::vec2(1.0, 0.0),
        rotation: std::f32::consts::FRAC_PI_2,
        scale: glam::vec2(2.0, 2.0),
        tex_coord: Some(1),
    };

    // (1, 0) -> scale (2, 0) -> rotate (0, 2) -> translate (1, 2)
    let uv = transform.transform_uv(glam::vec2(1.0, 0.0));
    assert!((uv - glam::vec2(1.0, 2.0)).length() < 1e-5, "{uv}");
    assert_eq!(transform.coordinate_set(), 1);
}

#[test]
fn copies_are_independent() {
    let original = TextureTransform {
        tex_coord: Some(3),
        ..Default::default()
    };

    let mut copy = original;
    copy.tex_coord = None;
    copy.offset.x = 0.5;

    assert_eq!(original.tex_coord, Some(3));
    assert_eq!(original.offset, glam::Vec2::ZERO);
}

#[test]
fn round_trip() -> Result<()> {
    let transform = TextureTransform {
        offset: glam::vec2(0.25, -0.5),
        rotation: 0.75,
        scale: glam::vec2(4.0, 0.5),
        tex_coord: Some(2),
    };

    let json = serialize_texture_transform(&transform, &Document::default(), &khr_serializer())?;
    assert_eq!(deserialize_texture_transform(&json, &khr_deserializer())?, transform);

    Ok(())
}
