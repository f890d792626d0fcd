use serde::{Deserialize, Serialize};

use super::LIGHTS_PUNCTUAL_NAME;
use crate::{Error, Identified, Result};

fn default_color() -> glam::Vec3 {
    glam::vec3(1.0, 1.0, 1.0)
}

fn default_intensity() -> f32 {
    1.0
}

fn default_inner_cone_angle() -> f32 {
    0.0
}

fn default_outer_cone_angle() -> f32 {
    std::f32::consts::FRAC_PI_4
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    Spot,
    Point,
    Directional,
}

/// A light source with no physical size.
///
/// `ty` is kept as the raw wire string; [`Punctual::light_type`] classifies it.
#[derive(Debug, Clone, PartialEq)]
pub struct Punctual {
    pub id: String,
    pub ty: String,
    pub name: String,
    pub color: glam::Vec3,
    pub intensity: f32,
    /// Zero means infinite.
    pub range: f32,
    pub inner_cone_angle: f32,
    pub outer_cone_angle: f32,
}

impl Default for Punctual {
    fn default() -> Self {
        Self {
            id: String::new(),
            ty: String::new(),
            name: String::new(),
            color: default_color(),
            intensity: default_intensity(),
            range: 0.0,
            inner_cone_angle: default_inner_cone_angle(),
            outer_cone_angle: default_outer_cone_angle(),
        }
    }
}

impl Punctual {
    pub fn new(id: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ty: ty.into(),
            ..Default::default()
        }
    }

    pub fn point(id: impl Into<String>) -> Self {
        Self::new(id, "point")
    }

    pub fn directional(id: impl Into<String>) -> Self {
        Self::new(id, "directional")
    }

    pub fn spot(id: impl Into<String>, inner_cone_angle: f32, outer_cone_angle: f32) -> Self {
        Self {
            inner_cone_angle,
            outer_cone_angle,
            ..Self::new(id, "spot")
        }
    }

    /// Anything other than `"spot"` or `"directional"`, including an empty
    /// string, is a point light.
    pub fn light_type(&self) -> LightType {
        match self.ty.as_str() {
            "spot" => LightType::Spot,
            "directional" => LightType::Directional,
            _ => LightType::Point,
        }
    }

    /// Falloff scale and offset for spot lights, as consumed by shaders.
    pub fn spot_angle_scale_offset(&self) -> Option<(f32, f32)> {
        if self.light_type() != LightType::Spot {
            return None;
        }

        // https://github.com/KhronosGroup/glTF/tree/master/extensions/2.0/Khronos/KHR_lights_punctual#inner-and-outer-cone-angles
        let light_angle_scale =
            1.0 / (0.001f32).max(self.inner_cone_angle.cos() - self.outer_cone_angle.cos());
        let light_angle_offset = -self.outer_cone_angle.cos() * light_angle_scale;

        Some((light_angle_scale, light_angle_offset))
    }
}

impl Identified for Punctual {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PunctualJson {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default = "default_color")]
    color: glam::Vec3,
    #[serde(default = "default_intensity")]
    intensity: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    range: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    spot: Option<SpotJson>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpotJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    inner_cone_angle: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outer_cone_angle: Option<f32>,
}

impl Punctual {
    pub(super) fn from_json(index: usize, json: PunctualJson) -> Result<Self> {
        let missing = |field: &str| Error::MissingField {
            extension: LIGHTS_PUNCTUAL_NAME,
            field: format!("lights[{index}].{field}"),
        };

        let mut light = Self {
            id: index.to_string(),
            ty: json.ty,
            name: json.name,
            color: json.color,
            intensity: json.intensity,
            range: json.range.unwrap_or(0.0),
            ..Default::default()
        };

        match (light.light_type(), json.spot) {
            (LightType::Spot, None) => return Err(missing("spot")),
            (LightType::Spot, Some(spot)) => {
                light.inner_cone_angle = spot
                    .inner_cone_angle
                    .ok_or_else(|| missing("spot.innerConeAngle"))?;
                light.outer_cone_angle = spot
                    .outer_cone_angle
                    .ok_or_else(|| missing("spot.outerConeAngle"))?;
            }
            (_, Some(spot)) => {
                light.inner_cone_angle = spot.inner_cone_angle.unwrap_or(light.inner_cone_angle);
                light.outer_cone_angle = spot.outer_cone_angle.unwrap_or(light.outer_cone_angle);
            }
            (_, None) => {}
        }

        Ok(light)
    }

    fn has_default_cone(&self) -> bool {
        self.inner_cone_angle == default_inner_cone_angle()
            && self.outer_cone_angle == default_outer_cone_angle()
    }

    /// Non-spot lights only write `spot` when their cone differs from the
    /// defaults, so the angles read back unchanged.
    pub(super) fn to_json(&self) -> PunctualJson {
        let write_spot = self.light_type() == LightType::Spot || !self.has_default_cone();
        let spot = write_spot.then_some(SpotJson {
            inner_cone_angle: Some(self.inner_cone_angle),
            outer_cone_angle: Some(self.outer_cone_angle),
        });

        PunctualJson {
            ty: self.ty.clone(),
            name: self.name.clone(),
            color: self.color,
            intensity: self.intensity,
            range: (self.range != 0.0).then_some(self.range),
            spot,
        }
    }
}

#[test]
fn light_type_fallback() {
    let ty = |ty: &str| Punctual::new("0", ty).light_type();

    assert_eq!(ty("spot"), LightType::Spot);
    assert_eq!(ty("directional"), LightType::Directional);
    assert_eq!(ty("point"), LightType::Point);
    assert_eq!(ty(""), LightType::Point);
    assert_eq!(ty("unknown"), LightType::Point);
    assert_eq!(ty("Spot"), LightType::Point);
    assert_eq!(Punctual::default().light_type(), LightType::Point);
}

#[test]
fn spot_angle_scale_offset() {
    assert_eq!(Punctual::point("0").spot_angle_scale_offset(), None);

    let spot = Punctual::spot("0", 0.0, std::f32::consts::FRAC_PI_2);
    let (scale, offset) = spot.spot_angle_scale_offset().expect("spot");
    assert!((scale - 1.0).abs() < 1e-5);
    assert!(offset.abs() < 1e-5);
}

#[test]
fn cone_angles_survive_on_any_light_type() -> Result<()> {
    for ty in ["point", "directional", "area"] {
        let light = Punctual {
            inner_cone_angle: 0.3,
            outer_cone_angle: 0.6,
            ..Punctual::new("0", ty)
        };

        let json = serde_json::to_string(&light.to_json())?;
        let back = Punctual::from_json(0, serde_json::from_str(&json)?)?;
        assert_eq!(back, light, "{json}");
    }

    let json = serde_json::to_value(Punctual::point("0").to_json())?;
    assert!(json.get("spot").is_none());

    Ok(())
}
