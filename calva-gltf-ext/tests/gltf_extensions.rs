//! Whole-document reads and writes through the `KHR_*` registry.

use calva_gltf_ext::{
    extensions::*,
    json::{BufferView, Document, Material, Mesh, MeshPrimitive, Node, Texture, TextureInfo},
    khr_deserializer, khr_serializer, Config, Error, UnknownExtensionPolicy,
};
use serde_json::Value;

const SCENE: &str = r#"{
    "asset": { "version": "2.0", "generator": "hand written" },
    "extensionsUsed": [
        "KHR_draco_mesh_compression",
        "KHR_lights_punctual",
        "KHR_materials_pbrSpecularGlossiness",
        "KHR_materials_unlit",
        "KHR_texture_transform",
        "EXT_vendor_thing"
    ],
    "extensionsRequired": ["KHR_draco_mesh_compression"],
    "bufferViews": [
        { "buffer": 0, "byteLength": 128 },
        { "buffer": 0, "byteLength": 64, "byteOffset": 128 }
    ],
    "textures": [{ "source": 0 }],
    "materials": [
        {
            "name": "shiny",
            "extensions": {
                "KHR_materials_pbrSpecularGlossiness": {
                    "diffuseFactor": [0.5, 0.5, 0.5, 1.0],
                    "glossinessFactor": 0.25,
                    "diffuseTexture": {
                        "index": 0,
                        "texCoord": 1,
                        "extensions": {
                            "KHR_texture_transform": {
                                "offset": [0.5, 0.0],
                                "rotation": 1.5,
                                "scale": [2.0, 2.0],
                                "texCoord": 1
                            }
                        }
                    }
                },
                "EXT_vendor_thing": { "strength": 3 }
            }
        },
        { "name": "flat", "extensions": { "KHR_materials_unlit": {} } }
    ],
    "meshes": [{
        "primitives": [{
            "attributes": { "POSITION": 0, "NORMAL": 1 },
            "material": 1,
            "extensions": {
                "KHR_draco_mesh_compression": {
                    "bufferView": 1,
                    "attributes": { "POSITION": 0, "NORMAL": 1 }
                }
            }
        }]
    }],
    "nodes": [
        { "name": "root", "children": [1, 2], "mesh": 0 },
        { "name": "sun", "extensions": { "KHR_lights_punctual": { "light": 0 } } },
        { "name": "lamp", "extensions": { "KHR_lights_punctual": { "light": 1 } } }
    ],
    "extensions": {
        "KHR_lights_punctual": {
            "lights": [
                { "type": "directional", "intensity": 3.0 },
                {
                    "type": "spot",
                    "name": "lamp",
                    "color": [1.0, 0.5, 0.25],
                    "range": 20.0,
                    "spot": { "innerConeAngle": 0.25, "outerConeAngle": 0.5 }
                }
            ]
        }
    }
}"#;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn reads_every_extension() -> anyhow::Result<()> {
    init_logger();

    let doc = Document::from_json(SCENE, &khr_deserializer())?;

    let shiny = doc.materials.get("0").expect("material 0");
    let spec_gloss = shiny
        .extensions
        .get::<PbrSpecularGlossiness>()
        .expect("spec gloss");
    assert_eq!(spec_gloss.diffuse_factor, glam::vec4(0.5, 0.5, 0.5, 1.0));
    assert_eq!(spec_gloss.specular_factor, glam::Vec3::ONE);
    assert_eq!(spec_gloss.glossiness_factor, 0.25);
    assert!(spec_gloss.specular_glossiness_texture.is_none());

    let diffuse = spec_gloss.diffuse_texture.as_ref().expect("diffuse texture");
    assert_eq!(diffuse.tex_coord, 1);
    assert!(diffuse.texture(&doc).is_some());
    let transform = diffuse
        .extensions
        .get::<TextureTransform>()
        .expect("texture transform");
    assert_eq!(transform.rotation, 1.5);
    assert_eq!(transform.coordinate_set(), 1);
    assert_eq!(
        shiny.extensions.raw("EXT_vendor_thing"),
        Some(&serde_json::json!({ "strength": 3 }))
    );

    let flat = doc.materials.get("1").expect("material 1");
    assert!(flat.extensions.contains::<Unlit>());

    let primitive = &doc.meshes.at(0).expect("mesh").primitives[0];
    let draco = primitive
        .extensions
        .get::<DracoMeshCompression>()
        .expect("draco");
    assert_eq!(draco.buffer_view_id, "1");
    assert_eq!(draco.attributes.get("NORMAL"), Some(&1));
    assert_eq!(primitive.material(&doc).map(|m| m.name.as_str()), Some("flat"));

    let lights = doc.lights().expect("lights");
    assert_eq!(lights.lights.len(), 2);

    let lamp = doc.nodes.get("2").expect("lamp node");
    let light = lamp
        .extensions
        .get::<LightNode>()
        .expect("light node")
        .light(&doc)?;
    assert_eq!(light.light_type(), LightType::Spot);
    assert_eq!(light.name, "lamp");
    assert_eq!(light.range, 20.0);
    assert_eq!(light.outer_cone_angle, 0.5);

    Ok(())
}

#[test]
fn write_then_read_is_stable() -> anyhow::Result<()> {
    init_logger();

    let doc = Document::from_json(SCENE, &khr_deserializer())?;
    let json = doc.to_json(&khr_serializer())?;
    let reread = Document::from_json(&json, &khr_deserializer())?;

    assert_eq!(reread, doc);

    let value: Value = serde_json::from_str(&json)?;
    assert_eq!(
        value["nodes"][1]["extensions"]["KHR_lights_punctual"],
        serde_json::json!({ "light": 0 })
    );
    assert!(value["extensions"]["KHR_lights_punctual"]["lights"][0].get("spot").is_none());
    assert_eq!(
        value["extensionsUsed"].as_array().map(Vec::len),
        Some(6),
        "{}",
        value["extensionsUsed"]
    );

    Ok(())
}

#[test]
fn clones_do_not_share_state() -> anyhow::Result<()> {
    let doc = Document::from_json(SCENE, &khr_deserializer())?;
    let mut copy = doc.clone();

    let lights = copy
        .extensions
        .get_mut::<LightExtension>()
        .expect("lights");
    lights
        .lights
        .get_mut("0")
        .expect("light 0")
        .intensity = 10.0;

    assert_ne!(copy, doc);
    let intensity = doc
        .lights()
        .and_then(|lights| lights.lights.get("0"))
        .map(|light| light.intensity);
    assert_eq!(intensity, Some(3.0));

    let original: Extension = doc.lights().cloned().expect("lights").into();
    let mut cloned = original.clone();
    assert_eq!(cloned, original);
    if let Extension::LightsPunctual(lights) = &mut cloned {
        lights.push(Punctual::point(""))?;
    }
    assert_ne!(cloned, original);

    Ok(())
}

#[test]
fn unknown_extension_policy() -> anyhow::Result<()> {
    init_logger();

    let skip = Config {
        unknown_extensions: UnknownExtensionPolicy::Skip,
        ..Default::default()
    };
    let doc = Document::read(SCENE, &skip)?;
    let shiny = doc.materials.get("0").expect("material 0");
    assert!(shiny.extensions.raw("EXT_vendor_thing").is_none());
    assert!(!doc.write(&skip)?.contains("EXT_vendor_thing"));

    let fail = Config {
        unknown_extensions: UnknownExtensionPolicy::Fail,
        ..Default::default()
    };
    let err = Document::read(SCENE, &fail).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::UnknownExtension { name, .. }) if name == "EXT_vendor_thing"
    ));

    Ok(())
}

#[test]
fn builds_a_document_from_scratch() -> anyhow::Result<()> {
    init_logger();

    let mut doc = Document::default();
    doc.buffer_views.push(BufferView {
        id: "draco".into(),
        buffer: 0,
        byte_length: 32,
        ..Default::default()
    })?;
    doc.textures.push(Texture::new("albedo"))?;

    let mut info = TextureInfo::new("albedo");
    info.extensions.insert(TextureTransform {
        scale: glam::vec2(4.0, 4.0),
        ..Default::default()
    });

    let mut material = Material::new("brick");
    material.extensions.insert(PbrSpecularGlossiness {
        diffuse_texture: Some(info),
        specular_glossiness_texture: Some(TextureInfo::new("missing")),
        ..Default::default()
    });
    doc.materials.push(material)?;

    let mut lights = LightExtension::new();
    lights.push(Punctual::spot("torch", 0.0, 0.7))?;
    doc.extensions.insert(lights);

    let mut node = Node::new("holder");
    node.extensions.insert(LightNode::new("torch"));
    doc.nodes.push(node)?;

    let value: Value = serde_json::from_str(&doc.to_json(&khr_serializer())?)?;

    let spec_gloss = &value["materials"][0]["extensions"]["KHR_materials_pbrSpecularGlossiness"];
    assert_eq!(spec_gloss["diffuseTexture"]["index"], 0);
    assert_eq!(
        spec_gloss["diffuseTexture"]["extensions"]["KHR_texture_transform"]["scale"],
        serde_json::json!([4.0, 4.0])
    );
    assert!(spec_gloss.get("specularGlossinessTexture").is_none());
    assert_eq!(value["nodes"][0]["extensions"]["KHR_lights_punctual"]["light"], 0);

    Ok(())
}

#[test]
fn dangling_references_fail_the_write() -> anyhow::Result<()> {
    let mut doc = Document::default();
    let mut node = Node::new("orphan");
    node.extensions.insert(LightNode::new("nowhere"));
    doc.nodes.push(node)?;

    let err = doc.to_json(&khr_serializer()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::DanglingReference { id, .. }) if id == "nowhere"
    ));
    assert!(err.to_string().contains("orphan"));

    let mut doc = Document::default();
    let mut primitive = MeshPrimitive::default();
    primitive.extensions.insert(DracoMeshCompression::new("gone"));
    doc.meshes.push(Mesh {
        id: "mesh".into(),
        primitives: vec![primitive],
        ..Default::default()
    })?;

    let err = doc.to_json(&khr_serializer()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::DanglingReference { kind: "bufferView", .. })
    ));

    Ok(())
}
