// Host-side tests for the uniform graph: declaration text, binding names and
// the upload dispatch.

use gradient_core::gl::{GlCall, RecordedLocation, RecordingGl, ShaderStage, UniformUpload};
use gradient_core::uniform::{struct_type_name, Uniform, UniformKind, UniformSet, UniformValue};
use gradient_core::UniformError;

fn global() -> Uniform {
    Uniform::structure(
        UniformSet::new()
            .with("noiseFreq", Uniform::vec2([1.0, 2.0]))
            .with("noiseSpeed", Uniform::float(0.5)),
    )
}

fn layer(r: f32) -> Uniform {
    Uniform::structure(
        UniformSet::new()
            .with("color", Uniform::vec4([r, 0.0, 0.0, 1.0]))
            .with("noiseSeed", Uniform::float(r)),
    )
}

#[test]
fn leaf_declarations_use_glsl_types() {
    assert_eq!(
        Uniform::float(1.0).declaration("u_time", ShaderStage::Vertex, None),
        "uniform float u_time;"
    );
    assert_eq!(
        Uniform::int(3).declaration("u_count", ShaderStage::Fragment, None),
        "uniform int u_count;"
    );
    assert_eq!(
        Uniform::vec3([0.0; 3]).declaration("u_tint", ShaderStage::Vertex, None),
        "uniform vec3 u_tint;"
    );
    assert_eq!(
        Uniform::mat4([0.0; 16]).declaration("projectionMatrix", ShaderStage::Vertex, None),
        "uniform mat4 projectionMatrix;"
    );
}

#[test]
fn excluded_stage_declares_nothing() {
    let u = Uniform::vec4([1.0; 4]).excluded_from(ShaderStage::Fragment);
    assert_eq!(u.declaration("u_baseColor", ShaderStage::Fragment, None), "");
    assert_eq!(
        u.declaration("u_baseColor", ShaderStage::Vertex, None),
        "uniform vec4 u_baseColor;"
    );
}

#[test]
fn struct_declaration_strips_prefix_and_field_keywords() {
    let decl = global().declaration("u_global", ShaderStage::Vertex, None);
    assert_eq!(
        decl,
        "uniform struct Global\n{\n vec2 noiseFreq;\n float noiseSpeed;\n} u_global;"
    );
}

#[test]
fn array_of_structs_declares_element_type_once_with_length() {
    let layers = Uniform::array("u_waveLayers", vec![layer(0.1), layer(0.2)]).expect("same shape");
    let decl = layers.declaration("u_waveLayers", ShaderStage::Vertex, None);
    assert!(decl.starts_with("uniform struct WaveLayers\n{\n"));
    assert!(decl.ends_with("} u_waveLayers[2];\nconst int u_waveLayers_length = 2;"));
    assert_eq!(decl.matches("struct").count(), 1);
}

#[test]
fn array_of_scalars_declares_sized_uniform() {
    let list = Uniform::array(
        "u_weights",
        vec![Uniform::float(1.0), Uniform::float(2.0), Uniform::float(3.0)],
    )
    .expect("floats");
    assert_eq!(
        list.declaration("u_weights", ShaderStage::Fragment, None),
        "uniform float u_weights[3];\nconst int u_weights_length = 3;"
    );
}

#[test]
fn arrays_reject_empty_and_mixed_elements() {
    assert_eq!(
        Uniform::array("u_none", Vec::new()),
        Err(UniformError::EmptyArray {
            name: "u_none".into()
        })
    );
    let mixed = Uniform::array("u_mixed", vec![Uniform::float(1.0), Uniform::vec2([0.0; 2])]);
    assert!(matches!(mixed, Err(UniformError::MixedArray { .. })));

    // structs with different fields do not share a type
    let other = Uniform::structure(UniformSet::new().with("color", Uniform::vec4([0.0; 4])));
    assert!(Uniform::array("u_layers", vec![layer(0.1), other]).is_err());
}

#[test]
fn struct_type_names() {
    assert_eq!(struct_type_name("u_vertDeform"), "VertDeform");
    assert_eq!(struct_type_name("u_waveLayers"), "WaveLayers");
    assert_eq!(struct_type_name("global"), "Global");
}

#[test]
fn leaf_bindings_match_declaration_naming() {
    let set = UniformSet::new()
        .with("u_time", Uniform::float(0.0))
        .with("u_global", global())
        .with(
            "u_layers",
            Uniform::array("u_layers", vec![layer(0.1), layer(0.2)]).expect("layers"),
        );
    let names: Vec<String> = set.leaf_bindings().into_iter().map(|(n, _)| n).collect();
    assert_eq!(
        names,
        vec![
            "u_time",
            "u_global.noiseFreq",
            "u_global.noiseSpeed",
            "u_layers[0].color",
            "u_layers[0].noiseSeed",
            "u_layers[1].color",
            "u_layers[1].noiseSeed",
        ]
    );

    // every path leads back to a leaf with the expected value
    let (_, path) = set.leaf_bindings().into_iter().nth(5).expect("sixth leaf");
    let leaf = set.leaf(&path).expect("resolves");
    assert_eq!(leaf.value(), &UniformValue::Vec4([0.2, 0.0, 0.0, 1.0]));
}

#[test]
fn set_only_accepts_same_kind_leaves() {
    let mut time = Uniform::float(0.0);
    assert!(time.set(UniformValue::Float(4.0)));
    assert!(!time.set(UniformValue::Int(4)));
    assert_eq!(time.value(), &UniformValue::Float(4.0));

    let mut g = global();
    assert!(!g.set(UniformValue::Float(1.0)));
    assert_eq!(g.kind(), UniformKind::Struct);
    let freq = g.field_mut("noiseFreq").expect("field");
    assert!(freq.set(UniformValue::Vec2([9.0, 9.0])));
    assert_eq!(
        g.field("noiseFreq").map(Uniform::value),
        Some(&UniformValue::Vec2([9.0, 9.0]))
    );
}

#[test]
fn insert_replaces_in_place() {
    let mut set = UniformSet::new()
        .with("a", Uniform::float(1.0))
        .with("b", Uniform::float(2.0));
    set.insert("a", Uniform::int(7));
    let order: Vec<&str> = set.iter().map(|(n, _)| n).collect();
    assert_eq!(order, vec!["a", "b"]);
    assert_eq!(set.get("a").map(Uniform::kind), Some(UniformKind::Int));
    assert_eq!(set.len(), 2);
}

#[test]
fn upload_dispatches_per_kind() {
    let gl = RecordingGl::new();
    let location = RecordedLocation {
        program: 1,
        name: "m".into(),
    };
    let identity = [
        1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
    ];
    Uniform::mat4(identity).transposed().upload(&gl, &location);
    Uniform::int(2).upload(&gl, &location);
    // containers have no upload of their own
    global().upload(&gl, &location);

    assert_eq!(
        gl.uniform_uploads("m"),
        vec![
            UniformUpload::Mat4 {
                transpose: true,
                value: identity
            },
            UniformUpload::Int(2),
        ]
    );
    assert!(gl
        .calls()
        .iter()
        .all(|c| matches!(c, GlCall::Uniform { .. })));
}
