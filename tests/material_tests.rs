// Host-side tests for program assembly, meshes and the GL context.

use gradient_core::geometry::Orientation;
use gradient_core::gl::{DrawMode, GlCall, RecordingGl, ShaderStage, UniformUpload};
use gradient_core::material::{UniformScope, PRECISION_PREAMBLE};
use gradient_core::minigl::{DebugLog, MiniGl, OrthographicCamera};
use gradient_core::uniform::{Uniform, UniformSet, UniformValue};
use gradient_core::GlError;

const VERTEX: &str = "void main() {\n  gl_Position = projectionMatrix * modelViewMatrix * position;\n}";
const FRAGMENT: &str = "void main() {\n  gl_FragColor = vec4(u_tint, 1.0);\n}";

fn material_uniforms() -> UniformSet {
    UniformSet::new()
        .with("u_tint", Uniform::vec3([1.0, 0.5, 0.0]))
        .with(
            "u_deform",
            Uniform::structure(UniformSet::new().with("amp", Uniform::float(3.0)))
                .excluded_from(ShaderStage::Fragment),
        )
}

fn context() -> MiniGl<RecordingGl> {
    let mut minigl = MiniGl::new(RecordingGl::new(), false);
    minigl.set_size(300, 150);
    minigl
}

#[test]
fn sources_carry_preamble_attributes_and_declarations() {
    let mut minigl = context();
    let material = minigl
        .create_material(VERTEX, FRAGMENT, material_uniforms())
        .expect("links");

    let vs = material.vertex_source();
    assert!(vs.starts_with(PRECISION_PREAMBLE));
    assert!(vs.contains("attribute vec4 position;\nattribute vec2 uv;\nattribute vec2 uvNorm;"));
    assert!(vs.contains("uniform mat4 projectionMatrix;"));
    assert!(vs.contains("uniform struct Deform\n{\n float amp;\n} u_deform;"));
    assert!(vs.trim_end().ends_with(VERTEX));

    let fs = material.fragment_source();
    assert!(fs.starts_with(PRECISION_PREAMBLE));
    assert!(!fs.contains("attribute"));
    assert!(!fs.contains("u_deform"));
    assert!(fs.contains("uniform vec3 u_tint;"));
    assert_eq!(minigl.gl().last_source(ShaderStage::Fragment).as_deref(), Some(fs));
}

#[test]
fn every_leaf_gets_a_binding() {
    let mut minigl = context();
    let material = minigl
        .create_material(VERTEX, FRAGMENT, material_uniforms())
        .expect("links");
    let names: Vec<(&str, UniformScope)> = material
        .bindings()
        .iter()
        .map(|b| (b.name.as_str(), b.scope))
        .collect();
    assert_eq!(
        names,
        vec![
            ("projectionMatrix", UniformScope::Common),
            ("modelViewMatrix", UniformScope::Common),
            ("resolution", UniformScope::Common),
            ("aspectRatio", UniformScope::Common),
            ("u_tint", UniformScope::Material),
            ("u_deform.amp", UniformScope::Material),
        ]
    );
    assert!(material.bindings().iter().all(|b| b.location().is_some()));
}

#[test]
fn compile_failure_surfaces_as_link_error() {
    let mut minigl = context();
    minigl.gl().fail_compile(ShaderStage::Fragment);
    match minigl.create_material(VERTEX, FRAGMENT, material_uniforms()) {
        Err(GlError::Link { log }) => assert!(log.contains("fragment")),
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("program should not link"),
    }
}

#[test]
fn link_failure_is_an_error() {
    let mut minigl = context();
    minigl.gl().fail_link();
    assert!(matches!(
        minigl.create_material(VERTEX, FRAGMENT, UniformSet::new()),
        Err(GlError::Link { .. })
    ));
}

#[test]
fn set_size_updates_viewport_and_common_uniforms() {
    let minigl = context();
    let calls = minigl.gl().calls();
    assert!(calls.contains(&GlCall::SetDrawingBufferSize {
        width: 300,
        height: 150
    }));
    assert!(calls.contains(&GlCall::Viewport {
        width: 300,
        height: 150
    }));
    let common = minigl.common_uniforms();
    assert_eq!(
        common.get("resolution").map(Uniform::value),
        Some(&UniformValue::Vec2([300.0, 150.0]))
    );
    assert_eq!(
        common.get("aspectRatio").map(Uniform::value),
        Some(&UniformValue::Float(2.0))
    );
}

#[test]
fn orthographic_projection_layout() {
    let m = OrthographicCamera::default().projection(200, 100).to_cols_array();
    assert_eq!(
        m,
        [
            0.01, 0.0, 0.0, 0.0, 0.0, 0.02, 0.0, 0.0, 0.0, 0.0, -0.0005, 0.0, 0.0, 0.0, 0.0, 1.0
        ]
    );
    let shifted = OrthographicCamera {
        left: 1.0,
        right: 2.0,
        top: 3.0,
        ..OrthographicCamera::default()
    };
    assert_eq!(&shifted.projection(200, 100).to_cols_array()[12..], &[1.0, 2.0, 3.0, 1.0]);
}

#[test]
fn mesh_resolves_attribute_locations_once() {
    let mut minigl = context();
    let material = minigl
        .create_material(VERTEX, FRAGMENT, UniformSet::new())
        .expect("links");
    let geometry = minigl
        .create_plane_geometry(300.0, 150.0, 3, 2, Orientation::Xz)
        .expect("plane");
    let id = minigl.add_mesh(geometry, material);
    let mesh = minigl.mesh(id).expect("registered");
    // index buffers are not vertex attributes
    assert_eq!(mesh.attribute_locations(), &[Some(0), Some(1), Some(2), None]);
}

#[test]
fn render_clears_then_uploads_then_draws() {
    let mut minigl = context();
    let material = minigl
        .create_material(VERTEX, FRAGMENT, material_uniforms())
        .expect("links");
    let geometry = minigl
        .create_plane_geometry(300.0, 150.0, 3, 2, Orientation::Xz)
        .expect("plane");
    let id = minigl.add_mesh(geometry, material);
    minigl.gl().clear_calls();

    minigl.render();
    let calls = minigl.gl().calls();
    let pos = |pred: &dyn Fn(&GlCall) -> bool| calls.iter().position(pred).expect("call present");
    let clear = pos(&|c| matches!(c, GlCall::Clear));
    let upload = pos(&|c| matches!(c, GlCall::Uniform { .. }));
    let draw = pos(&|c| matches!(c, GlCall::DrawElements { .. }));
    assert!(clear < upload && upload < draw);
    assert_eq!(
        calls[draw],
        GlCall::DrawElements {
            mode: DrawMode::Triangles,
            count: 36
        }
    );
    assert_eq!(
        minigl.gl().last_uniform("u_tint"),
        Some(UniformUpload::Vec3([1.0, 0.5, 0.0]))
    );

    if let Some((_, mesh)) = minigl.mesh_mut(id) {
        mesh.wireframe = true;
    }
    minigl.render();
    assert!(minigl.gl().calls().contains(&GlCall::DrawElements {
        mode: DrawMode::Lines,
        count: 36
    }));
}

#[test]
fn removed_meshes_are_not_drawn() {
    let mut minigl = context();
    let material = minigl
        .create_material(VERTEX, FRAGMENT, UniformSet::new())
        .expect("links");
    let geometry = minigl
        .create_plane_geometry(10.0, 10.0, 1, 1, Orientation::Xz)
        .expect("plane");
    let id = minigl.add_mesh(geometry, material);
    assert_eq!(minigl.mesh_count(), 1);

    let mesh = minigl.remove_mesh(id).expect("was registered");
    assert_eq!(mesh.geometry().vertex_count(), 4);
    assert!(minigl.remove_mesh(id).is_none());

    minigl.gl().clear_calls();
    minigl.render();
    assert_eq!(minigl.gl().draw_count(), 0);
    assert!(minigl.gl().calls().contains(&GlCall::Clear));
}

#[test]
fn debug_log_is_off_by_default() {
    let mut log = DebugLog::default();
    assert!(!log.enabled());
    log.trace("MiniGl.setSize", (1, 2));
    assert!(DebugLog::new(true).enabled());
}

#[test]
fn failed_link_frees_its_objects() {
    let mut minigl = context();
    minigl.gl().fail_link();
    assert!(minigl.create_material(VERTEX, FRAGMENT, UniformSet::new()).is_err());
    assert_eq!(minigl.gl().live_programs(), 0);
    assert_eq!(minigl.gl().live_shaders(), 0);
}

#[test]
fn disposing_meshes_frees_buffers_and_programs() {
    let mut minigl = context();
    let mut ids = Vec::new();
    for _ in 0..2 {
        let material = minigl
            .create_material(VERTEX, FRAGMENT, UniformSet::new())
            .expect("links");
        let geometry = minigl
            .create_plane_geometry(10.0, 10.0, 2, 2, Orientation::Xz)
            .expect("plane");
        ids.push(minigl.add_mesh(geometry, material));
    }
    assert_eq!(minigl.gl().live_buffers(), 8);

    assert!(minigl.dispose_mesh(ids[0]));
    assert!(!minigl.dispose_mesh(ids[0]));
    assert_eq!(minigl.gl().live_buffers(), 4);
    assert_eq!(minigl.gl().live_programs(), 1);
    assert!(minigl
        .gl()
        .calls()
        .iter()
        .any(|c| matches!(c, GlCall::DeleteProgram(_))));

    minigl.dispose();
    assert_eq!(minigl.mesh_count(), 0);
    assert_eq!(minigl.gl().live_buffers(), 0);
    assert_eq!(minigl.gl().live_programs(), 0);
    assert_eq!(minigl.gl().live_shaders(), 0);
}
