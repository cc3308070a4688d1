// Host-side tests for plane tessellation and attribute buffers.

use gradient_core::attribute::{Attribute, AttributeValues};
use gradient_core::geometry::{Orientation, PlaneGeometry, MAX_VERTICES};
use gradient_core::gl::{BufferTarget, ComponentType, GlCall, RecordingGl};
use gradient_core::{GeometryError, GlError, GradientError};

fn floats(attribute: &Attribute<RecordingGl>) -> Vec<f32> {
    attribute.values().as_f32().expect("float attribute").to_vec()
}

#[test]
fn counts_follow_segment_counts() {
    let gl = RecordingGl::new();
    for (xs, ys) in [(1, 1), (3, 2), (77, 96)] {
        let g = PlaneGeometry::new(&gl, 100.0, 50.0, xs, ys, Orientation::Xz).expect("plane");
        assert_eq!(g.vertex_count(), (xs + 1) * (ys + 1));
        assert_eq!(g.quad_count(), xs * ys * 2);
        assert_eq!(g.index_count(), 6 * xs * ys);
        assert_eq!(floats(&g.attributes().position).len(), 3 * g.vertex_count());
        assert_eq!(floats(&g.attributes().uv).len(), 2 * g.vertex_count());
    }
}

#[test]
fn cells_are_wound_consistently() {
    let gl = RecordingGl::new();
    let g = PlaneGeometry::new(&gl, 1.0, 1.0, 3, 2, Orientation::Xz).expect("plane");
    let index = g.attributes().index.values().as_u16().expect("indices").to_vec();
    // top-left, bottom-left, top-right / top-right, bottom-left, bottom-right
    assert_eq!(&index[..6], &[0, 4, 1, 1, 4, 5]);
    // second cell of the second row
    assert_eq!(&index[6 * 4..6 * 5], &[5, 9, 6, 6, 9, 10]);
}

#[test]
fn uvs_span_the_plane() {
    let gl = RecordingGl::new();
    let g = PlaneGeometry::new(&gl, 1.0, 1.0, 4, 4, Orientation::Xz).expect("plane");
    let uv = floats(&g.attributes().uv);
    let uv_norm = floats(&g.attributes().uv_norm);
    let last = 2 * (g.vertex_count() - 1);
    assert_eq!(&uv[..2], &[0.0, 1.0]);
    assert_eq!(&uv[last..], &[1.0, 0.0]);
    assert_eq!(&uv_norm[..2], &[-1.0, 1.0]);
    assert_eq!(&uv_norm[last..], &[1.0, -1.0]);
}

#[test]
fn positions_follow_orientation() {
    let gl = RecordingGl::new();
    let mut g = PlaneGeometry::new(&gl, 200.0, 100.0, 2, 2, Orientation::Xz).expect("plane");
    let position = floats(&g.attributes().position);
    assert_eq!(&position[..3], &[-100.0, 0.0, 50.0]);
    let last = 3 * (g.vertex_count() - 1);
    assert_eq!(&position[last..], &[100.0, 0.0, -50.0]);

    g.set_size(&gl, 200.0, 100.0, Orientation::Xy);
    let position = floats(&g.attributes().position);
    assert_eq!(&position[..3], &[-100.0, 50.0, 0.0]);

    g.set_size(&gl, 200.0, 100.0, Orientation::Yz);
    let position = floats(&g.attributes().position);
    assert_eq!(&position[..3], &[0.0, -100.0, 50.0]);
}

#[test]
fn resizing_reuses_buffers() {
    let gl = RecordingGl::new();
    let mut g = PlaneGeometry::new(&gl, 10.0, 10.0, 2, 2, Orientation::Xz).expect("plane");
    assert_eq!(gl.buffers_created(), 4);
    g.set_topology(&gl, 5, 3).expect("topology");
    g.set_size(&gl, 20.0, 10.0, Orientation::Xz);
    g.set_size(&gl, 30.0, 10.0, Orientation::Xz);
    assert_eq!(gl.buffers_created(), 4);
    assert_eq!(g.x_seg_count(), 5);
    assert_eq!(g.width(), 30.0);
}

#[test]
fn set_size_only_uploads_positions() {
    let gl = RecordingGl::new();
    let mut g = PlaneGeometry::new(&gl, 10.0, 10.0, 2, 2, Orientation::Xz).expect("plane");
    gl.clear_calls();
    g.set_size(&gl, 40.0, 10.0, Orientation::Xz);
    let uploads: Vec<GlCall> = gl
        .calls()
        .into_iter()
        .filter(|c| matches!(c, GlCall::BufferData { .. }))
        .collect();
    assert_eq!(
        uploads,
        vec![GlCall::BufferData {
            target: BufferTarget::Array,
            bytes: 3 * 9 * 4
        }]
    );
}

#[test]
fn degenerate_topologies_are_rejected() {
    let gl = RecordingGl::new();
    let mut g = PlaneGeometry::new(&gl, 1.0, 1.0, 1, 1, Orientation::Xz).expect("plane");
    assert!(matches!(
        g.set_topology(&gl, 0, 4),
        Err(GradientError::Geometry(GeometryError::ZeroSegments))
    ));
    assert!(matches!(
        g.set_topology(&gl, 300, 300),
        Err(GradientError::Geometry(GeometryError::TooManyVertices { count: 90601 }))
    ));
    // the previous topology is left intact
    assert_eq!(g.vertex_count(), 4);

    let side = 255;
    assert!((side + 1) * (side + 1) <= MAX_VERTICES);
    assert!(g.set_topology(&gl, side, side).is_ok());
}

#[test]
fn attribute_values_must_fill_whole_components() {
    let gl = RecordingGl::new();
    let mut a = Attribute::new(&gl, BufferTarget::Array, 3, ComponentType::Float).expect("buffer");
    assert!(matches!(
        a.set_values(&gl, AttributeValues::Float(vec![0.0; 4])),
        Err(GlError::AttributeLength { len: 4, size: 3 })
    ));
    assert!(a.set_values(&gl, AttributeValues::Float(vec![0.0; 6])).is_ok());
    assert_eq!(a.values().len(), 6);
    assert_eq!(a.component_type(), ComponentType::Float);
}

#[test]
fn empty_attributes_skip_upload() {
    let gl = RecordingGl::new();
    let a = Attribute::new(&gl, BufferTarget::ElementArray, 3, ComponentType::UnsignedShort)
        .expect("buffer");
    gl.clear_calls();
    a.update(&gl);
    assert!(gl.calls().is_empty());
}
