use std::sync::Arc;

use trianglegl::{
    device::{GraphicsDevice, PrimitiveMode},
    vertex_array::VertexArray,
    vertex_buffer::AttributeLayout,
};

pub const POSITION_COMPONENTS: usize = 2;
pub const COLOR_COMPONENTS: usize = 4;

#[rustfmt::skip]
pub const COLORED_TRIANGLE_VERTEXES: [f32; 18] = [
    // x    y      r     g     b     a
    -0.5, -0.5,   1.0,  0.0,  0.0,  1.0,
     0.0,  0.5,   0.0,  0.0,  1.0,  1.0,
     0.5, -0.5,   0.0,  1.0,  0.0,  1.0,
];

#[rustfmt::skip]
pub const POSITION_TRIANGLE_VERTEXES: [f32; 6] = [
    // x    y
    -0.5, -0.5,
     0.0,  0.5,
     0.5, -0.5,
];

pub const TRIANGLE_INDICES: [u32; 3] = [0, 1, 2];

/// Indexed triangle with an interleaved position (attribute 0) and color
/// (attribute 1) per vertex.
pub fn build_colored_triangle(device: Arc<dyn GraphicsDevice>) -> VertexArray {
    const COMPONENTS_PER_VERTEX: usize = POSITION_COMPONENTS + COLOR_COMPONENTS;

    let mut vertex_array = VertexArray::new(device);

    let vertex_buffer = vertex_array.bind_vertex_buffer(&COLORED_TRIANGLE_VERTEXES);
    vertex_buffer.set_attribute_layout(&AttributeLayout::interleaved_f32(
        0,
        POSITION_COMPONENTS as i32,
        COMPONENTS_PER_VERTEX,
        0,
    ));
    vertex_buffer.set_attribute_layout(&AttributeLayout::interleaved_f32(
        1,
        COLOR_COMPONENTS as i32,
        COMPONENTS_PER_VERTEX,
        POSITION_COMPONENTS,
    ));

    vertex_array.bind_index_buffer(&TRIANGLE_INDICES);

    vertex_array.unbind_all();

    vertex_array
}

/// Indexed triangle with a position (attribute 0) only.
pub fn build_position_triangle(device: Arc<dyn GraphicsDevice>) -> VertexArray {
    let mut vertex_array = VertexArray::new(device);

    let vertex_buffer = vertex_array.bind_vertex_buffer(&POSITION_TRIANGLE_VERTEXES);
    vertex_buffer.set_attribute_layout(&AttributeLayout::interleaved_f32(
        0,
        POSITION_COMPONENTS as i32,
        POSITION_COMPONENTS,
        0,
    ));

    vertex_array.bind_index_buffer(&TRIANGLE_INDICES);

    vertex_array.unbind_all();

    vertex_array
}

pub fn draw_indexed(vertex_array: &VertexArray) {
    vertex_array.use_vertex_array(|vertex_array| {
        if let Some(index_buffer) = vertex_array.index_buffer() {
            index_buffer.draw(PrimitiveMode::Triangles);
        }
    });
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use trianglegl::{
        device::{BufferTarget, PrimitiveMode},
        shader_program::ShaderProgram,
        test_device::RecordingDevice,
    };

    use crate::resource_path;

    use super::*;

    #[test]
    fn colored_triangle_describes_position_and_color() {
        let device = Arc::new(RecordingDevice::new());

        let vertex_array = build_colored_triangle(device.clone());

        let vertex_array_id = vertex_array.vertex_array_id();
        let vertex_buffer_id = vertex_array.vertex_buffers()[0].buffer_id();
        let position = device.attribute(vertex_array_id, 0).unwrap();
        let color = device.attribute(vertex_array_id, 1).unwrap();

        assert_eq!(vertex_buffer_id, position.buffer_id);
        assert_eq!(vertex_buffer_id, color.buffer_id);
        assert_eq!(2, position.layout.component_count);
        assert_eq!((24, 0), (position.layout.stride, position.layout.offset));
        assert_eq!(4, color.layout.component_count);
        assert_eq!((24, 8), (color.layout.stride, color.layout.offset));
        assert!(position.enabled && color.enabled);
        assert_eq!(Some(72), device.buffer_size(vertex_buffer_id));
    }

    #[test]
    fn building_leaves_no_binding_behind() {
        let device = Arc::new(RecordingDevice::new());

        let _vertex_array = build_position_triangle(device.clone());

        assert_eq!(None, device.bound_vertex_array());
        assert_eq!(None, device.bound_buffer(BufferTarget::Array));
        assert_eq!(None, device.bound_buffer(BufferTarget::ElementArray));
        assert!(device.raised_no_errors());
    }

    #[test]
    fn draws_every_index_through_the_recorded_element_buffer() {
        let device = Arc::new(RecordingDevice::new());
        let vertex_array = build_colored_triangle(device.clone());

        draw_indexed(&vertex_array);

        assert_eq!(
            vec![(PrimitiveMode::Triangles, TRIANGLE_INDICES.len())],
            device.element_draw_calls()
        );
        assert!(device.raised_no_errors());
    }

    #[test]
    fn dropping_the_triangle_releases_its_buffers() {
        let device = Arc::new(RecordingDevice::new());

        drop(build_colored_triangle(device.clone()));

        assert_eq!(0, device.live_buffer_count());
    }

    #[test]
    fn shipped_shaders_build() {
        let device = Arc::new(RecordingDevice::new());

        let vertex_color =
            ShaderProgram::from_file(device.clone(), resource_path("default_vertex_color.glsl"));
        let mut uniform_color =
            ShaderProgram::from_file(device.clone(), resource_path("uniform_color.glsl")).unwrap();

        assert!(vertex_color.is_ok());
        assert!(uniform_color.get_uniform_location("u_Color").is_some());
    }
}
