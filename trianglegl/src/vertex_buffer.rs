use std::sync::Arc;

use bytemuck::Pod;

use crate::{
    device::{BufferId, BufferTarget, BufferUsage, ComponentType, GraphicsDevice},
    errors::checked,
};

/// How one shader input is packed inside a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeLayout {
    pub index: u32,
    pub component_count: i32,
    pub component_type: ComponentType,
    pub normalized: bool,
    pub stride: usize,
    pub offset: usize,
}

impl AttributeLayout {
    /// Layout of `component_count` floats starting at float number `first_component`
    /// of a vertex made of `components_per_vertex` floats.
    pub fn interleaved_f32(
        index: u32,
        component_count: i32,
        components_per_vertex: usize,
        first_component: usize,
    ) -> Self {
        let component_size = ComponentType::F32.size_in_bytes();

        Self {
            index,
            component_count,
            component_type: ComponentType::F32,
            normalized: false,
            stride: component_size * components_per_vertex,
            offset: component_size * first_component,
        }
    }
}

pub struct VertexBuffer {
    device: Arc<dyn GraphicsDevice>,
    buffer_id: BufferId,
    size_in_bytes: usize,
}

impl VertexBuffer {
    pub fn new<ElementType: Pod>(device: Arc<dyn GraphicsDevice>, data: &[ElementType]) -> Self {
        Self::from_bytes(device, bytemuck::cast_slice(data))
    }

    /// Uploads `data` once into a fresh device buffer, leaving the array slot unbound.
    pub fn from_bytes(device: Arc<dyn GraphicsDevice>, data: &[u8]) -> Self {
        let buffer_id = checked(&*device, |device| device.gen_buffer());
        checked(&*device, |device| {
            device.bind_buffer(BufferTarget::Array, Some(buffer_id))
        });
        checked(&*device, |device| {
            device.buffer_data(BufferTarget::Array, data, BufferUsage::Static)
        });
        checked(&*device, |device| device.bind_buffer(BufferTarget::Array, None));

        log::trace!(
            "Vertex buffer created, buffer_id = {buffer_id}, size = {}",
            data.len()
        );

        Self {
            device,
            buffer_id,
            size_in_bytes: data.len(),
        }
    }

    pub fn buffer_id(&self) -> BufferId {
        self.buffer_id
    }

    pub fn size_in_bytes(&self) -> usize {
        self.size_in_bytes
    }

    pub fn bind(&self) {
        checked(&*self.device, |device| {
            device.bind_buffer(BufferTarget::Array, Some(self.buffer_id))
        });
    }

    pub fn unbind(&self) {
        checked(&*self.device, |device| {
            device.bind_buffer(BufferTarget::Array, None)
        });
    }

    /// Describes one attribute of this buffer and enables it.
    ///
    /// The layout lands in whichever vertex array is bound at the time of the
    /// call, so the array meant to own it has to be bound first.
    pub fn set_attribute_layout(&self, layout: &AttributeLayout) {
        self.bind();

        checked(&*self.device, |device| device.vertex_attrib_pointer(layout));
        checked(&*self.device, |device| {
            device.enable_vertex_attrib_array(layout.index)
        });
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        checked(&*self.device, |device| device.delete_buffer(self.buffer_id));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::test_device::RecordingDevice;

    use super::*;

    #[test]
    fn uploads_exactly_the_given_bytes() {
        let device = Arc::new(RecordingDevice::new());
        let vertexes: [f32; 6] = [-0.5, -0.5, 0.0, 0.5, 0.5, -0.5];

        let vertex_buffer = VertexBuffer::new(device.clone(), &vertexes);

        assert_eq!(24, vertex_buffer.size_in_bytes());
        assert_eq!(Some(24), device.buffer_size(vertex_buffer.buffer_id()));
        assert_eq!(
            Some(BufferUsage::Static),
            device.buffer_usage(vertex_buffer.buffer_id())
        );
        assert_eq!(
            Some(bytemuck::cast_slice::<f32, u8>(&vertexes).to_vec()),
            device.buffer_contents(vertex_buffer.buffer_id())
        );
    }

    #[test]
    fn construction_leaves_the_array_slot_unbound() {
        let device = Arc::new(RecordingDevice::new());

        let _vertex_buffer = VertexBuffer::from_bytes(device.clone(), &[1, 2, 3]);

        assert_eq!(None, device.bound_buffer(BufferTarget::Array));
        assert!(device.raised_no_errors());
    }

    #[test]
    fn dropping_releases_the_device_buffer() {
        let device = Arc::new(RecordingDevice::new());
        let vertex_buffer = VertexBuffer::from_bytes(device.clone(), &[0; 16]);
        let buffer_id = vertex_buffer.buffer_id();

        drop(vertex_buffer);

        assert!(!device.is_buffer_live(buffer_id));
        assert_eq!(0, device.live_buffer_count());
    }

    #[test]
    fn bind_twice_and_unbind_without_bind_are_harmless() {
        let device = Arc::new(RecordingDevice::new());
        let vertex_buffer = VertexBuffer::from_bytes(device.clone(), &[0; 4]);

        vertex_buffer.unbind();
        vertex_buffer.bind();
        vertex_buffer.bind();

        assert_eq!(
            Some(vertex_buffer.buffer_id()),
            device.bound_buffer(BufferTarget::Array)
        );
        assert!(device.raised_no_errors());
    }

    #[test]
    fn attribute_layout_is_recorded_into_the_bound_vertex_array() {
        let device = Arc::new(RecordingDevice::new());
        let vertex_array_id = device.gen_vertex_array();
        device.bind_vertex_array(Some(vertex_array_id));

        let vertex_buffer = VertexBuffer::from_bytes(device.clone(), &[0; 72]);
        let color = AttributeLayout::interleaved_f32(1, 4, 6, 2);
        vertex_buffer.set_attribute_layout(&color);

        let attribute = device.attribute(vertex_array_id, 1).unwrap();
        assert_eq!(color, attribute.layout);
        assert_eq!(vertex_buffer.buffer_id(), attribute.buffer_id);
        assert!(attribute.enabled);
        assert_eq!(24, color.stride);
        assert_eq!(8, color.offset);
    }

    #[test]
    fn attribute_layout_without_a_vertex_array_is_reported() {
        let device = Arc::new(RecordingDevice::new());
        let vertex_buffer = VertexBuffer::from_bytes(device.clone(), &[0; 8]);

        vertex_buffer.set_attribute_layout(&AttributeLayout::interleaved_f32(0, 2, 2, 0));

        assert!(!device.raised_no_errors());
    }
}
