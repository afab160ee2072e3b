use std::sync::Arc;

use bytemuck::Pod;

use crate::{
    device::{BufferTarget, GraphicsDevice, VertexArrayId},
    errors::checked,
    index_buffer::IndexBuffer,
    vertex_buffer::VertexBuffer,
};

/// A device vertex array together with every buffer created through it.
///
/// Buffers are kept in creation order and released with the array.
pub struct VertexArray {
    device: Arc<dyn GraphicsDevice>,
    vertex_array_id: VertexArrayId,

    index_buffers: Vec<IndexBuffer>,
    vertex_buffers: Vec<VertexBuffer>,
}

impl VertexArray {
    pub fn new(device: Arc<dyn GraphicsDevice>) -> Self {
        let vertex_array_id = checked(&*device, |device| device.gen_vertex_array());

        Self {
            device,
            vertex_array_id,
            index_buffers: Vec::new(),
            vertex_buffers: Vec::new(),
        }
    }

    pub fn vertex_array_id(&self) -> VertexArrayId {
        self.vertex_array_id
    }

    pub fn bind(&self) {
        checked(&*self.device, |device| {
            device.bind_vertex_array(Some(self.vertex_array_id))
        });
    }

    pub fn unbind(&self) {
        checked(&*self.device, |device| device.bind_vertex_array(None));
    }

    /// Unbinds the vertex array first, so clearing the element slot does not
    /// detach the index buffer recorded by this array.
    pub fn unbind_all(&self) {
        self.unbind();
        checked(&*self.device, |device| {
            device.bind_buffer(BufferTarget::ElementArray, None)
        });
        checked(&*self.device, |device| {
            device.bind_buffer(BufferTarget::Array, None)
        });
    }

    /// Creates a vertex buffer owned by this array and leaves both bound.
    ///
    /// Attribute layouts set on the returned buffer before anything else is
    /// bound are recorded by this array.
    pub fn bind_vertex_buffer<ElementType: Pod>(&mut self, data: &[ElementType]) -> &VertexBuffer {
        self.bind();

        let vertex_buffer = VertexBuffer::new(self.device.clone(), data);
        vertex_buffer.bind();
        self.vertex_buffers.push(vertex_buffer);

        &self.vertex_buffers[self.vertex_buffers.len() - 1]
    }

    /// Creates an index buffer owned by this array and records it as the
    /// array's element buffer.
    pub fn bind_index_buffer(&mut self, indices: &[u32]) -> &IndexBuffer {
        self.bind();

        let index_buffer = IndexBuffer::new(self.device.clone(), indices);
        index_buffer.bind();
        self.index_buffers.push(index_buffer);

        &self.index_buffers[self.index_buffers.len() - 1]
    }

    pub fn vertex_buffers(&self) -> &[VertexBuffer] {
        &self.vertex_buffers
    }

    pub fn index_buffers(&self) -> &[IndexBuffer] {
        &self.index_buffers
    }

    /// The most recently attached index buffer, the one the array draws with.
    pub fn index_buffer(&self) -> Option<&IndexBuffer> {
        self.index_buffers.last()
    }

    pub fn use_vertex_array(&self, use_fn: impl FnOnce(&Self)) {
        self.bind();

        use_fn(self);

        self.unbind();
    }
}

impl Drop for VertexArray {
    fn drop(&mut self) {
        self.index_buffers.clear();
        self.vertex_buffers.clear();

        checked(&*self.device, |device| {
            device.delete_vertex_array(self.vertex_array_id)
        });
    }
}
