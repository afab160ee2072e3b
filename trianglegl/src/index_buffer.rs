use std::sync::Arc;

use crate::{
    device::{BufferId, BufferTarget, BufferUsage, GraphicsDevice, PrimitiveMode},
    errors::checked,
};

pub struct IndexBuffer {
    device: Arc<dyn GraphicsDevice>,
    buffer_id: BufferId,
    count: usize,
}

impl IndexBuffer {
    pub fn new(device: Arc<dyn GraphicsDevice>, indices: &[u32]) -> Self {
        let buffer_id = checked(&*device, |device| device.gen_buffer());
        checked(&*device, |device| {
            device.bind_buffer(BufferTarget::ElementArray, Some(buffer_id))
        });
        checked(&*device, |device| {
            device.buffer_data(
                BufferTarget::ElementArray,
                bytemuck::cast_slice(indices),
                BufferUsage::Static,
            )
        });
        checked(&*device, |device| {
            device.bind_buffer(BufferTarget::ElementArray, None)
        });

        log::trace!(
            "Index buffer created, buffer_id = {buffer_id}, count = {}",
            indices.len()
        );

        Self {
            device,
            buffer_id,
            count: indices.len(),
        }
    }

    pub fn buffer_id(&self) -> BufferId {
        self.buffer_id
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn bind(&self) {
        checked(&*self.device, |device| {
            device.bind_buffer(BufferTarget::ElementArray, Some(self.buffer_id))
        });
    }

    pub fn unbind(&self) {
        checked(&*self.device, |device| {
            device.bind_buffer(BufferTarget::ElementArray, None)
        });
    }

    /// Draws every index of the element buffer recorded by the bound vertex array.
    pub fn draw(&self, primitive_mode: PrimitiveMode) {
        checked(&*self.device, |device| {
            device.draw_elements(primitive_mode, self.count)
        });
    }
}

impl Drop for IndexBuffer {
    fn drop(&mut self) {
        // deleting detaches it from the bound vertex array as well
        checked(&*self.device, |device| device.delete_buffer(self.buffer_id));
    }
}
