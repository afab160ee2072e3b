use std::sync::Arc;

use crate::{
    device::{GraphicsDevice, ShaderId, ShaderStage},
    errors::checked,
};

#[derive(Debug)]
pub enum ShaderCreationError {
    CompilationError {
        stage: ShaderStage,
        error_msg: String,
    },
}

/// One compiled stage, deleted on drop.
pub struct Shader {
    device: Arc<dyn GraphicsDevice>,
    stage: ShaderStage,
    shader_id: ShaderId,
}

impl Shader {
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        stage: ShaderStage,
        source_code: &str,
    ) -> Result<Self, ShaderCreationError> {
        let shader_id = checked(&*device, |device| device.create_shader(stage));

        // from here on the unit is released by drop on every exit path
        let shader = Self {
            device,
            stage,
            shader_id,
        };

        checked(&*shader.device, |device| {
            device.shader_source(shader_id, source_code)
        });
        checked(&*shader.device, |device| device.compile_shader(shader_id));

        let compile_status = checked(&*shader.device, |device| {
            device.shader_compile_status(shader_id)
        });

        if !compile_status {
            let error_msg = checked(&*shader.device, |device| device.shader_info_log(shader_id));
            log::error!("{} shader compilation: {error_msg}", stage.name());

            Err(ShaderCreationError::CompilationError { stage, error_msg })?
        }

        Ok(shader)
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn shader_id(&self) -> ShaderId {
        self.shader_id
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        checked(&*self.device, |device| device.delete_shader(self.shader_id));
    }
}
