//! Setup steps for the samples that talk to the device directly, without the
//! resource wrappers. Nothing here is released on drop, callers delete the
//! returned handles themselves.

use std::path::Path;

use trianglegl::{
    device::{
        BufferId, BufferTarget, BufferUsage, GraphicsDevice, ProgramId, ShaderId, ShaderStage,
    },
    shader::ShaderCreationError,
    shader_program::ShaderProgramError,
    shader_source::ShaderSources,
    vertex_buffer::AttributeLayout,
};

use crate::triangle::{COLOR_COMPONENTS, POSITION_COMPONENTS};

/// Compiles one stage, deleting the unit again if compilation fails.
pub fn compile_shader(
    device: &dyn GraphicsDevice,
    stage: ShaderStage,
    source: &str,
) -> Result<ShaderId, ShaderCreationError> {
    let shader_id = device.create_shader(stage);
    device.shader_source(shader_id, source);
    device.compile_shader(shader_id);

    if !device.shader_compile_status(shader_id) {
        let error_msg = device.shader_info_log(shader_id);
        log::error!("{} shader compilation: {error_msg}", stage.name());

        device.delete_shader(shader_id);

        Err(ShaderCreationError::CompilationError { stage, error_msg })?
    }

    Ok(shader_id)
}

/// Links a program out of both stages. On any failure every unit and the
/// program created so far are deleted.
pub fn create_program(
    device: &dyn GraphicsDevice,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<ProgramId, ShaderProgramError> {
    let program_id = device.create_program();

    let vertex_shader = match compile_shader(device, ShaderStage::Vertex, vertex_source) {
        Ok(shader_id) => shader_id,
        Err(e) => {
            device.delete_program(program_id);
            Err(e)?
        }
    };
    let fragment_shader = match compile_shader(device, ShaderStage::Fragment, fragment_source) {
        Ok(shader_id) => shader_id,
        Err(e) => {
            device.delete_shader(vertex_shader);
            device.delete_program(program_id);
            Err(e)?
        }
    };

    device.attach_shader(program_id, vertex_shader);
    device.attach_shader(program_id, fragment_shader);
    device.link_program(program_id);

    let link_status = device.program_link_status(program_id);
    if link_status {
        device.validate_program(program_id);
        if !device.program_validate_status(program_id) {
            log::warn!(
                "Shader program validation failed, msg = {}",
                device.program_info_log(program_id)
            );
        }
    }

    device.delete_shader(vertex_shader);
    device.delete_shader(fragment_shader);

    if !link_status {
        let error_msg = device.program_info_log(program_id);
        log::error!("Shader program linking: {error_msg}");

        device.delete_program(program_id);

        Err(ShaderProgramError::LinkError { error_msg })?
    }

    Ok(program_id)
}

/// Like [`create_program`], with both stages read from a dual-section file.
pub fn create_program_from_file(
    device: &dyn GraphicsDevice,
    path: impl AsRef<Path>,
) -> Result<ProgramId, ShaderProgramError> {
    let path = path.as_ref();
    let sources =
        ShaderSources::from_file(path).map_err(|error| ShaderProgramError::SourceReadError {
            path: path.to_path_buf(),
            error,
        })?;

    create_program(device, &sources.vertex, &sources.fragment)
}

/// Generates a buffer, binds it to `target` and uploads `data`. The buffer
/// stays bound.
pub fn upload_buffer(
    device: &dyn GraphicsDevice,
    target: BufferTarget,
    data: &[u8],
) -> BufferId {
    let buffer_id = device.gen_buffer();
    device.bind_buffer(target, Some(buffer_id));
    device.buffer_data(target, data, BufferUsage::Static);

    buffer_id
}

/// Describes interleaved position xy and color rgba for the bound vertex
/// array, sourced from the bound array buffer.
pub fn describe_colored_vertex(device: &dyn GraphicsDevice) {
    let components_per_vertex = POSITION_COMPONENTS + COLOR_COMPONENTS;

    for layout in [
        AttributeLayout::interleaved_f32(0, POSITION_COMPONENTS as i32, components_per_vertex, 0),
        AttributeLayout::interleaved_f32(
            1,
            COLOR_COMPONENTS as i32,
            components_per_vertex,
            POSITION_COMPONENTS,
        ),
    ] {
        device.vertex_attrib_pointer(&layout);
        device.enable_vertex_attrib_array(layout.index);
    }
}
