//! Colored triangle drawn with plain device calls, no resource wrappers.

use std::process::ExitCode;

use sdl2_opengl_trianglegl::{ContextConfig, Sdl2GlContext};
use trianglegl::{
    device::{BufferTarget, GraphicsDevice, PrimitiveMode},
    errors::checked,
};
use triangle_samples::{
    init_logger,
    raw_calls::{create_program, describe_colored_vertex, upload_buffer},
    render_loop::run_frames,
    triangle::COLORED_TRIANGLE_VERTEXES,
    SampleError, CLEAR_COLOR, DESIRED_FPS,
};

const VERTEX_SHADER_SOURCE: &str = r#"#version 330 core

layout(location = 0) in vec4 position;
layout(location = 1) in vec4 color;

out vec4 vertexColor;

void main()
{
    gl_Position = position;
    vertexColor = color;
}
"#;

const FRAGMENT_SHADER_SOURCE: &str = r#"#version 330 core

layout(location = 0) out vec4 color;

in vec4 vertexColor;

void main()
{
    color = vertexColor;
}
"#;

fn run() -> Result<(), SampleError> {
    let mut context = Sdl2GlContext::new(&ContextConfig {
        window_title: "triangle colors".to_string(),
        ..Default::default()
    })?;
    let device = context.device();

    // a core profile context draws nothing without a bound vertex array
    let vertex_array_id = device.gen_vertex_array();
    device.bind_vertex_array(Some(vertex_array_id));

    let buffer_id = upload_buffer(
        &*device,
        BufferTarget::Array,
        bytemuck::cast_slice(&COLORED_TRIANGLE_VERTEXES),
    );
    describe_colored_vertex(&*device);

    let program_id = match create_program(&*device, VERTEX_SHADER_SOURCE, FRAGMENT_SHADER_SOURCE) {
        Ok(program_id) => program_id,
        Err(e) => {
            device.delete_buffer(buffer_id);
            device.delete_vertex_array(vertex_array_id);
            Err(e)?
        }
    };
    device.use_program(Some(program_id));

    let [r, g, b, a] = CLEAR_COLOR;
    device.clear_color(r, g, b, a);

    run_frames(&mut context, DESIRED_FPS, |_| {
        checked(&*device, |device| {
            device.clear_color_buffer();
            device.draw_arrays(PrimitiveMode::Triangles, 0, 3);
        });
    });

    device.use_program(None);
    device.delete_program(program_id);
    device.delete_buffer(buffer_id);
    device.delete_vertex_array(vertex_array_id);

    Ok(())
}

fn main() -> ExitCode {
    init_logger();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Sample failed, error = {e:?}");
            ExitCode::FAILURE
        }
    }
}
