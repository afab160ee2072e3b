//! Colored triangle drawn through the vertex array and shader program wrappers.

use std::process::ExitCode;

use sdl2_opengl_trianglegl::{ContextConfig, Sdl2GlContext};
use trianglegl::{errors::checked, shader_program::ShaderProgram};
use triangle_samples::{
    init_logger,
    render_loop::run_frames,
    resource_path,
    triangle::{build_colored_triangle, draw_indexed},
    SampleError, CLEAR_COLOR, DESIRED_FPS,
};

fn run() -> Result<(), SampleError> {
    let mut context = Sdl2GlContext::new(&ContextConfig {
        window_title: "abstraction sample".to_string(),
        ..Default::default()
    })?;
    let device = context.device();

    let vertex_array = build_colored_triangle(device.clone());
    let shader_program =
        ShaderProgram::from_file(device.clone(), resource_path("default_vertex_color.glsl"))?;

    let [r, g, b, a] = CLEAR_COLOR;
    checked(&*device, |device| device.clear_color(r, g, b, a));

    run_frames(&mut context, DESIRED_FPS, |_| {
        checked(&*device, |device| device.clear_color_buffer());

        shader_program.bind();
        draw_indexed(&vertex_array);
        shader_program.unbind();
    });

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
