//! Triangle colored by a uniform that cycles its red channel every frame.

use std::process::ExitCode;

use sdl2_opengl_trianglegl::{ContextConfig, Sdl2GlContext};
use trianglegl::{errors::checked, shader_program::ShaderProgram};
use triangle_samples::{
    init_logger,
    render_loop::run_frames,
    resource_path,
    triangle::{build_position_triangle, draw_indexed},
    SampleError, CLEAR_COLOR, DESIRED_FPS,
};
use vek::Rgba;

const COLOR_UNIFORM: &str = "u_Color";
const RED_CHANGE_PER_SEC: f32 = 3.0;

fn run() -> Result<(), SampleError> {
    let mut context = Sdl2GlContext::new(&ContextConfig {
        window_title: "uniform color".to_string(),
        ..Default::default()
    })?;
    let device = context.device();

    let vertex_array = build_position_triangle(device.clone());
    let mut shader_program =
        ShaderProgram::from_file(device.clone(), resource_path("uniform_color.glsl"))?;

    let [r, g, b, a] = CLEAR_COLOR;
    checked(&*device, |device| device.clear_color(r, g, b, a));

    let mut color = Rgba::new(0.2, 0.3, 0.8, 1.0);
    let mut red_change_per_sec = RED_CHANGE_PER_SEC;

    run_frames(&mut context, DESIRED_FPS, |delta_time_in_secs| {
        checked(&*device, |device| device.clear_color_buffer());

        shader_program.bind();
        shader_program.set_uniform_4f_by_name(COLOR_UNIFORM, color.r, color.g, color.b, color.a);
        draw_indexed(&vertex_array);
        shader_program.unbind();

        color.r += red_change_per_sec * delta_time_in_secs;
        if color.r > 1.0 {
            color.r = 1.0;
            red_change_per_sec = -RED_CHANGE_PER_SEC;
        } else if color.r < 0.0 {
            color.r = 0.0;
            red_change_per_sec = RED_CHANGE_PER_SEC;
        }
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
