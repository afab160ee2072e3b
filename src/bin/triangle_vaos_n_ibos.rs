//! Colored triangle drawn through an index buffer recorded by a vertex array,
//! still with plain device calls.

use std::process::ExitCode;

use sdl2_opengl_trianglegl::{ContextConfig, Sdl2GlContext};
use trianglegl::{
    device::{BufferTarget, GraphicsDevice, PrimitiveMode},
    errors::checked,
};
use triangle_samples::{
    init_logger,
    raw_calls::{create_program_from_file, describe_colored_vertex, upload_buffer},
    render_loop::run_frames,
    resource_path,
    triangle::{COLORED_TRIANGLE_VERTEXES, TRIANGLE_INDICES},
    SampleError, CLEAR_COLOR, DESIRED_FPS,
};

fn run() -> Result<(), SampleError> {
    let mut context = Sdl2GlContext::new(&ContextConfig {
        window_title: "triangle vaos n ibos".to_string(),
        ..Default::default()
    })?;
    let device = context.device();

    let vertex_array_id = device.gen_vertex_array();
    device.bind_vertex_array(Some(vertex_array_id));

    let vertex_buffer_id = upload_buffer(
        &*device,
        BufferTarget::Array,
        bytemuck::cast_slice(&COLORED_TRIANGLE_VERTEXES),
    );
    let index_buffer_id = upload_buffer(
        &*device,
        BufferTarget::ElementArray,
        bytemuck::cast_slice(&TRIANGLE_INDICES),
    );
    describe_colored_vertex(&*device);

    // the vertex array remembers its layout and element buffer on its own
    device.bind_vertex_array(None);
    device.bind_buffer(BufferTarget::Array, None);
    device.bind_buffer(BufferTarget::ElementArray, None);

    let release_buffers = || {
        device.delete_buffer(index_buffer_id);
        device.delete_buffer(vertex_buffer_id);
        device.delete_vertex_array(vertex_array_id);
    };

    let program_id =
        match create_program_from_file(&*device, resource_path("default_vertex_color.glsl")) {
            Ok(program_id) => program_id,
            Err(e) => {
                release_buffers();
                Err(e)?
            }
        };

    let [r, g, b, a] = CLEAR_COLOR;
    device.clear_color(r, g, b, a);

    run_frames(&mut context, DESIRED_FPS, |_| {
        checked(&*device, |device| {
            device.clear_color_buffer();

            device.use_program(Some(program_id));
            device.bind_vertex_array(Some(vertex_array_id));
            device.draw_elements(PrimitiveMode::Triangles, TRIANGLE_INDICES.len());
        });
    });

    device.bind_vertex_array(None);
    device.use_program(None);
    device.delete_program(program_id);
    release_buffers();

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
