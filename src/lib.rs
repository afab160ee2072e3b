#![allow(
    clippy::comparison_chain,
    clippy::let_and_return,
    clippy::identity_op,
    clippy::needless_bool,
    clippy::collapsible_if
)]

pub mod raw_calls;
pub mod render_loop;
pub mod triangle;

use std::path::PathBuf;

use sdl2_opengl_trianglegl::ContextCreationError;
use trianglegl::shader_program::ShaderProgramError;

pub const DESIRED_FPS: f32 = 60.0;
pub const CLEAR_COLOR: [f32; 4] = [0.7, 0.7, 0.7, 1.0];

#[derive(Debug)]
pub enum SampleError {
    ContextCreationError(ContextCreationError),
    ShaderProgramError(ShaderProgramError),
}

impl From<ContextCreationError> for SampleError {
    fn from(e: ContextCreationError) -> Self {
        SampleError::ContextCreationError(e)
    }
}

impl From<ShaderProgramError> for SampleError {
    fn from(e: ShaderProgramError) -> Self {
        SampleError::ShaderProgramError(e)
    }
}

pub fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .parse_default_env()
        .init();
}

/// Path of a file shipped in the `resources` directory of this package.
pub fn resource_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("resources")
        .join(name)
}
