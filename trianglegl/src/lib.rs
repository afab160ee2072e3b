#![allow(
    clippy::comparison_chain,
    clippy::let_and_return,
    clippy::identity_op,
    clippy::needless_bool,
    clippy::collapsible_if
)]

pub mod device;
pub mod errors;
pub mod index_buffer;
pub mod shader;
pub mod shader_program;
pub mod shader_source;
pub mod vertex_array;
pub mod vertex_buffer;

#[cfg(any(test, feature = "test-device"))]
pub mod test_device;
