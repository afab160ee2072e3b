#![allow(
    clippy::comparison_chain,
    clippy::let_and_return,
    clippy::identity_op,
    clippy::needless_bool,
    clippy::collapsible_if
)]

pub mod gl_device;
pub mod sdl2_gl_context;

pub use gl_device::GlDevice;
pub use sdl2_gl_context::{ContextConfig, ContextCreationError, GlProfile, Sdl2GlContext};
