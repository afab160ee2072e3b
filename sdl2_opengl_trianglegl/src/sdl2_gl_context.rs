use std::sync::Arc;

use sdl2::event::{Event, WindowEvent};
use sdl2::keyboard::Keycode;
use sdl2::video::{GLContext, SwapInterval, Window, WindowBuildError};
use sdl2::{video, EventPump, Sdl, VideoSubsystem};

use trianglegl::device::GraphicsDevice;

use crate::gl_device::GlDevice;

#[derive(Debug)]
pub enum ContextCreationError {
    CouldNotCreateSdlContext(String),
    CouldNotCreateVideoSystem(String),
    CouldNotCreateGLContext(String),
    CouldNotCreateEventPump(String),
    CouldNotBuildWindow(WindowBuildError),
    CouldNotCreateContextWithGLVersion {
        gl_profile: GlProfile,
        gl_major_version: u8,
        gl_minor_version: u8,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlProfile {
    Core,
    Compatibility,
    GLES,
}

impl From<GlProfile> for video::GLProfile {
    fn from(gl_profile: GlProfile) -> video::GLProfile {
        match gl_profile {
            GlProfile::Compatibility => video::GLProfile::Compatibility,
            GlProfile::Core => video::GLProfile::Core,
            GlProfile::GLES => video::GLProfile::GLES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContextConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub resizable: bool,
    pub gl_profile: GlProfile,
    pub gl_major_version: u8,
    pub gl_minor_version: u8,
    pub vsync: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            window_title: "trianglegl".to_string(),
            window_width: 640,
            window_height: 480,
            resizable: false,
            gl_profile: GlProfile::Core,
            gl_major_version: 3,
            gl_minor_version: 3,
            vsync: true,
        }
    }
}

/// A window with a current OpenGL context and its event pump.
pub struct Sdl2GlContext {
    _sdl_context: Sdl,
    _sdl_video: VideoSubsystem,
    _gl_context: GLContext,
    sdl_window: Window,
    event_pump: EventPump,
    device: Arc<GlDevice>,
    close_requested: bool,
}

impl Sdl2GlContext {
    pub fn new(config: &ContextConfig) -> Result<Self, ContextCreationError> {
        let sdl2_gl_profile = config.gl_profile.into();
        let sdl_context = sdl2::init().map_err(ContextCreationError::CouldNotCreateSdlContext)?;
        let sdl_video = sdl_context
            .video()
            .map_err(ContextCreationError::CouldNotCreateVideoSystem)?;

        let gl_attr = sdl_video.gl_attr();
        gl_attr.set_context_profile(sdl2_gl_profile);
        gl_attr.set_context_version(config.gl_major_version, config.gl_minor_version);

        let mut window_builder =
            sdl_video.window(&config.window_title, config.window_width, config.window_height);
        window_builder.opengl();
        if config.resizable {
            window_builder.resizable();
        }
        let sdl_window = window_builder
            .build()
            .map_err(ContextCreationError::CouldNotBuildWindow)?;

        let gl_context = sdl_window
            .gl_create_context()
            .map_err(ContextCreationError::CouldNotCreateGLContext)?;
        gl::load_with(|name| sdl_video.gl_get_proc_address(name) as *const _);

        let swap_interval = if config.vsync {
            SwapInterval::VSync
        } else {
            SwapInterval::Immediate
        };
        if let Err(e) = sdl_video.gl_set_swap_interval(swap_interval) {
            log::warn!("Could not set swap interval, msg = {e}");
        }

        if gl_attr.context_profile() != sdl2_gl_profile {
            Err(ContextCreationError::CouldNotCreateContextWithGLVersion {
                gl_profile: config.gl_profile,
                gl_major_version: config.gl_major_version,
                gl_minor_version: config.gl_minor_version,
            })
        } else {
            let event_pump = sdl_context
                .event_pump()
                .map_err(ContextCreationError::CouldNotCreateEventPump)?;

            let device = Arc::new(GlDevice::new());
            log::info!("OpenGL initialized, version = {}", device.version());

            Ok(Self {
                _sdl_context: sdl_context,
                _sdl_video: sdl_video,
                _gl_context: gl_context,
                sdl_window,
                event_pump,
                device,
                close_requested: false,
            })
        }
    }

    /// The device bound to this context, shared by every resource created on it.
    pub fn device(&self) -> Arc<GlDevice> {
        self.device.clone()
    }

    /// Drains the pending events. Once a quit, a window close or Escape was
    /// seen, every further call keeps returning `true`.
    pub fn poll_should_close(&mut self) -> bool {
        while let Some(event) = self.event_pump.poll_event() {
            log::trace!("SDL2_EVENT = {event:?}");

            if is_close_event(&event) {
                self.close_requested = true;
            }
        }

        self.close_requested
    }

    pub fn swap_buffers(&self) {
        self.sdl_window.gl_swap_window()
    }
}

fn is_close_event(event: &Event) -> bool {
    matches!(
        event,
        Event::Quit { .. }
            | Event::Window {
                win_event: WindowEvent::Close,
                ..
            }
            | Event::KeyDown {
                keycode: Some(Keycode::Escape),
                repeat: false,
                ..
            }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_asks_for_a_core_3_3_context() {
        let config = ContextConfig::default();

        assert_eq!(GlProfile::Core, config.gl_profile);
        assert_eq!((3, 3), (config.gl_major_version, config.gl_minor_version));
        assert_eq!((640, 480), (config.window_width, config.window_height));
        assert!(config.vsync);
    }

    #[test]
    fn quit_window_close_and_escape_close_the_window() {
        assert!(is_close_event(&Event::Quit { timestamp: 0 }));
        assert!(is_close_event(&Event::Window {
            timestamp: 0,
            window_id: 1,
            win_event: WindowEvent::Close,
        }));
        assert!(!is_close_event(&Event::Window {
            timestamp: 0,
            window_id: 1,
            win_event: WindowEvent::FocusLost,
        }));
    }

    #[test]
    fn profiles_map_to_sdl2_profiles() {
        assert!(video::GLProfile::from(GlProfile::Core) == video::GLProfile::Core);
        assert!(video::GLProfile::from(GlProfile::GLES) == video::GLProfile::GLES);
    }
}
