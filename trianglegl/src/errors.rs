use std::fmt;

use crate::device::GraphicsDevice;

pub const NO_ERROR: u32 = 0;
pub const INVALID_ENUM: u32 = 0x0500;
pub const INVALID_VALUE: u32 = 0x0501;
pub const INVALID_OPERATION: u32 = 0x0502;
pub const STACK_OVERFLOW: u32 = 0x0503;
pub const STACK_UNDERFLOW: u32 = 0x0504;
pub const OUT_OF_MEMORY: u32 = 0x0505;
pub const INVALID_FRAMEBUFFER_OPERATION: u32 = 0x0506;

// a lost context keeps reporting errors
const MAX_DRAINED_ERRORS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlError {
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    StackOverflow,
    StackUnderflow,
    OutOfMemory,
    InvalidFramebufferOperation,
    Unknown(u32),
}

impl GlError {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            NO_ERROR => None,
            INVALID_ENUM => Some(GlError::InvalidEnum),
            INVALID_VALUE => Some(GlError::InvalidValue),
            INVALID_OPERATION => Some(GlError::InvalidOperation),
            STACK_OVERFLOW => Some(GlError::StackOverflow),
            STACK_UNDERFLOW => Some(GlError::StackUnderflow),
            OUT_OF_MEMORY => Some(GlError::OutOfMemory),
            INVALID_FRAMEBUFFER_OPERATION => Some(GlError::InvalidFramebufferOperation),
            e => Some(GlError::Unknown(e)),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            GlError::InvalidEnum => INVALID_ENUM,
            GlError::InvalidValue => INVALID_VALUE,
            GlError::InvalidOperation => INVALID_OPERATION,
            GlError::StackOverflow => STACK_OVERFLOW,
            GlError::StackUnderflow => STACK_UNDERFLOW,
            GlError::OutOfMemory => OUT_OF_MEMORY,
            GlError::InvalidFramebufferOperation => INVALID_FRAMEBUFFER_OPERATION,
            GlError::Unknown(code) => *code,
        }
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.code())
    }
}

pub fn get_error(device: &dyn GraphicsDevice) -> Result<(), GlError> {
    match GlError::from_code(device.get_error()) {
        None => Ok(()),
        Some(e) => Err(e),
    }
}

/// Drains every pending error flag so a following check only sees fresh ones.
pub fn clear_errors(device: &dyn GraphicsDevice) {
    for _ in 0..MAX_DRAINED_ERRORS {
        if get_error(device).is_ok() {
            break;
        }
    }
}

/// Drains every pending error flag, logging each of them.
pub fn check_errors(device: &dyn GraphicsDevice) -> Vec<GlError> {
    let mut errors = Vec::new();

    for _ in 0..MAX_DRAINED_ERRORS {
        match get_error(device) {
            Ok(()) => break,
            Err(e) => {
                log::error!("OpenGL error: error code {e}");
                errors.push(e);
            }
        }
    }

    errors
}

/// Issues `call` between a [`clear_errors`] and a [`check_errors`].
///
/// The reported errors are advisory: they are logged and dropped, callers
/// only get the call's own result back.
pub fn checked<R>(
    device: &dyn GraphicsDevice,
    call: impl FnOnce(&dyn GraphicsDevice) -> R,
) -> R {
    clear_errors(device);
    let ret = call(device);
    check_errors(device);

    ret
}
