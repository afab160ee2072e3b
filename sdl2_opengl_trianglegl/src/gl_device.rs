use std::{
    ffi::{c_void, CStr, CString},
    marker::PhantomData,
    ptr::null,
};

use gl::types::{GLboolean, GLchar, GLenum, GLint, GLsizei, GLsizeiptr, GLuint};

use trianglegl::{
    device::{
        BufferId, BufferTarget, BufferUsage, ComponentType, GraphicsDevice, PrimitiveMode,
        ProgramId, ShaderId, ShaderStage, VertexArrayId,
    },
    vertex_buffer::AttributeLayout,
};

fn to_gl_buffer_target(target: BufferTarget) -> GLenum {
    match target {
        BufferTarget::Array => gl::ARRAY_BUFFER,
        BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
    }
}

fn to_gl_buffer_usage(usage: BufferUsage) -> GLenum {
    match usage {
        BufferUsage::Static => gl::STATIC_DRAW,
    }
}

fn to_gl_component_type(component_type: ComponentType) -> GLenum {
    match component_type {
        ComponentType::F32 => gl::FLOAT,
        ComponentType::F64 => gl::DOUBLE,

        ComponentType::I16 => gl::SHORT,
        ComponentType::I32 => gl::INT,
        ComponentType::I8 => gl::BYTE,

        ComponentType::U16 => gl::UNSIGNED_SHORT,
        ComponentType::U32 => gl::UNSIGNED_INT,
        ComponentType::U8 => gl::UNSIGNED_BYTE,
    }
}

fn to_gl_shader_type(stage: ShaderStage) -> GLenum {
    match stage {
        ShaderStage::Vertex => gl::VERTEX_SHADER,
        ShaderStage::Fragment => gl::FRAGMENT_SHADER,
    }
}

fn to_gl_primitive_mode(mode: PrimitiveMode) -> GLenum {
    match mode {
        PrimitiveMode::Points => gl::POINTS,
        PrimitiveMode::Lines => gl::LINES,
        PrimitiveMode::LineStrip => gl::LINE_STRIP,
        PrimitiveMode::Triangles => gl::TRIANGLES,
        PrimitiveMode::TriangleStrip => gl::TRIANGLE_STRIP,
        PrimitiveMode::TriangleFan => gl::TRIANGLE_FAN,
    }
}

fn to_gl_boolean(value: bool) -> GLboolean {
    if value {
        gl::TRUE
    } else {
        gl::FALSE
    }
}

unsafe fn read_info_log(
    object_id: GLuint,
    get_iv: unsafe fn(GLuint, GLenum, *mut GLint),
    get_info_log: unsafe fn(GLuint, GLsizei, *mut GLsizei, *mut GLchar),
) -> String {
    let mut info_log_length = 0;
    get_iv(object_id, gl::INFO_LOG_LENGTH, &mut info_log_length);

    if info_log_length <= 0 {
        return String::new();
    }

    let mut actual_info_log_length: GLsizei = 0;
    let mut info_log = vec![0u8; info_log_length as usize + 1];
    get_info_log(
        object_id,
        info_log_length,
        &mut actual_info_log_length,
        info_log.as_mut_ptr() as *mut GLchar,
    );
    info_log.truncate(actual_info_log_length.max(0) as usize);

    String::from_utf8_lossy(&info_log).into_owned()
}

/// [`GraphicsDevice`] on top of the OpenGL functions loaded into the `gl` crate.
///
/// Only usable on the thread that made the GL context current, after
/// `gl::load_with` ran, so it is neither `Send` nor `Sync`.
pub struct GlDevice {
    _not_send_sync: PhantomData<*const ()>,
}

impl GlDevice {
    pub(crate) fn new() -> Self {
        Self {
            _not_send_sync: PhantomData,
        }
    }
}

impl GraphicsDevice for GlDevice {
    fn get_error(&self) -> u32 {
        unsafe { gl::GetError() }
    }

    fn version(&self) -> String {
        unsafe {
            let version = gl::GetString(gl::VERSION);
            if version.is_null() {
                "unknown".to_string()
            } else {
                CStr::from_ptr(version as *const _)
                    .to_string_lossy()
                    .into_owned()
            }
        }
    }

    fn gen_buffer(&self) -> BufferId {
        let mut buffer_id = 0;
        unsafe {
            gl::GenBuffers(1, &mut buffer_id);
        }

        buffer_id
    }

    fn delete_buffer(&self, buffer_id: BufferId) {
        unsafe {
            gl::DeleteBuffers(1, &buffer_id);
        }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer_id: Option<BufferId>) {
        unsafe {
            gl::BindBuffer(to_gl_buffer_target(target), buffer_id.unwrap_or(0));
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe {
            gl::BufferData(
                to_gl_buffer_target(target),
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
                to_gl_buffer_usage(usage),
            );
        }
    }

    fn gen_vertex_array(&self) -> VertexArrayId {
        let mut vertex_array_id = 0;
        unsafe {
            gl::GenVertexArrays(1, &mut vertex_array_id);
        }

        vertex_array_id
    }

    fn delete_vertex_array(&self, vertex_array_id: VertexArrayId) {
        unsafe {
            gl::DeleteVertexArrays(1, &vertex_array_id);
        }
    }

    fn bind_vertex_array(&self, vertex_array_id: Option<VertexArrayId>) {
        unsafe {
            gl::BindVertexArray(vertex_array_id.unwrap_or(0));
        }
    }

    fn vertex_attrib_pointer(&self, layout: &AttributeLayout) {
        unsafe {
            gl::VertexAttribPointer(
                layout.index,
                layout.component_count,
                to_gl_component_type(layout.component_type),
                to_gl_boolean(layout.normalized),
                layout.stride as GLsizei,
                // the offset into the bound array buffer travels as a pointer
                layout.offset as *const c_void,
            );
        }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe {
            gl::EnableVertexAttribArray(index);
        }
    }

    fn create_shader(&self, stage: ShaderStage) -> ShaderId {
        unsafe { gl::CreateShader(to_gl_shader_type(stage)) }
    }

    fn shader_source(&self, shader_id: ShaderId, source: &str) {
        let lengths = [source.len() as GLint];
        unsafe {
            gl::ShaderSource(
                shader_id,
                1,
                &(source.as_ptr() as *const GLchar),
                lengths.as_ptr(),
            );
        }
    }

    fn compile_shader(&self, shader_id: ShaderId) {
        unsafe {
            gl::CompileShader(shader_id);
        }
    }

    fn shader_compile_status(&self, shader_id: ShaderId) -> bool {
        let mut compile_status = 0;
        unsafe {
            gl::GetShaderiv(shader_id, gl::COMPILE_STATUS, &mut compile_status);
        }

        compile_status != 0
    }

    fn shader_info_log(&self, shader_id: ShaderId) -> String {
        unsafe { read_info_log(shader_id, gl::GetShaderiv, gl::GetShaderInfoLog) }
    }

    fn delete_shader(&self, shader_id: ShaderId) {
        unsafe {
            gl::DeleteShader(shader_id);
        }
    }

    fn create_program(&self) -> ProgramId {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program_id: ProgramId, shader_id: ShaderId) {
        unsafe {
            gl::AttachShader(program_id, shader_id);
        }
    }

    fn link_program(&self, program_id: ProgramId) {
        unsafe {
            gl::LinkProgram(program_id);
        }
    }

    fn program_link_status(&self, program_id: ProgramId) -> bool {
        let mut link_status = 0;
        unsafe {
            gl::GetProgramiv(program_id, gl::LINK_STATUS, &mut link_status);
        }

        link_status != 0
    }

    fn validate_program(&self, program_id: ProgramId) {
        unsafe {
            gl::ValidateProgram(program_id);
        }
    }

    fn program_validate_status(&self, program_id: ProgramId) -> bool {
        let mut validate_status = 0;
        unsafe {
            gl::GetProgramiv(program_id, gl::VALIDATE_STATUS, &mut validate_status);
        }

        validate_status != 0
    }

    fn program_info_log(&self, program_id: ProgramId) -> String {
        unsafe { read_info_log(program_id, gl::GetProgramiv, gl::GetProgramInfoLog) }
    }

    fn delete_program(&self, program_id: ProgramId) {
        unsafe {
            gl::DeleteProgram(program_id);
        }
    }

    fn use_program(&self, program_id: Option<ProgramId>) {
        unsafe {
            gl::UseProgram(program_id.unwrap_or(0));
        }
    }

    fn get_uniform_location(&self, program_id: ProgramId, name: &str) -> i32 {
        let Ok(c_name) = CString::new(name) else {
            log::error!("Uniform name contains a nul byte, name = {name:?}");
            return -1;
        };

        unsafe { gl::GetUniformLocation(program_id, c_name.as_ptr()) }
    }

    fn uniform_4f(&self, location: i32, x: f32, y: f32, z: f32, w: f32) {
        unsafe {
            gl::Uniform4f(location, x, y, z, w);
        }
    }

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe {
            gl::ClearColor(r, g, b, a);
        }
    }

    fn clear_color_buffer(&self) {
        unsafe {
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
    }

    fn draw_arrays(&self, mode: PrimitiveMode, first: usize, count: usize) {
        unsafe {
            gl::DrawArrays(
                to_gl_primitive_mode(mode),
                first as GLint,
                count as GLsizei,
            );
        }
    }

    fn draw_elements(&self, mode: PrimitiveMode, count: usize) {
        unsafe {
            gl::DrawElements(
                to_gl_primitive_mode(mode),
                count as GLsizei,
                gl::UNSIGNED_INT,
                null::<c_void>(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_types_map_to_gl_enums() {
        assert_eq!(gl::FLOAT, to_gl_component_type(ComponentType::F32));
        assert_eq!(gl::UNSIGNED_INT, to_gl_component_type(ComponentType::U32));
        assert_eq!(gl::BYTE, to_gl_component_type(ComponentType::I8));
    }

    #[test]
    fn buffer_targets_map_to_gl_enums() {
        assert_eq!(gl::ARRAY_BUFFER, to_gl_buffer_target(BufferTarget::Array));
        assert_eq!(
            gl::ELEMENT_ARRAY_BUFFER,
            to_gl_buffer_target(BufferTarget::ElementArray)
        );
        assert_eq!(gl::STATIC_DRAW, to_gl_buffer_usage(BufferUsage::Static));
    }

    #[test]
    fn stages_and_modes_map_to_gl_enums() {
        assert_eq!(gl::VERTEX_SHADER, to_gl_shader_type(ShaderStage::Vertex));
        assert_eq!(gl::FRAGMENT_SHADER, to_gl_shader_type(ShaderStage::Fragment));
        assert_eq!(gl::TRIANGLES, to_gl_primitive_mode(PrimitiveMode::Triangles));
        assert_eq!(gl::FALSE, to_gl_boolean(false));
    }

    // Resolves only while exactly one impl applies, i.e. when `T` is not `Send`.
    trait AmbiguousIfSend<A> {
        fn is_not_send() -> bool {
            true
        }
    }
    impl<T: ?Sized> AmbiguousIfSend<()> for T {}
    impl<T: ?Sized + Send> AmbiguousIfSend<u8> for T {}

    trait AmbiguousIfSync<A> {
        fn is_not_sync() -> bool {
            true
        }
    }
    impl<T: ?Sized> AmbiguousIfSync<()> for T {}
    impl<T: ?Sized + Sync> AmbiguousIfSync<u8> for T {}

    #[test]
    fn device_stays_on_the_context_thread() {
        assert!(<GlDevice as AmbiguousIfSend<_>>::is_not_send());
        assert!(<GlDevice as AmbiguousIfSync<_>>::is_not_sync());
    }

    #[test]
    fn error_codes_agree_with_gl() {
        use trianglegl::errors;

        assert_eq!(gl::NO_ERROR, errors::NO_ERROR);
        assert_eq!(gl::INVALID_ENUM, errors::INVALID_ENUM);
        assert_eq!(gl::INVALID_OPERATION, errors::INVALID_OPERATION);
        assert_eq!(gl::OUT_OF_MEMORY, errors::OUT_OF_MEMORY);
        assert_eq!(
            gl::INVALID_FRAMEBUFFER_OPERATION,
            errors::INVALID_FRAMEBUFFER_OPERATION
        );
    }
}
