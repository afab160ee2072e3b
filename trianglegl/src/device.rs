use crate::vertex_buffer::AttributeLayout;

pub type BufferId = u32;
pub type VertexArrayId = u32;
pub type ShaderId = u32;
pub type ProgramId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BufferTarget {
    /// Generic vertex data binding slot.
    Array,
    /// Element index binding slot, recorded by the bound vertex array.
    ElementArray,
}

/// Buffers are written once at creation and only read afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    F32,
    F64,

    U8,
    U16,
    U32,

    I8,
    I16,
    I32,
}

impl ComponentType {
    pub fn size_in_bytes(&self) -> usize {
        match self {
            ComponentType::F32 => 4,
            ComponentType::F64 => 8,
            ComponentType::U8 | ComponentType::I8 => 1,
            ComponentType::U16 | ComponentType::I16 => 2,
            ComponentType::U32 | ComponentType::I32 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn name(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

/// The immediate-mode graphics device every wrapper talks to.
///
/// All binding state (current buffers, current vertex array, current program)
/// lives behind this trait, not in the wrappers. `None` stands for "no object"
/// wherever the underlying API would take handle 0.
pub trait GraphicsDevice {
    /// Returns the oldest pending error code and clears it, 0 if none is pending.
    fn get_error(&self) -> u32;
    fn version(&self) -> String;

    fn gen_buffer(&self) -> BufferId;
    fn delete_buffer(&self, buffer_id: BufferId);
    fn bind_buffer(&self, target: BufferTarget, buffer_id: Option<BufferId>);
    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage);

    fn gen_vertex_array(&self) -> VertexArrayId;
    fn delete_vertex_array(&self, vertex_array_id: VertexArrayId);
    fn bind_vertex_array(&self, vertex_array_id: Option<VertexArrayId>);

    /// Records `layout` for the bound vertex array, sourcing from the buffer
    /// bound to [`BufferTarget::Array`].
    fn vertex_attrib_pointer(&self, layout: &AttributeLayout);
    fn enable_vertex_attrib_array(&self, index: u32);

    fn create_shader(&self, stage: ShaderStage) -> ShaderId;
    fn shader_source(&self, shader_id: ShaderId, source: &str);
    fn compile_shader(&self, shader_id: ShaderId);
    fn shader_compile_status(&self, shader_id: ShaderId) -> bool;
    fn shader_info_log(&self, shader_id: ShaderId) -> String;
    fn delete_shader(&self, shader_id: ShaderId);

    fn create_program(&self) -> ProgramId;
    fn attach_shader(&self, program_id: ProgramId, shader_id: ShaderId);
    fn link_program(&self, program_id: ProgramId);
    fn program_link_status(&self, program_id: ProgramId) -> bool;
    fn validate_program(&self, program_id: ProgramId);
    fn program_validate_status(&self, program_id: ProgramId) -> bool;
    fn program_info_log(&self, program_id: ProgramId) -> String;
    fn delete_program(&self, program_id: ProgramId);
    fn use_program(&self, program_id: Option<ProgramId>);

    /// Returns -1 if the linked program has no active uniform called `name`.
    fn get_uniform_location(&self, program_id: ProgramId, name: &str) -> i32;
    /// Writes to the program currently in use, not to a chosen one.
    fn uniform_4f(&self, location: i32, x: f32, y: f32, z: f32, w: f32);

    fn clear_color(&self, r: f32, g: f32, b: f32, a: f32);
    fn clear_color_buffer(&self);
    fn draw_arrays(&self, mode: PrimitiveMode, first: usize, count: usize);
    /// Draws `count` `u32` indices from the element buffer of the bound vertex array.
    fn draw_elements(&self, mode: PrimitiveMode, count: usize);
}
