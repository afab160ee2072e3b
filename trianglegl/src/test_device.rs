//! An in-memory [`GraphicsDevice`] that mimics the binding rules of a core
//! profile context and records what it was asked to do.

use std::collections::{BTreeMap, VecDeque};

use parking_lot::Mutex;

use crate::{
    device::{
        BufferId, BufferTarget, BufferUsage, GraphicsDevice, PrimitiveMode, ProgramId, ShaderId,
        ShaderStage, VertexArrayId,
    },
    errors::{INVALID_OPERATION, INVALID_VALUE, NO_ERROR},
    vertex_buffer::AttributeLayout,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedAttribute {
    pub layout: AttributeLayout,
    pub buffer_id: BufferId,
    pub enabled: bool,
}

#[derive(Default)]
struct RecordedVertexArray {
    element_buffer: Option<BufferId>,
    attributes: BTreeMap<u32, RecordedAttribute>,
}

struct RecordedShader {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    info_log: String,
}

#[derive(Default)]
struct RecordedProgram {
    attached_shaders: Vec<ShaderId>,
    linked: bool,
    validated: bool,
    info_log: String,
    uniforms: BTreeMap<String, i32>,
    uniform_values: BTreeMap<i32, [f32; 4]>,
}

#[derive(Default)]
struct DeviceState {
    next_id: u32,

    pending_errors: VecDeque<u32>,
    sticky_error: Option<u32>,
    raised_errors: Vec<u32>,

    buffers: BTreeMap<BufferId, Vec<u8>>,
    buffer_usages: BTreeMap<BufferId, BufferUsage>,
    array_buffer: Option<BufferId>,
    // element bindings made while no vertex array is bound
    default_element_buffer: Option<BufferId>,

    vertex_arrays: BTreeMap<VertexArrayId, RecordedVertexArray>,
    bound_vertex_array: Option<VertexArrayId>,

    shaders: BTreeMap<ShaderId, RecordedShader>,
    last_compiled_sources: BTreeMap<&'static str, String>,
    programs: BTreeMap<ProgramId, RecordedProgram>,
    current_program: Option<ProgramId>,

    link_failure: Option<String>,
    validation_failure: Option<String>,

    uniform_location_queries: usize,
    array_draw_calls: Vec<(PrimitiveMode, usize, usize)>,
    element_draw_calls: Vec<(PrimitiveMode, usize)>,
}

impl DeviceState {
    fn gen_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn raise(&mut self, code: u32) {
        self.raised_errors.push(code);
        self.pending_errors.push_back(code);
    }

    fn element_buffer_slot(&mut self) -> &mut Option<BufferId> {
        match self.bound_vertex_array {
            Some(vertex_array_id) => {
                &mut self
                    .vertex_arrays
                    .entry(vertex_array_id)
                    .or_default()
                    .element_buffer
            }
            None => &mut self.default_element_buffer,
        }
    }

    fn bound_buffer(&self, target: BufferTarget) -> Option<BufferId> {
        match target {
            BufferTarget::Array => self.array_buffer,
            BufferTarget::ElementArray => match self.bound_vertex_array {
                Some(vertex_array_id) => self
                    .vertex_arrays
                    .get(&vertex_array_id)
                    .and_then(|vertex_array| vertex_array.element_buffer),
                None => self.default_element_buffer,
            },
        }
    }
}

#[derive(Default)]
pub struct RecordingDevice {
    state: Mutex<DeviceState>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an error flag as if an earlier call had raised it.
    pub fn push_error(&self, code: u32) {
        self.state.lock().pending_errors.push_back(code);
    }

    /// Makes every error query return `code`, like a lost context does.
    pub fn set_sticky_error(&self, code: u32) {
        self.state.lock().sticky_error = Some(code);
    }

    /// Every error code raised by a device call so far, drained or not.
    pub fn raised_error_codes(&self) -> Vec<u32> {
        self.state.lock().raised_errors.clone()
    }

    pub fn raised_no_errors(&self) -> bool {
        self.state.lock().raised_errors.is_empty()
    }

    pub fn fail_next_link(&self, info_log: &str) {
        self.state.lock().link_failure = Some(info_log.to_string());
    }

    pub fn fail_next_validation(&self, info_log: &str) {
        self.state.lock().validation_failure = Some(info_log.to_string());
    }

    pub fn is_buffer_live(&self, buffer_id: BufferId) -> bool {
        self.state.lock().buffers.contains_key(&buffer_id)
    }

    pub fn live_buffer_count(&self) -> usize {
        self.state.lock().buffers.len()
    }

    pub fn buffer_size(&self, buffer_id: BufferId) -> Option<usize> {
        self.state.lock().buffers.get(&buffer_id).map(Vec::len)
    }

    pub fn buffer_contents(&self, buffer_id: BufferId) -> Option<Vec<u8>> {
        self.state.lock().buffers.get(&buffer_id).cloned()
    }

    pub fn buffer_usage(&self, buffer_id: BufferId) -> Option<BufferUsage> {
        self.state.lock().buffer_usages.get(&buffer_id).copied()
    }

    pub fn bound_buffer(&self, target: BufferTarget) -> Option<BufferId> {
        self.state.lock().bound_buffer(target)
    }

    pub fn is_vertex_array_live(&self, vertex_array_id: VertexArrayId) -> bool {
        self.state.lock().vertex_arrays.contains_key(&vertex_array_id)
    }

    pub fn bound_vertex_array(&self) -> Option<VertexArrayId> {
        self.state.lock().bound_vertex_array
    }

    pub fn element_buffer_of(&self, vertex_array_id: VertexArrayId) -> Option<BufferId> {
        self.state
            .lock()
            .vertex_arrays
            .get(&vertex_array_id)
            .and_then(|vertex_array| vertex_array.element_buffer)
    }

    pub fn attribute(
        &self,
        vertex_array_id: VertexArrayId,
        index: u32,
    ) -> Option<RecordedAttribute> {
        self.state
            .lock()
            .vertex_arrays
            .get(&vertex_array_id)
            .and_then(|vertex_array| vertex_array.attributes.get(&index))
            .cloned()
    }

    pub fn is_shader_live(&self, shader_id: ShaderId) -> bool {
        self.state.lock().shaders.contains_key(&shader_id)
    }

    pub fn live_shader_count(&self) -> usize {
        self.state.lock().shaders.len()
    }

    pub fn last_compiled_source(&self, stage: ShaderStage) -> Option<String> {
        self.state
            .lock()
            .last_compiled_sources
            .get(stage.name())
            .cloned()
    }

    pub fn is_program_live(&self, program_id: ProgramId) -> bool {
        self.state.lock().programs.contains_key(&program_id)
    }

    pub fn live_program_count(&self) -> usize {
        self.state.lock().programs.len()
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.state.lock().current_program
    }

    pub fn uniform_location_queries(&self) -> usize {
        self.state.lock().uniform_location_queries
    }

    pub fn uniform_value(&self, program_id: ProgramId, location: i32) -> Option<[f32; 4]> {
        self.state
            .lock()
            .programs
            .get(&program_id)
            .and_then(|program| program.uniform_values.get(&location))
            .copied()
    }

    pub fn array_draw_calls(&self) -> Vec<(PrimitiveMode, usize, usize)> {
        self.state.lock().array_draw_calls.clone()
    }

    pub fn element_draw_calls(&self) -> Vec<(PrimitiveMode, usize)> {
        self.state.lock().element_draw_calls.clone()
    }
}

fn compile(source: &str) -> Result<(), String> {
    match source
        .lines()
        .enumerate()
        .find(|(_, line)| line.trim_start().starts_with("#error"))
    {
        Some((line_index, line)) => {
            let message = line.trim_start().trim_start_matches("#error").trim();
            Err(format!("0:{}: '#error' : {message}\n", line_index + 1))
        }
        None => Ok(()),
    }
}

fn declared_uniforms(source: &str) -> impl Iterator<Item = String> + '_ {
    source.lines().filter_map(|line| {
        let line = line.trim();
        if !line.starts_with("uniform ") {
            return None;
        }

        line.trim_end_matches(';')
            .split_whitespace()
            .last()
            .map(str::to_string)
    })
}

impl GraphicsDevice for RecordingDevice {
    fn get_error(&self) -> u32 {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if let Some(code) = state.sticky_error {
            return code;
        }

        state.pending_errors.pop_front().unwrap_or(NO_ERROR)
    }

    fn version(&self) -> String {
        "3.3 (recording device)".to_string()
    }

    fn gen_buffer(&self) -> BufferId {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let buffer_id = state.gen_id();
        state.buffers.insert(buffer_id, Vec::new());

        buffer_id
    }

    fn delete_buffer(&self, buffer_id: BufferId) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.buffers.remove(&buffer_id).is_none() {
            return;
        }
        state.buffer_usages.remove(&buffer_id);

        if state.array_buffer == Some(buffer_id) {
            state.array_buffer = None;
        }
        let element_buffer = state.element_buffer_slot();
        if *element_buffer == Some(buffer_id) {
            *element_buffer = None;
        }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer_id: Option<BufferId>) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if let Some(buffer_id) = buffer_id {
            if !state.buffers.contains_key(&buffer_id) {
                state.raise(INVALID_OPERATION);
                return;
            }
        }

        match target {
            BufferTarget::Array => state.array_buffer = buffer_id,
            BufferTarget::ElementArray => *state.element_buffer_slot() = buffer_id,
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        match state.bound_buffer(target) {
            Some(buffer_id) => {
                state.buffers.insert(buffer_id, data.to_vec());
                state.buffer_usages.insert(buffer_id, usage);
            }
            None => state.raise(INVALID_OPERATION),
        }
    }

    fn gen_vertex_array(&self) -> VertexArrayId {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let vertex_array_id = state.gen_id();
        state
            .vertex_arrays
            .insert(vertex_array_id, RecordedVertexArray::default());

        vertex_array_id
    }

    fn delete_vertex_array(&self, vertex_array_id: VertexArrayId) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.vertex_arrays.remove(&vertex_array_id);
        if state.bound_vertex_array == Some(vertex_array_id) {
            state.bound_vertex_array = None;
        }
    }

    fn bind_vertex_array(&self, vertex_array_id: Option<VertexArrayId>) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if let Some(vertex_array_id) = vertex_array_id {
            if !state.vertex_arrays.contains_key(&vertex_array_id) {
                state.raise(INVALID_OPERATION);
                return;
            }
        }

        state.bound_vertex_array = vertex_array_id;
    }

    fn vertex_attrib_pointer(&self, layout: &AttributeLayout) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let (Some(vertex_array_id), Some(buffer_id)) =
            (state.bound_vertex_array, state.array_buffer)
        else {
            state.raise(INVALID_OPERATION);
            return;
        };

        let attributes = &mut state
            .vertex_arrays
            .entry(vertex_array_id)
            .or_default()
            .attributes;
        let enabled = attributes
            .get(&layout.index)
            .map(|attribute| attribute.enabled)
            .unwrap_or(false);
        attributes.insert(
            layout.index,
            RecordedAttribute {
                layout: *layout,
                buffer_id,
                enabled,
            },
        );
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let Some(vertex_array_id) = state.bound_vertex_array else {
            state.raise(INVALID_OPERATION);
            return;
        };

        if let Some(attribute) = state
            .vertex_arrays
            .get_mut(&vertex_array_id)
            .and_then(|vertex_array| vertex_array.attributes.get_mut(&index))
        {
            attribute.enabled = true;
        }
    }

    fn create_shader(&self, stage: ShaderStage) -> ShaderId {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let shader_id = state.gen_id();
        state.shaders.insert(
            shader_id,
            RecordedShader {
                stage,
                source: String::new(),
                compiled: false,
                info_log: String::new(),
            },
        );

        shader_id
    }

    fn shader_source(&self, shader_id: ShaderId, source: &str) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        match state.shaders.get_mut(&shader_id) {
            Some(shader) => shader.source = source.to_string(),
            None => state.raise(INVALID_VALUE),
        }
    }

    fn compile_shader(&self, shader_id: ShaderId) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let Some(shader) = state.shaders.get_mut(&shader_id) else {
            state.raise(INVALID_VALUE);
            return;
        };

        match compile(&shader.source) {
            Ok(()) => {
                shader.compiled = true;
                shader.info_log.clear();
            }
            Err(info_log) => {
                shader.compiled = false;
                shader.info_log = info_log;
            }
        }

        let stage_name = shader.stage.name();
        let source = shader.source.clone();
        state.last_compiled_sources.insert(stage_name, source);
    }

    fn shader_compile_status(&self, shader_id: ShaderId) -> bool {
        self.state
            .lock()
            .shaders
            .get(&shader_id)
            .map(|shader| shader.compiled)
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader_id: ShaderId) -> String {
        self.state
            .lock()
            .shaders
            .get(&shader_id)
            .map(|shader| shader.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader_id: ShaderId) {
        self.state.lock().shaders.remove(&shader_id);
    }

    fn create_program(&self) -> ProgramId {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let program_id = state.gen_id();
        state.programs.insert(program_id, RecordedProgram::default());

        program_id
    }

    fn attach_shader(&self, program_id: ProgramId, shader_id: ShaderId) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if !state.shaders.contains_key(&shader_id) {
            state.raise(INVALID_VALUE);
            return;
        }

        match state.programs.get_mut(&program_id) {
            Some(program) => program.attached_shaders.push(shader_id),
            None => state.raise(INVALID_VALUE),
        }
    }

    fn link_program(&self, program_id: ProgramId) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let link_failure = state.link_failure.take();

        let Some(program) = state.programs.get(&program_id) else {
            state.raise(INVALID_VALUE);
            return;
        };

        let attached = program
            .attached_shaders
            .iter()
            .filter_map(|shader_id| state.shaders.get(shader_id))
            .filter(|shader| shader.compiled)
            .collect::<Vec<_>>();
        let has_stage =
            |stage: ShaderStage| attached.iter().any(|shader| shader.stage == stage);

        let result = match link_failure {
            Some(info_log) => Err(info_log),
            None if !has_stage(ShaderStage::Vertex) || !has_stage(ShaderStage::Fragment) => {
                Err("error: both a vertex and a fragment stage are required\n".to_string())
            }
            None => {
                let mut uniforms = BTreeMap::new();
                for shader in &attached {
                    for name in declared_uniforms(&shader.source) {
                        let next_location = uniforms.len() as i32;
                        uniforms.entry(name).or_insert(next_location);
                    }
                }
                Ok(uniforms)
            }
        };

        let Some(program) = state.programs.get_mut(&program_id) else {
            return;
        };
        match result {
            Ok(uniforms) => {
                program.linked = true;
                program.info_log.clear();
                program.uniforms = uniforms;
            }
            Err(info_log) => {
                program.linked = false;
                program.info_log = info_log;
            }
        }
    }

    fn program_link_status(&self, program_id: ProgramId) -> bool {
        self.state
            .lock()
            .programs
            .get(&program_id)
            .map(|program| program.linked)
            .unwrap_or(false)
    }

    fn validate_program(&self, program_id: ProgramId) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let validation_failure = state.validation_failure.take();

        let Some(program) = state.programs.get_mut(&program_id) else {
            state.raise(INVALID_VALUE);
            return;
        };

        match validation_failure {
            Some(info_log) => {
                program.validated = false;
                program.info_log = info_log;
            }
            None => program.validated = program.linked,
        }
    }

    fn program_validate_status(&self, program_id: ProgramId) -> bool {
        self.state
            .lock()
            .programs
            .get(&program_id)
            .map(|program| program.validated)
            .unwrap_or(false)
    }

    fn program_info_log(&self, program_id: ProgramId) -> String {
        self.state
            .lock()
            .programs
            .get(&program_id)
            .map(|program| program.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program_id: ProgramId) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.programs.remove(&program_id);
        if state.current_program == Some(program_id) {
            state.current_program = None;
        }
    }

    fn use_program(&self, program_id: Option<ProgramId>) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if let Some(program_id) = program_id {
            let linked = state
                .programs
                .get(&program_id)
                .map(|program| program.linked)
                .unwrap_or(false);
            if !linked {
                state.raise(INVALID_OPERATION);
                return;
            }
        }

        state.current_program = program_id;
    }

    fn get_uniform_location(&self, program_id: ProgramId, name: &str) -> i32 {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.uniform_location_queries += 1;

        let location = state
            .programs
            .get(&program_id)
            .filter(|program| program.linked)
            .map(|program| program.uniforms.get(name).copied().unwrap_or(-1));

        match location {
            Some(location) => location,
            None => {
                state.raise(INVALID_OPERATION);
                -1
            }
        }
    }

    fn uniform_4f(&self, location: i32, x: f32, y: f32, z: f32, w: f32) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let Some(program_id) = state.current_program else {
            state.raise(INVALID_OPERATION);
            return;
        };

        if location < 0 {
            return;
        }

        let Some(program) = state.programs.get_mut(&program_id) else {
            return;
        };

        if program.uniforms.values().any(|known| *known == location) {
            program.uniform_values.insert(location, [x, y, z, w]);
        } else {
            state.raise(INVALID_OPERATION);
        }
    }

    fn clear_color(&self, _r: f32, _g: f32, _b: f32, _a: f32) {}

    fn clear_color_buffer(&self) {}

    fn draw_arrays(&self, mode: PrimitiveMode, first: usize, count: usize) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.bound_vertex_array.is_none() {
            state.raise(INVALID_OPERATION);
            return;
        }

        state.array_draw_calls.push((mode, first, count));
    }

    fn draw_elements(&self, mode: PrimitiveMode, count: usize) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        if state.bound_buffer(BufferTarget::ElementArray).is_none() {
            state.raise(INVALID_OPERATION);
            return;
        }

        state.element_draw_calls.push((mode, count));
    }
}
