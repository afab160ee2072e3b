use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use vek::Rgba;

use crate::{
    device::{GraphicsDevice, ProgramId, ShaderStage},
    errors::checked,
    shader::{Shader, ShaderCreationError},
    shader_source::ShaderSources,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(i32);

impl UniformLocation {
    pub fn location(&self) -> i32 {
        self.0
    }
}

#[derive(Debug)]
pub enum ShaderProgramError {
    SourceReadError {
        path: PathBuf,
        error: std::io::Error,
    },
    ShaderCreationError(ShaderCreationError),
    LinkError {
        error_msg: String,
    },
}

impl From<ShaderCreationError> for ShaderProgramError {
    fn from(e: ShaderCreationError) -> Self {
        ShaderProgramError::ShaderCreationError(e)
    }
}

/// A linked vertex + fragment program.
///
/// A value of this type only exists for a program that compiled and linked,
/// every failure path releases what was created on the device so far.
pub struct ShaderProgram {
    device: Arc<dyn GraphicsDevice>,
    program_id: ProgramId,
    uniform_locations: HashMap<String, Option<UniformLocation>>,
}

impl ShaderProgram {
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, ShaderProgramError> {
        let program_id = checked(&*device, |device| device.create_program());
        let program = Self {
            device: device.clone(),
            program_id,
            uniform_locations: HashMap::new(),
        };

        let vertex_shader = Shader::new(device.clone(), ShaderStage::Vertex, vertex_source)?;
        let fragment_shader = Shader::new(device, ShaderStage::Fragment, fragment_source)?;

        program.attach_shader(&vertex_shader);
        program.attach_shader(&fragment_shader);

        program.link_program()?;
        program.validate_program();

        // the stage units are not needed once the program is linked
        drop(vertex_shader);
        drop(fragment_shader);

        log::debug!("Shader program linked, program_id = {program_id}");

        Ok(program)
    }

    pub fn from_sources(
        device: Arc<dyn GraphicsDevice>,
        sources: &ShaderSources,
    ) -> Result<Self, ShaderProgramError> {
        Self::new(device, &sources.vertex, &sources.fragment)
    }

    pub fn from_file(
        device: Arc<dyn GraphicsDevice>,
        path: impl AsRef<Path>,
    ) -> Result<Self, ShaderProgramError> {
        let path = path.as_ref();
        let sources =
            ShaderSources::from_file(path).map_err(|error| ShaderProgramError::SourceReadError {
                path: path.to_path_buf(),
                error,
            })?;

        log::debug!("Shader sources read, path = {}", path.display());

        Self::from_sources(device, &sources)
    }

    pub fn program_id(&self) -> ProgramId {
        self.program_id
    }

    pub fn bind(&self) {
        checked(&*self.device, |device| device.use_program(Some(self.program_id)));
    }

    pub fn unbind(&self) {
        checked(&*self.device, |device| device.use_program(None));
    }

    fn attach_shader(&self, shader: &Shader) {
        checked(&*self.device, |device| {
            device.attach_shader(self.program_id, shader.shader_id())
        });
    }

    fn link_program(&self) -> Result<(), ShaderProgramError> {
        checked(&*self.device, |device| device.link_program(self.program_id));

        let link_status = checked(&*self.device, |device| {
            device.program_link_status(self.program_id)
        });

        if !link_status {
            let error_msg = checked(&*self.device, |device| {
                device.program_info_log(self.program_id)
            });
            log::error!("Shader program linking: {error_msg}");

            Err(ShaderProgramError::LinkError { error_msg })?
        }

        Ok(())
    }

    fn validate_program(&self) {
        checked(&*self.device, |device| device.validate_program(self.program_id));

        let validate_status = checked(&*self.device, |device| {
            device.program_validate_status(self.program_id)
        });

        if !validate_status {
            let info_log = checked(&*self.device, |device| {
                device.program_info_log(self.program_id)
            });
            log::warn!("Shader program validation failed, msg = {info_log}");
        }
    }

    /// Asks the device every time, `None` if the program has no such active uniform.
    pub fn query_uniform_location(&self, name: &str) -> Option<UniformLocation> {
        let location = checked(&*self.device, |device| {
            device.get_uniform_location(self.program_id, name)
        });

        if location < 0 {
            None
        } else {
            Some(UniformLocation(location))
        }
    }

    /// Like [`Self::query_uniform_location`] but remembered per name for the
    /// lifetime of the program, misses included.
    pub fn get_uniform_location(&mut self, name: &str) -> Option<UniformLocation> {
        if let Some(location) = self.uniform_locations.get(name) {
            return *location;
        }

        let location = self.query_uniform_location(name);
        if location.is_none() {
            log::warn!("Uniform does not exist, name = {name}");
        }

        self.uniform_locations.insert(name.to_string(), location);

        location
    }

    /// Writes to the program in use on the device, bind this one first.
    pub fn set_uniform_4f(&self, location: UniformLocation, x: f32, y: f32, z: f32, w: f32) {
        checked(&*self.device, |device| {
            device.uniform_4f(location.0, x, y, z, w)
        });
    }

    pub fn set_uniform_4f_by_name(&mut self, name: &str, x: f32, y: f32, z: f32, w: f32) {
        if let Some(location) = self.get_uniform_location(name) {
            self.set_uniform_4f(location, x, y, z, w);
        }
    }

    pub fn set_uniform_rgba(&self, location: UniformLocation, color: Rgba<f32>) {
        self.set_uniform_4f(location, color.r, color.g, color.b, color.a);
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        checked(&*self.device, |device| device.delete_program(self.program_id));
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Write, sync::Arc};

    use vek::Rgba;

    use crate::{errors::INVALID_OPERATION, test_device::RecordingDevice};

    use super::*;

    const VERTEX_SOURCE: &str = "#version 330 core
layout(location = 0) in vec4 position;
void main() { gl_Position = position; }
";

    const FRAGMENT_SOURCE: &str = "#version 330 core
layout(location = 0) out vec4 color;
uniform vec4 u_Color;
void main() { color = u_Color; }
";

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn linked_program_keeps_no_stage_units_and_is_not_bound() {
        init_logger();
        let device = Arc::new(RecordingDevice::new());

        let program = ShaderProgram::new(device.clone(), VERTEX_SOURCE, FRAGMENT_SOURCE).unwrap();

        assert!(device.is_program_live(program.program_id()));
        assert_eq!(0, device.live_shader_count());
        assert_eq!(None, device.current_program());
        assert!(device.raised_no_errors());
    }

    #[test]
    fn vertex_compile_failure_releases_everything() {
        init_logger();
        let device = Arc::new(RecordingDevice::new());

        let result = ShaderProgram::new(
            device.clone(),
            "#error syntax error\nvoid main() {",
            FRAGMENT_SOURCE,
        );

        match result {
            Err(ShaderProgramError::ShaderCreationError(
                ShaderCreationError::CompilationError { stage, .. },
            )) => assert_eq!(ShaderStage::Vertex, stage),
            Err(e) => panic!("unexpected error: {e:?}"),
            Ok(_) => panic!("the program should not be valid"),
        }
        assert_eq!(0, device.live_program_count());
        assert_eq!(0, device.live_shader_count());
        assert_eq!(None, device.current_program());
    }

    #[test]
    fn fragment_compile_failure_releases_the_compiled_vertex_stage() {
        init_logger();
        let device = Arc::new(RecordingDevice::new());

        let result = ShaderProgram::new(device.clone(), VERTEX_SOURCE, "#error nope\n");

        assert!(matches!(
            result,
            Err(ShaderProgramError::ShaderCreationError(
                ShaderCreationError::CompilationError {
                    stage: ShaderStage::Fragment,
                    ..
                }
            ))
        ));
        assert_eq!(0, device.live_program_count());
        assert_eq!(0, device.live_shader_count());
    }

    #[test]
    fn link_failure_releases_the_program() {
        init_logger();
        let device = Arc::new(RecordingDevice::new());
        device.fail_next_link("error: varying mismatch");

        let result = ShaderProgram::new(device.clone(), VERTEX_SOURCE, FRAGMENT_SOURCE);

        match result {
            Err(ShaderProgramError::LinkError { error_msg }) => {
                assert_eq!("error: varying mismatch", error_msg)
            }
            Err(e) => panic!("unexpected error: {e:?}"),
            Ok(_) => panic!("linking should have failed"),
        }
        assert_eq!(0, device.live_program_count());
        assert_eq!(0, device.live_shader_count());
    }

    #[test]
    fn failed_validation_still_yields_a_program() {
        init_logger();
        let device = Arc::new(RecordingDevice::new());
        device.fail_next_validation("no vertex array bound");

        let program = ShaderProgram::new(device.clone(), VERTEX_SOURCE, FRAGMENT_SOURCE);

        assert!(program.is_ok());
    }

    #[test]
    fn uniform_location_is_memoized_by_name() {
        let device = Arc::new(RecordingDevice::new());
        let mut program =
            ShaderProgram::new(device.clone(), VERTEX_SOURCE, FRAGMENT_SOURCE).unwrap();

        let first = program.get_uniform_location("u_Color");
        let second = program.get_uniform_location("u_Color");

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(1, device.uniform_location_queries());
    }

    #[test]
    fn uncached_lookup_queries_every_time() {
        let device = Arc::new(RecordingDevice::new());
        let program = ShaderProgram::new(device.clone(), VERTEX_SOURCE, FRAGMENT_SOURCE).unwrap();

        let first = program.query_uniform_location("u_Color");
        let second = program.query_uniform_location("u_Color");

        assert_eq!(first, second);
        assert_eq!(2, device.uniform_location_queries());
    }

    #[test]
    fn missing_uniform_is_remembered_as_missing() {
        init_logger();
        let device = Arc::new(RecordingDevice::new());
        let mut program =
            ShaderProgram::new(device.clone(), VERTEX_SOURCE, FRAGMENT_SOURCE).unwrap();

        assert_eq!(None, program.get_uniform_location("u_Missing"));
        assert_eq!(None, program.get_uniform_location("u_Missing"));
        assert_eq!(1, device.uniform_location_queries());
    }

    #[test]
    fn uniform_is_written_to_the_bound_program() {
        let device = Arc::new(RecordingDevice::new());
        let mut program =
            ShaderProgram::new(device.clone(), VERTEX_SOURCE, FRAGMENT_SOURCE).unwrap();

        program.bind();
        program.set_uniform_4f_by_name("u_Color", 0.2, 0.3, 0.8, 1.0);

        let location = program.get_uniform_location("u_Color").unwrap();
        assert_eq!(
            Some([0.2, 0.3, 0.8, 1.0]),
            device.uniform_value(program.program_id(), location.location())
        );

        program.set_uniform_rgba(location, Rgba::new(1.0, 0.0, 0.0, 1.0));

        assert_eq!(
            Some([1.0, 0.0, 0.0, 1.0]),
            device.uniform_value(program.program_id(), location.location())
        );
        assert!(device.raised_no_errors());
    }

    #[test]
    fn uniform_write_without_a_bound_program_is_reported() {
        let device = Arc::new(RecordingDevice::new());
        let mut program =
            ShaderProgram::new(device.clone(), VERTEX_SOURCE, FRAGMENT_SOURCE).unwrap();
        let location = program.get_uniform_location("u_Color").unwrap();

        program.set_uniform_4f(location, 1.0, 1.0, 1.0, 1.0);

        assert_eq!(vec![INVALID_OPERATION], device.raised_error_codes());
        assert_eq!(
            None,
            device.uniform_value(program.program_id(), location.location())
        );
    }

    #[test]
    fn bind_and_unbind_switch_the_current_program() {
        let device = Arc::new(RecordingDevice::new());
        let program = ShaderProgram::new(device.clone(), VERTEX_SOURCE, FRAGMENT_SOURCE).unwrap();

        program.bind();
        assert_eq!(Some(program.program_id()), device.current_program());

        program.unbind();
        assert_eq!(None, device.current_program());
    }

    #[test]
    fn builds_from_a_dual_section_file() {
        let device = Arc::new(RecordingDevice::new());
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "#shader vertex\n{VERTEX_SOURCE}#shader fragment\n{FRAGMENT_SOURCE}"
        )
        .unwrap();

        let program = ShaderProgram::from_file(device.clone(), file.path()).unwrap();

        assert_eq!(
            Some(VERTEX_SOURCE.to_string()),
            device.last_compiled_source(ShaderStage::Vertex)
        );
        assert_eq!(
            Some(FRAGMENT_SOURCE.to_string()),
            device.last_compiled_source(ShaderStage::Fragment)
        );
        drop(program);
        assert_eq!(0, device.live_program_count());
    }

    #[test]
    fn unreadable_file_is_a_source_read_error() {
        let device = Arc::new(RecordingDevice::new());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.glsl");

        let result = ShaderProgram::from_file(device.clone(), &path);

        match result {
            Err(ShaderProgramError::SourceReadError { path: error_path, .. }) => {
                assert_eq!(path, error_path)
            }
            Err(e) => panic!("unexpected error: {e:?}"),
            Ok(_) => panic!("reading should have failed"),
        }
        assert_eq!(0, device.live_program_count());
    }
}
