use web_sys::{WebGlProgram, WebGlShader};

use crate::{error::Error, gl::GL};

/// A linked vertex+fragment shader program.
#[derive(Debug)]
pub(crate) struct ShaderProgram {
    pub(super) program: WebGlProgram,
}

impl ShaderProgram {
    pub fn create(gl: &GL, vertex_source: &str, fragment_source: &str) -> Result<Self, Error> {
        let vertex_shader = compile_shader(gl, ShaderType::Vertex, vertex_source)?;
        let fragment_shader = compile_shader(gl, ShaderType::Fragment, fragment_source)?;

        let program = gl.create_program().ok_or(Error::shader_program_creation_failed())?;
        gl.attach_shader(&program, &vertex_shader);
        gl.attach_shader(&program, &fragment_shader);
        gl.link_program(&program);

        check_link_status(gl, &program)?;

        // shaders can be detached/deleted once linked into the program
        gl.detach_shader(&program, &vertex_shader);
        gl.detach_shader(&program, &fragment_shader);
        gl.delete_shader(Some(&vertex_shader));
        gl.delete_shader(Some(&fragment_shader));

        Ok(Self { program })
    }

    pub fn use_program(&self, gl: &GL) {
        gl.use_program(Some(&self.program));
    }

    pub fn uniform_location(&self, gl: &GL, name: &str) -> Result<web_sys::WebGlUniformLocation, Error> {
        gl.get_uniform_location(&self.program, name).ok_or(Error::uniform_location_failed(name))
    }
}

#[derive(Debug, Clone, Copy)]
enum ShaderType {
    Vertex,
    Fragment,
}

impl ShaderType {
    fn label(self) -> &'static str {
        match self {
            ShaderType::Vertex => "vertex",
            ShaderType::Fragment => "fragment",
        }
    }
}

impl From<ShaderType> for u32 {
    fn from(value: ShaderType) -> Self {
        match value {
            ShaderType::Vertex => GL::VERTEX_SHADER,
            ShaderType::Fragment => GL::FRAGMENT_SHADER,
        }
    }
}

fn compile_shader(gl: &GL, shader_type: ShaderType, source: &str) -> Result<WebGlShader, Error> {
    let shader = gl
        .create_shader(shader_type.into())
        .ok_or_else(|| Error::shader_creation_failed(shader_type.label()))?;

    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    let compiled = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);

    if !compiled {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        return Err(Error::shader_compile_failed(shader_type.label(), log));
    }

    Ok(shader)
}

fn check_link_status(gl: &GL, program: &WebGlProgram) -> Result<(), Error> {
    let linked = gl
        .get_program_parameter(program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);

    if !linked {
        let log = gl.get_program_info_log(program).unwrap_or_default();
        return Err(Error::shader_link_failed(log));
    }

    Ok(())
}
