// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

//! Boundary between the shader pipeline and the OpenGL driver.
//!
//! Everything the live-recompilation core does on the GPU goes through
//! [`GlApi`]. The application uses [`NativeGl`], which forwards to the
//! `gl` crate; tests drive the same code against an in-memory driver.

use gl::types::*;

use super::shader::ShaderStage;

/// Shape of a floating-point uniform upload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UniformShape {
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl UniformShape {
    /// Number of `f32` components a single value of this shape occupies.
    pub fn components(self) -> usize {
        match self {
            UniformShape::Vec2 => 2,
            UniformShape::Vec3 => 3,
            UniformShape::Vec4 | UniformShape::Mat2 => 4,
            UniformShape::Mat3 => 9,
            UniformShape::Mat4 => 16,
        }
    }
}

/// The subset of OpenGL used by shader units, programs and the live loop.
///
/// Handles follow GL conventions: `0` is never a valid object and
/// [`GlApi::uniform_location`] returns `-1` for names the program does
/// not expose.
pub trait GlApi {
    fn create_shader(&self, stage: ShaderStage) -> GLuint;
    fn shader_source(&self, shader: GLuint, source: &str);
    fn compile_shader(&self, shader: GLuint);
    fn shader_compile_status(&self, shader: GLuint) -> bool;
    fn shader_info_log(&self, shader: GLuint) -> String;
    fn delete_shader(&self, shader: GLuint);

    fn create_program(&self) -> GLuint;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn detach_shader(&self, program: GLuint, shader: GLuint);
    fn link_program(&self, program: GLuint);
    fn program_link_status(&self, program: GLuint) -> bool;
    fn program_info_log(&self, program: GLuint) -> String;
    fn delete_program(&self, program: GLuint);
    fn use_program(&self, program: GLuint);

    fn uniform_location(&self, program: GLuint, name: &str) -> GLint;
    fn uniform_1i(&self, location: GLint, value: GLint);
    fn uniform_1f(&self, location: GLint, value: GLfloat);
    /// Uploads one vector or column-major matrix to the program in use.
    fn uniform_fv(&self, location: GLint, shape: UniformShape, data: &[GLfloat]);
    fn get_uniform_iv(&self, program: GLuint, location: GLint, storage: &mut [GLint]);
    fn get_uniform_fv(&self, program: GLuint, location: GLint, storage: &mut [GLfloat]);
}

/// [`GlApi`] backed by the process-wide function pointers of the `gl` crate.
///
/// Function pointers must have been loaded (see `app::load_gl_functions`)
/// and a context must be current whenever a method is called.
#[derive(Debug, Default)]
pub struct NativeGl;

impl NativeGl {
    pub fn new() -> Self {
        Self
    }
}

fn read_info_log(
    object: GLuint,
    get_iv: fn(GLuint, GLenum, *mut GLint),
    get_log: fn(GLuint, GLsizei, *mut GLsizei, *mut GLchar),
) -> String {
    let mut log_len = 0;
    get_iv(object, gl::INFO_LOG_LENGTH, &mut log_len);
    if log_len <= 0 {
        return String::new();
    }

    let mut log = vec![0u8; log_len as usize];
    let mut written = 0;
    get_log(object, log_len, &mut written, log.as_mut_ptr() as *mut GLchar);
    log.truncate(written.max(0) as usize);

    String::from_utf8_lossy(&log).trim_end().to_string()
}

impl GlApi for NativeGl {
    fn create_shader(&self, stage: ShaderStage) -> GLuint {
        unsafe { gl::CreateShader(stage.gl_enum()) }
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        let ptr = source.as_ptr() as *const GLchar;
        let len = source.len() as GLint;
        unsafe { gl::ShaderSource(shader, 1, &ptr, &len) };
    }

    fn compile_shader(&self, shader: GLuint) {
        unsafe { gl::CompileShader(shader) };
    }

    fn shader_compile_status(&self, shader: GLuint) -> bool {
        let mut success = 0;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut success) };
        success != 0
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        read_info_log(
            shader,
            |id, pname, out| unsafe { gl::GetShaderiv(id, pname, out) },
            |id, len, written, buf| unsafe { gl::GetShaderInfoLog(id, len, written, buf) },
        )
    }

    fn delete_shader(&self, shader: GLuint) {
        unsafe { gl::DeleteShader(shader) };
    }

    fn create_program(&self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) };
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::DetachShader(program, shader) };
    }

    fn link_program(&self, program: GLuint) {
        unsafe { gl::LinkProgram(program) };
    }

    fn program_link_status(&self, program: GLuint) -> bool {
        let mut success = 0;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut success) };
        success != 0
    }

    fn program_info_log(&self, program: GLuint) -> String {
        read_info_log(
            program,
            |id, pname, out| unsafe { gl::GetProgramiv(id, pname, out) },
            |id, len, written, buf| unsafe { gl::GetProgramInfoLog(id, len, written, buf) },
        )
    }

    fn delete_program(&self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) };
    }

    fn use_program(&self, program: GLuint) {
        unsafe { gl::UseProgram(program) };
    }

    fn uniform_location(&self, program: GLuint, name: &str) -> GLint {
        match std::ffi::CString::new(name) {
            Ok(name) => unsafe { gl::GetUniformLocation(program, name.as_ptr()) },
            Err(_) => -1,
        }
    }

    fn uniform_1i(&self, location: GLint, value: GLint) {
        unsafe { gl::Uniform1i(location, value) };
    }

    fn uniform_1f(&self, location: GLint, value: GLfloat) {
        unsafe { gl::Uniform1f(location, value) };
    }

    fn uniform_fv(&self, location: GLint, shape: UniformShape, data: &[GLfloat]) {
        debug_assert_eq!(data.len(), shape.components());
        let ptr = data.as_ptr();
        unsafe {
            match shape {
                UniformShape::Vec2 => gl::Uniform2fv(location, 1, ptr),
                UniformShape::Vec3 => gl::Uniform3fv(location, 1, ptr),
                UniformShape::Vec4 => gl::Uniform4fv(location, 1, ptr),
                UniformShape::Mat2 => gl::UniformMatrix2fv(location, 1, gl::FALSE, ptr),
                UniformShape::Mat3 => gl::UniformMatrix3fv(location, 1, gl::FALSE, ptr),
                UniformShape::Mat4 => gl::UniformMatrix4fv(location, 1, gl::FALSE, ptr),
            }
        }
    }

    fn get_uniform_iv(&self, program: GLuint, location: GLint, storage: &mut [GLint]) {
        unsafe { gl::GetUniformiv(program, location, storage.as_mut_ptr()) };
    }

    fn get_uniform_fv(&self, program: GLuint, location: GLint, storage: &mut [GLfloat]) {
        unsafe { gl::GetUniformfv(program, location, storage.as_mut_ptr()) };
    }
}
