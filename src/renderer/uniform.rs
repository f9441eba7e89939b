// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

//! Host-side values that can be bound to GLSL uniforms.

use gl::types::*;

use super::gl_api::{GlApi, UniformShape};

pub type Vec2 = [f32; 2];
pub type Vec3 = [f32; 3];
pub type Vec4 = [f32; 4];

/// Column-major 2x2 matrix.
pub type Mat2 = [[f32; 2]; 2];
/// Column-major 3x3 matrix.
pub type Mat3 = [[f32; 3]; 3];
/// Column-major 4x4 matrix.
pub type Mat4 = [[f32; 4]; 4];

/// A value that can be written to, and read back from, a uniform location.
///
/// `upload` targets the program currently in use; `download` reads from
/// the given program.
pub trait Uniform {
    fn upload(&self, gl: &dyn GlApi, location: GLint);
    fn download(&mut self, gl: &dyn GlApi, program: GLuint, location: GLint);
}

impl Uniform for bool {
    fn upload(&self, gl: &dyn GlApi, location: GLint) {
        gl.uniform_1i(location, *self as GLint);
    }

    fn download(&mut self, gl: &dyn GlApi, program: GLuint, location: GLint) {
        let mut value = [0];
        gl.get_uniform_iv(program, location, &mut value);
        *self = value[0] != 0;
    }
}

impl Uniform for i32 {
    fn upload(&self, gl: &dyn GlApi, location: GLint) {
        gl.uniform_1i(location, *self);
    }

    fn download(&mut self, gl: &dyn GlApi, program: GLuint, location: GLint) {
        gl.get_uniform_iv(program, location, std::slice::from_mut(self));
    }
}

impl Uniform for f32 {
    fn upload(&self, gl: &dyn GlApi, location: GLint) {
        gl.uniform_1f(location, *self);
    }

    fn download(&mut self, gl: &dyn GlApi, program: GLuint, location: GLint) {
        gl.get_uniform_fv(program, location, std::slice::from_mut(self));
    }
}

macro_rules! impl_vector_uniform {
    ($ty:ty, $shape:expr) => {
        impl Uniform for $ty {
            fn upload(&self, gl: &dyn GlApi, location: GLint) {
                gl.uniform_fv(location, $shape, self);
            }

            fn download(&mut self, gl: &dyn GlApi, program: GLuint, location: GLint) {
                gl.get_uniform_fv(program, location, self);
            }
        }
    };
}

macro_rules! impl_matrix_uniform {
    ($ty:ty, $shape:expr) => {
        impl Uniform for $ty {
            fn upload(&self, gl: &dyn GlApi, location: GLint) {
                gl.uniform_fv(location, $shape, self.as_flattened());
            }

            fn download(&mut self, gl: &dyn GlApi, program: GLuint, location: GLint) {
                gl.get_uniform_fv(program, location, self.as_flattened_mut());
            }
        }
    };
}

impl_vector_uniform!(Vec2, UniformShape::Vec2);
impl_vector_uniform!(Vec3, UniformShape::Vec3);
impl_vector_uniform!(Vec4, UniformShape::Vec4);

impl_matrix_uniform!(Mat2, UniformShape::Mat2);
impl_matrix_uniform!(Mat3, UniformShape::Mat3);
impl_matrix_uniform!(Mat4, UniformShape::Mat4);
