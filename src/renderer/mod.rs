// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

//! GPU side of the playground.
//!
//! Shader units and programs talk to the driver through [`gl_api::GlApi`]
//! so the compile/link pipeline can run against an in-memory driver in
//! tests. The full-screen quad is plain `gl` calls: it is created once and
//! only drawn afterwards.

pub mod gl_api;
pub mod program;
pub mod shader;
pub mod uniform;

mod buffer;
mod debug_output;
mod vertex_array;

#[cfg(test)]
pub mod headless;


use {buffer::*, program::ShaderProgram, vertex_array::*};

use crate::live_loop::Viewport;

#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Failed to create {0}")]
    ObjectCreation(&'static str),
}

type Position = [f32; 3];

#[repr(C)]
struct Vertex(Position);

// 3----0
// |  / |
// | /  |
// 2----1
#[rustfmt::skip]
const QUAD_VERTICES: [Vertex; 4] = [
    Vertex([ 1.0,  1.0, 0.0]), // 0
    Vertex([ 1.0, -1.0, 0.0]), // 1
    Vertex([-1.0, -1.0, 0.0]), // 2
    Vertex([-1.0,  1.0, 0.0]), // 3
];

const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// Attribute location of the quad position (`Pos` in the vertex shader).
pub const POSITION_LOCATION: u32 = 0;

/// Owns the full-screen quad every fragment shader is drawn onto.
pub struct Renderer {
    vao: VertexArray,
    _vbo: Buffer,
    _ebo: Buffer,
}

impl Renderer {
    /// Builds the quad. Requires a current GL context with loaded functions.
    pub fn new() -> Result<Self, RendererError> {
        if cfg!(debug_assertions) {
            debug_output::enable();
        }

        let vao = VertexArray::new().ok_or(RendererError::ObjectCreation("vertex array"))?;
        vao.bind();

        let vbo =
            Buffer::new(BufferKind::Vertex).ok_or(RendererError::ObjectCreation("vertex buffer"))?;
        vbo.upload(&QUAD_VERTICES);

        // The element binding is captured by the bound VAO.
        let ebo = Buffer::new(BufferKind::Element)
            .ok_or(RendererError::ObjectCreation("element buffer"))?;
        ebo.upload(&QUAD_INDICES);

        vao.float_attribute(
            POSITION_LOCATION,
            (std::mem::size_of::<Position>() / std::mem::size_of::<f32>()) as i32,
            std::mem::size_of::<Vertex>(),
            0,
        );
        VertexArray::unbind();

        log::debug!("Full-screen quad ready");

        Ok(Self {
            vao,
            _vbo: vbo,
            _ebo: ebo,
        })
    }

    /// Sets the viewport and clears to opaque black.
    pub fn begin_frame(&self, viewport: Viewport) {
        unsafe {
            gl::Viewport(0, 0, viewport.width as i32, viewport.height as i32);
            gl::ClearColor(0.0, 0.0, 0.0, 1.0);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
    }

    /// Draws the quad with `program`, which must be good.
    pub fn draw(&self, program: &ShaderProgram) {
        program.use_program();
        self.vao.bind();
        unsafe {
            gl::DrawElements(
                gl::TRIANGLES,
                QUAD_INDICES.len() as i32,
                gl::UNSIGNED_INT,
                std::ptr::null(),
            );
        }
        VertexArray::unbind();
    }
}
