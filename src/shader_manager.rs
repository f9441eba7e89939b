// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

//! Owns the vertex and fragment units and the program currently on screen.

use std::{
    path::{Path, PathBuf},
    rc::Rc,
};

use crate::{
    renderer::{gl_api::GlApi, program::ShaderProgram, shader::*},
    storage::{self, ShaderStore, StorageError},
};

/// Vertex shader used when neither a saved nor a bundled one can be read.
pub const BUILTIN_VERTEX_SHADER: &str = r#"#version 330 core

layout (location = 0) in vec3 Pos;

uniform vec2 in_resolution;   // Viewport resolution (in pixels)

out vec2 fragCoord;
out vec2 iResolution;

void main()
{
    gl_Position = vec4(Pos, 1.0);

    fragCoord.x = in_resolution.x * (gl_Position.x + 1.0) / 2.0;
    fragCoord.y = in_resolution.y * (gl_Position.y + 1.0) / 2.0;

    iResolution = in_resolution;
}
"#;

/// Fragment shader used when neither a saved nor a bundled one can be read.
pub const BUILTIN_FRAGMENT_SHADER: &str = r#"#version 330 core

in vec2 fragCoord;          // Pixel coordinate, 0 to iResolution
in vec2 iResolution;        // Viewport resolution (in pixels)

uniform float iTime;        // Elapsed time in seconds
uniform float iTimeDelta;   // Frame time in seconds
uniform int iFrame;         // Frame counter
uniform vec4 iMouse;        // Normalized cursor position in xy

out vec4 fragColor;

void mainImage(out vec4 fragColor, in vec2 fragCoord)
{
    vec2 uv = fragCoord.xy / iResolution.xy;

    vec3 col = 0.5 + 0.5 * cos(iTime + uv.xyx + vec3(0, 2, 4));

    fragColor = vec4(col, 1.0);
}

void main()
{
    mainImage(fragColor, fragCoord);
}
"#;

fn builtin_source(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => BUILTIN_VERTEX_SHADER,
        _ => BUILTIN_FRAGMENT_SHADER,
    }
}

/// The vertex/fragment pair being edited and the last program that linked.
///
/// `shader_program` is only ever replaced by a program that linked, so
/// whatever is on screen is the most recent good build.
pub struct ShaderManager {
    // Declared first so it is dropped, and its shaders detached, before
    // the units below delete them.
    shader_program: ShaderProgram,
    vertex_shader: ShaderUnit,
    fragment_shader: ShaderUnit,
    startup_log: Option<String>,
    gl: Rc<dyn GlApi>,
    store: ShaderStore,
}

impl ShaderManager {
    /// Loads both stages, compiles them, and links the first program.
    ///
    /// Each stage is read from the first source that yields text: the
    /// latest saved file, the bundled default, and finally the built-in
    /// text, which is also written to the default path for the next run.
    /// `initial_fragment` then replaces the fragment text if it can be read.
    pub fn new(gl: Rc<dyn GlApi>, store: ShaderStore, initial_fragment: Option<&Path>) -> Self {
        let mut manager = Self {
            shader_program: ShaderProgram::empty(gl.clone()),
            vertex_shader: ShaderUnit::new(gl.clone(), ShaderStage::Vertex),
            fragment_shader: ShaderUnit::new(gl.clone(), ShaderStage::Fragment),
            startup_log: None,
            gl,
            store,
        };

        let vertex_source = load_source(&manager.store, ShaderStage::Vertex);
        manager
            .vertex_shader
            .compile_from_text(&vertex_source, ShaderStage::Vertex);

        manager
            .fragment_shader
            .set_source(&load_source(&manager.store, ShaderStage::Fragment));
        if let Some(path) = initial_fragment {
            if let Err(err) = manager.load_fragment_shader_from_path(path) {
                log::warn!("{err}");
            }
        }
        manager.fragment_shader.compile(ShaderStage::Fragment);

        manager.startup_log = if !manager.fragment_shader.is_good() {
            Some(manager.fragment_shader.compilation_error().to_string())
        } else if !manager.vertex_shader.is_good() {
            Some(manager.vertex_shader.compilation_error().to_string())
        } else {
            manager.relink().err().map(|err| {
                log::warn!("{err}");
                err.to_string()
            })
        };

        match &manager.startup_log {
            None => log::info!("Initial shader program linked"),
            Some(_) => log::warn!(
                "Initial shader program is not usable; edit the fragment shader to recover"
            ),
        }
        manager
    }

    pub fn vertex_shader(&self) -> &ShaderUnit {
        &self.vertex_shader
    }

    pub fn fragment_shader(&self) -> &ShaderUnit {
        &self.fragment_shader
    }

    pub fn fragment_shader_mut(&mut self) -> &mut ShaderUnit {
        &mut self.fragment_shader
    }

    pub fn shader_program(&self) -> &ShaderProgram {
        &self.shader_program
    }

    /// Compile or link log of the initial build, `None` if it linked.
    pub fn startup_log(&self) -> Option<&str> {
        self.startup_log.as_deref()
    }

    pub fn store(&self) -> &ShaderStore {
        &self.store
    }

    /// Links the current units and swaps the result in if it is usable.
    ///
    /// On failure the stored program is left as it was.
    pub fn relink(&mut self) -> Result<(), ShaderError> {
        let program =
            ShaderProgram::try_new(self.gl.clone(), &self.vertex_shader, &self.fragment_shader)?;
        self.shader_program = program;
        Ok(())
    }

    pub fn save_fragment_shader_to_path(&self, path: &Path) -> Result<(), StorageError> {
        storage::write_text_file(path, self.fragment_shader.source())?;
        log::info!("Saved fragment shader to {}", path.display());
        Ok(())
    }

    /// Replaces the fragment text with the contents of `path`.
    ///
    /// Nothing changes if the file cannot be read or holds only whitespace.
    /// The new text is compiled on the next frame like any other edit.
    pub fn load_fragment_shader_from_path(&mut self, path: &Path) -> Result<(), StorageError> {
        let text = storage::read_text_file(path)?;
        if text.trim().is_empty() {
            return Err(StorageError::EmptyText(path.to_path_buf()));
        }
        self.fragment_shader.set_source(&text);
        log::info!("Loaded fragment shader from {}", path.display());
        Ok(())
    }

    /// Writes the fragment and vertex text to the "latest" pair.
    ///
    /// Both files are attempted; the first error is returned.
    pub fn save_latest(&self) -> Result<(), StorageError> {
        let fragment =
            self.save_fragment_shader_to_path(&self.store.latest_path(ShaderStage::Fragment));
        let vertex = storage::write_text_file(
            &self.store.latest_path(ShaderStage::Vertex),
            self.vertex_shader.source(),
        );
        fragment.and(vertex)
    }

    /// Saves the fragment text as `<root>/<name>/<name>_fragment.glsl`.
    pub fn save_as(&self, name: &str) -> Result<PathBuf, StorageError> {
        let path = self.store.save_as_path(name)?;
        self.save_fragment_shader_to_path(&path)?;
        Ok(path)
    }
}

fn load_source(store: &ShaderStore, stage: ShaderStage) -> String {
    for path in [store.latest_path(stage), store.default_path(stage)] {
        match storage::read_text_file(&path) {
            Ok(text) if !text.trim().is_empty() => {
                log::info!("Loaded {} shader from {}", stage.name(), path.display());
                return text;
            }
            Ok(_) => log::warn!("{} shader file {} is empty", stage, path.display()),
            Err(err) => log::debug!("{err}"),
        }
    }

    let text = builtin_source(stage);
    log::warn!("No {} shader found on disk; using the built-in one", stage.name());
    if let Err(err) = storage::write_text_file(&store.default_path(stage), text) {
        log::warn!("Could not persist the built-in {} shader: {err}", stage.name());
    }
    text.to_string()
}
