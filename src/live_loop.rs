// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-frame recompile, swap and draw.
//!
//! Every frame while the scene plays, the fragment unit is compiled from
//! whatever text the editor currently holds. A successful compile is linked
//! against the vertex unit and swapped in only if the link succeeds too, so
//! a typo never reaches the screen: the last good program keeps drawing and
//! the driver log is kept for the editor to show.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{
    renderer::{
        program::ShaderProgram,
        shader::ShaderStage,
        uniform::{Vec2, Vec4},
    },
    shader_manager::ShaderManager,
};

/// Flags toggled by hotkeys and read by the loop and the editor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub playing: bool,
    pub ui_visible: bool,
    pub save_dialog_open: bool,
}

impl Session {
    pub fn new(playing: bool, ui_visible: bool) -> Self {
        Self {
            playing,
            ui_visible,
            save_dialog_open: false,
        }
    }

    pub fn toggle_playing(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    pub fn toggle_ui(&mut self) -> bool {
        self.ui_visible = !self.ui_visible;
        self.ui_visible
    }

    /// Opening the save bar also shows the UI it lives in.
    pub fn open_save_dialog(&mut self) {
        self.save_dialog_open = true;
        self.ui_visible = true;
    }

    pub fn close_save_dialog(&mut self) {
        self.save_dialog_open = false;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(true, true)
    }
}

/// Drawable area in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn resolution(self) -> Vec2 {
        [self.width as f32, self.height as f32]
    }

    /// Cursor position divided by the viewport size, `0` on an empty axis.
    pub fn normalize(self, cursor: [f32; 2]) -> [f32; 2] {
        let axis = |value: f32, extent: u32| {
            if extent == 0 {
                0.0
            } else {
                value / extent as f32
            }
        };
        [axis(cursor[0], self.width), axis(cursor[1], self.height)]
    }
}

/// What the window system reports for one frame.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub viewport: Viewport,
    /// Cursor in window pixels.
    pub cursor: [f32; 2],
    /// Wall-clock time since the previous frame.
    pub time_delta: Duration,
}

#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecompilePolicy {
    /// Compile the fragment text on every playing frame.
    #[default]
    Always,
    /// Skip compilation while the text hash matches the last attempt.
    OnChange,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Scene paused; nothing was compiled.
    Paused,
    /// Text unchanged since the last attempt; nothing was compiled.
    Unchanged,
    /// A new program was linked and swapped in.
    Recompiled,
    /// The fragment shader did not compile; the stored program was kept.
    CompileFailed,
    /// The fragment shader compiled but did not link; the stored program was kept.
    LinkFailed,
}

/// Values bound to the uniforms every shader may use.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FrameUniforms {
    /// `in_resolution`
    pub resolution: Vec2,
    /// `iTime`: scene time in seconds. It stops while paused and resumes
    /// where it stopped, so it is not wall-clock time.
    pub time: f32,
    /// `iTimeDelta`
    pub time_delta: f32,
    /// `iFrame`
    pub frame: i32,
    /// `iMouse`: normalized cursor in `xy`, `zw` unused.
    pub mouse: Vec4,
}

impl FrameUniforms {
    /// Current values of the frame uniforms in `program`; names the program
    /// does not use stay at their defaults.
    pub fn read_back(program: &ShaderProgram) -> Self {
        let mut uniforms = Self::default();
        program.get_uniform("in_resolution", &mut uniforms.resolution);
        program.get_uniform("iTime", &mut uniforms.time);
        program.get_uniform("iTimeDelta", &mut uniforms.time_delta);
        program.get_uniform("iFrame", &mut uniforms.frame);
        program.get_uniform("iMouse", &mut uniforms.mouse);
        uniforms
    }
}

pub fn bind_uniforms(program: &ShaderProgram, uniforms: &FrameUniforms) {
    program.set_uniform("in_resolution", &uniforms.resolution);
    program.set_uniform("iTime", &uniforms.time);
    program.set_uniform("iTimeDelta", &uniforms.time_delta);
    program.set_uniform("iFrame", &uniforms.frame);
    program.set_uniform("iMouse", &uniforms.mouse);
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub outcome: FrameOutcome,
    pub uniforms: FrameUniforms,
    /// Whether a program was available to draw with.
    pub drawn: bool,
}

#[derive(Debug, Default)]
pub struct LiveLoop {
    policy: RecompilePolicy,
    scene_time: Duration,
    frame: i32,
    started: bool,
    last_attempt_hash: Option<u64>,
    diagnostics: Option<String>,
}

impl LiveLoop {
    pub fn new(policy: RecompilePolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Scene time, which only advances while playing.
    pub fn scene_time(&self) -> Duration {
        self.scene_time
    }

    /// Number of frames played so far.
    pub fn frame(&self) -> i32 {
        self.frame
    }

    /// Latest compile or link log, cleared by the next successful build.
    ///
    /// Before the first recompile this is the log of the initial build.
    pub fn diagnostics(&self) -> Option<&str> {
        self.diagnostics.as_deref()
    }

    /// Runs one frame and calls `draw` with the stored program if it is usable.
    ///
    /// Uniforms are bound before `draw` is called. While paused the scene
    /// clock and frame counter stand still; the values the program was last
    /// given are read back and bound again with the current resolution, so
    /// the image stays put.
    pub fn render_frame<F>(
        &mut self,
        manager: &mut ShaderManager,
        session: &Session,
        input: &FrameInput,
        draw: F,
    ) -> FrameReport
    where
        F: FnOnce(&ShaderProgram),
    {
        if !self.started {
            self.started = true;
            self.diagnostics = manager.startup_log().map(str::to_string);
        }

        let resolution = input.viewport.resolution();

        let (outcome, uniforms) = if session.playing {
            let outcome = self.recompile(manager);
            self.scene_time += input.time_delta;
            let [x, y] = input.viewport.normalize(input.cursor);
            let uniforms = FrameUniforms {
                resolution,
                time: self.scene_time.as_secs_f32(),
                time_delta: input.time_delta.as_secs_f32(),
                frame: self.frame,
                mouse: [x, y, 0.0, 0.0],
            };
            self.frame = self.frame.wrapping_add(1);
            (outcome, uniforms)
        } else {
            let uniforms = FrameUniforms {
                resolution,
                ..FrameUniforms::read_back(manager.shader_program())
            };
            (FrameOutcome::Paused, uniforms)
        };

        let program = manager.shader_program();
        let drawn = program.is_good();
        if drawn {
            bind_uniforms(program, &uniforms);
            draw(program);
        }

        FrameReport {
            outcome,
            uniforms,
            drawn,
        }
    }

    fn recompile(&mut self, manager: &mut ShaderManager) -> FrameOutcome {
        let fragment = manager.fragment_shader_mut();

        if self.policy == RecompilePolicy::OnChange {
            let hash = fragment.source_buffer().content_hash();
            if self.last_attempt_hash == Some(hash) {
                return FrameOutcome::Unchanged;
            }
            self.last_attempt_hash = Some(hash);
        }

        if !fragment.compile(ShaderStage::Fragment) {
            let log = fragment.compilation_error();
            if self.diagnostics.as_deref() != Some(log) {
                self.diagnostics = Some(log.to_string());
            }
            return FrameOutcome::CompileFailed;
        }

        match manager.relink() {
            Ok(()) => {
                self.diagnostics = None;
                FrameOutcome::Recompiled
            }
            Err(err) => {
                let message = err.to_string();
                if self.diagnostics.as_deref() != Some(message.as_str()) {
                    log::warn!("{message}");
                    self.diagnostics = Some(message);
                }
                FrameOutcome::LinkFailed
            }
        }
    }
}
