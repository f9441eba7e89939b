// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

//! Routes `KHR_debug` messages from the driver into the `log` facade.

use gl::types::*;
use owo_colors::OwoColorize;
use std::ffi::{c_void, CStr};

/// Installs the debug callback if the context exposes a debug extension.
///
/// Returns whether the callback was installed.
pub fn enable() -> bool {
    if !has_debug_extension() {
        log::debug!("GL debug output not available");
        return false;
    }
    unsafe {
        gl::Enable(gl::DEBUG_OUTPUT);
        gl::Enable(gl::DEBUG_OUTPUT_SYNCHRONOUS);
        gl::DebugMessageCallback(Some(on_debug_message), std::ptr::null());
        gl::DebugMessageControl(
            gl::DONT_CARE,
            gl::DONT_CARE,
            gl::DONT_CARE,
            0,
            std::ptr::null(),
            gl::TRUE,
        );
    }
    true
}

fn has_debug_extension() -> bool {
    let mut count = 0;
    unsafe { gl::GetIntegerv(gl::NUM_EXTENSIONS, &mut count) };

    (0..count.max(0) as GLuint).any(|index| {
        let name = unsafe { gl::GetStringi(gl::EXTENSIONS, index) };
        !name.is_null() && {
            let name = unsafe { CStr::from_ptr(name as *const _) }.to_bytes();
            name == b"GL_KHR_debug" || name == b"GL_ARB_debug_output"
        }
    })
}

/// Log level for a debug message of the given severity.
pub fn level_for(severity: GLenum) -> log::Level {
    match severity {
        gl::DEBUG_SEVERITY_HIGH => log::Level::Error,
        gl::DEBUG_SEVERITY_MEDIUM => log::Level::Warn,
        gl::DEBUG_SEVERITY_LOW => log::Level::Debug,
        _ => log::Level::Trace,
    }
}

pub fn source_name(source: GLenum) -> &'static str {
    match source {
        gl::DEBUG_SOURCE_API => "api",
        gl::DEBUG_SOURCE_WINDOW_SYSTEM => "window system",
        gl::DEBUG_SOURCE_SHADER_COMPILER => "shader compiler",
        gl::DEBUG_SOURCE_THIRD_PARTY => "third party",
        gl::DEBUG_SOURCE_APPLICATION => "application",
        _ => "other",
    }
}

pub fn kind_name(kind: GLenum) -> &'static str {
    match kind {
        gl::DEBUG_TYPE_ERROR => "error",
        gl::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "deprecated",
        gl::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "undefined behavior",
        gl::DEBUG_TYPE_PORTABILITY => "portability",
        gl::DEBUG_TYPE_PERFORMANCE => "performance",
        gl::DEBUG_TYPE_MARKER => "marker",
        _ => "other",
    }
}

extern "system" fn on_debug_message(
    source: GLenum,
    kind: GLenum,
    id: GLuint,
    severity: GLenum,
    _length: GLsizei,
    message: *const GLchar,
    _user_param: *mut c_void,
) {
    if message.is_null() {
        return;
    }
    let message = unsafe { CStr::from_ptr(message) }.to_string_lossy();
    log::log!(
        level_for(severity),
        "{} [{}/{}] #{id}: {message}",
        "GL".white().bold(),
        source_name(source),
        kind_name(kind)
    );
}
