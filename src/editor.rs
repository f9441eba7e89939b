// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

//! Editor overlay drawn on top of the GL area.
//!
//! A tabbed panel with the vertex shader (read-only), the fragment shader
//! (editable) and the compiler output, plus a save-as bar. The overlay
//! does not own shader state: edits are forwarded through the callback
//! given to [`Editor::connect_fragment_changed`], and the app pushes
//! diagnostics back once per frame.

use gtk::{gdk, prelude::*};
use std::{path::PathBuf, rc::Rc};

use crate::{diagnostics, settings::Settings, shader_manager::ShaderManager, *};

const CSS_CLASS: &str = "glsl-live-editor";
const MARGIN: i32 = 16;
const FRAGMENT_PAGE: u32 = 1;

/// State of the save-as bar that outlives a single attempt.
///
/// A failed attempt leaves its message in place until a save succeeds.
#[derive(Debug, Default)]
pub struct SaveAsForm {
    error: Option<String>,
}

impl SaveAsForm {
    /// Saves the fragment shader under `name`, returning the written path.
    pub fn submit(&mut self, name: &str, manager: &ShaderManager) -> Option<PathBuf> {
        let result = if name.trim().is_empty() {
            Err("Please enter a name".to_string())
        } else {
            manager.save_as(name).map_err(|err| err.to_string())
        };

        match result {
            Ok(path) => {
                self.error = None;
                Some(path)
            }
            Err(message) => {
                log::warn!("Save as '{name}' failed: {message}");
                self.error = Some(message);
                None
            }
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Text shown in the output tab.
pub fn output_text(log: Option<&str>) -> String {
    let Some(log) = log else {
        return "Compiled successfully.".to_string();
    };
    let lines: Vec<String> = diagnostics::parse(log)
        .iter()
        .map(ToString::to_string)
        .collect();
    if lines.is_empty() {
        log.to_string()
    } else {
        lines.join("\n")
    }
}

pub struct Editor {
    root: gtk::Box,
    vertex_buffer: gtk::TextBuffer,
    fragment_buffer: gtk::TextBuffer,
    output_buffer: gtk::TextBuffer,
    error_tag: gtk::TextTag,
    save_bar: gtk::Box,
    save_entry: gtk::Entry,
    save_button: gtk::Button,
    save_error: gtk::Label,
    shown_log: Option<Option<String>>,
}

impl Editor {
    pub fn new(settings: &Settings) -> Self {
        install_css(settings);

        let root = gtk::Box::new(gtk::Orientation::Vertical, 6);
        root.add_css_class(CSS_CLASS);
        root.set_margin_top(MARGIN);
        root.set_margin_bottom(MARGIN);
        root.set_margin_start(MARGIN);
        root.set_margin_end(MARGIN);
        root.set_halign(gtk::Align::Fill);
        root.set_valign(gtk::Align::Fill);

        let notebook = gtk::Notebook::new();
        notebook.set_vexpand(true);

        let (vertex_view, vertex_buffer) = code_view(false);
        let (fragment_view, fragment_buffer) = code_view(true);
        let (output_view, output_buffer) = code_view(false);
        output_view.set_wrap_mode(gtk::WrapMode::WordChar);

        let error_tag = gtk::TextTag::builder()
            .name("compile-error")
            .background("rgba(200, 40, 40, 0.45)")
            .build();
        fragment_buffer.tag_table().add(&error_tag);

        for (view, title) in [
            (&vertex_view, "Vertex Shader"),
            (&fragment_view, "Fragment Shader"),
            (&output_view, "Output"),
        ] {
            let scrolled = gtk::ScrolledWindow::builder()
                .child(view)
                .hexpand(true)
                .vexpand(true)
                .build();
            notebook.append_page(&scrolled, Some(&gtk::Label::new(Some(title))));
        }
        notebook.set_current_page(Some(FRAGMENT_PAGE));
        root.append(&notebook);

        let save_bar = gtk::Box::new(gtk::Orientation::Horizontal, 6);
        let save_entry = gtk::Entry::builder()
            .placeholder_text("Shader name")
            .hexpand(true)
            .build();
        let save_button = gtk::Button::with_label("Save");
        let save_error = gtk::Label::new(None);
        save_error.add_css_class("error");
        save_error.set_visible(false);
        save_bar.append(&save_entry);
        save_bar.append(&save_button);
        save_bar.append(&save_error);
        save_bar.set_visible(false);
        root.append(&save_bar);

        Self {
            root,
            vertex_buffer,
            fragment_buffer,
            output_buffer,
            error_tag,
            save_bar,
            save_entry,
            save_button,
            save_error,
            shown_log: None,
        }
    }

    pub fn widget(&self) -> &gtk::Widget {
        self.root.upcast_ref()
    }

    pub fn set_sources(&self, vertex: &str, fragment: &str) {
        self.vertex_buffer.set_text(vertex);
        self.fragment_buffer.set_text(fragment);
    }

    /// Calls `f` with the full fragment text after every edit.
    pub fn connect_fragment_changed<F: Fn(&str) + 'static>(&self, f: F) {
        self.fragment_buffer.connect_changed(move |buffer| {
            let (start, end) = buffer.bounds();
            f(buffer.text(&start, &end, false).as_str());
        });
    }

    /// Calls `f` with the entered name when the save bar is submitted.
    pub fn connect_save<F: Fn(&str) + 'static>(&self, f: F) {
        let f = Rc::new(f);
        let on_activate = f.clone();
        self.save_entry
            .connect_activate(move |entry| on_activate(entry.text().as_str()));
        let entry = self.save_entry.clone();
        self.save_button
            .connect_clicked(move |_| f(entry.text().as_str()));
    }

    pub fn set_visible(&self, visible: bool) {
        if self.root.is_visible() != visible {
            self.root.set_visible(visible);
        }
    }

    pub fn set_save_bar_visible(&self, visible: bool) {
        if self.save_bar.is_visible() == visible {
            return;
        }
        self.save_bar.set_visible(visible);
        if visible {
            self.save_entry.grab_focus();
        }
    }

    /// Shows or clears the save-as error message.
    pub fn set_save_error(&self, message: Option<&str>) {
        self.save_error.set_text(message.unwrap_or_default());
        self.save_error.set_visible(message.is_some());
    }

    /// Updates the output tab and error highlights if `log` changed.
    pub fn show_diagnostics(&mut self, log: Option<&str>) {
        if self.shown_log.as_ref().map(Option::as_deref) == Some(log) {
            return;
        }
        self.shown_log = Some(log.map(str::to_string));

        self.output_buffer.set_text(&output_text(log));

        let buffer = &self.fragment_buffer;
        let (start, end) = buffer.bounds();
        buffer.remove_tag(&self.error_tag, &start, &end);

        let parsed = log.map(diagnostics::parse).unwrap_or_default();
        for line in diagnostics::error_lines(&parsed) {
            let Some(mut start) = line
                .checked_sub(1)
                .and_then(|index| buffer.iter_at_line(index as i32))
            else {
                continue;
            };
            start.set_line_offset(0);
            let mut end = start.clone();
            end.forward_to_line_end();
            buffer.apply_tag(&self.error_tag, &start, &end);
        }
    }
}

fn code_view(editable: bool) -> (gtk::TextView, gtk::TextBuffer) {
    let buffer = gtk::TextBuffer::new(None);
    let view = gtk::TextView::builder()
        .buffer(&buffer)
        .editable(editable)
        .cursor_visible(editable)
        .accepts_tab(true)
        .monospace(true)
        .left_margin(8)
        .top_margin(8)
        .build();
    (view, buffer)
}

fn install_css(settings: &Settings) {
    let css = format!(
        ".{CSS_CLASS} {{ background-color: rgba(24, 24, 28, {opacity}); border-radius: 6px; }}\n\
         .{CSS_CLASS} textview, .{CSS_CLASS} textview text {{ \
             background-color: transparent; font-size: {size}pt; }}\n\
         .{CSS_CLASS} notebook, .{CSS_CLASS} notebook > stack {{ background: transparent; }}",
        opacity = settings.editor_opacity,
        size = settings.editor_font_size,
    );

    let provider = gtk::CssProvider::new();
    provider.load_from_string(&css);
    if let Some(display) = gdk::Display::default() {
        gtk::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    } else {
        log::warn!("No display available for {APP_NAME} editor styles");
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("visible", &self.root.is_visible())
            .field("save_bar", &self.save_bar.is_visible())
            .finish()
    }
}
