// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

//! Hotkeys.
//!
//! GTK key events only update which keys are held. Once per frame the
//! render callback polls [`HotkeyTracker`] with that state, so actions run
//! on the render thread between frames. Toggles fire once per press and
//! stay latched until their combination is released; Ctrl+Q fires for as
//! long as it is held.

use gtk::{gdk, glib, prelude::*};
use owo_colors::OwoColorize;

use crate::{app::*, *};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HotkeyAction {
    /// Ctrl+Q
    SaveAndQuit,
    /// Ctrl+Space
    TogglePlaying,
    /// Ctrl+H
    ToggleUi,
    /// Ctrl+S
    ShowSaveDialog,
}

/// Keys relevant to hotkeys that are currently held.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    pub ctrl: bool,
    pub q: bool,
    pub space: bool,
    pub h: bool,
    pub s: bool,
}

impl KeyState {
    /// Records `key` as held or released. Returns `false` for unrelated keys.
    pub fn set(&mut self, key: gdk::Key, down: bool) -> bool {
        use gdk::Key;
        let slot = match key {
            Key::Control_L | Key::Control_R => &mut self.ctrl,
            Key::q | Key::Q => &mut self.q,
            Key::space => &mut self.space,
            Key::h | Key::H => &mut self.h,
            Key::s | Key::S => &mut self.s,
            _ => return false,
        };
        *slot = down;
        true
    }

    /// Whether Ctrl plus one of the hotkey letters is held.
    pub fn is_hotkey(&self) -> bool {
        self.ctrl && (self.q || self.space || self.h || self.s)
    }
}

/// Turns held-key state into edge-triggered actions.
#[derive(Debug, Default)]
pub struct HotkeyTracker {
    space_latched: bool,
    h_latched: bool,
    s_latched: bool,
}

impl HotkeyTracker {
    /// Returns at most one action per poll, Ctrl+Q taking precedence.
    pub fn poll(&mut self, keys: &KeyState) -> Option<HotkeyAction> {
        let ctrl_space = keys.ctrl && keys.space;
        let ctrl_h = keys.ctrl && keys.h;
        let ctrl_s = keys.ctrl && keys.s;

        if !ctrl_space {
            self.space_latched = false;
        }
        if !ctrl_h {
            self.h_latched = false;
        }
        if !ctrl_s {
            self.s_latched = false;
        }

        if keys.ctrl && keys.q {
            return Some(HotkeyAction::SaveAndQuit);
        }
        if ctrl_space && !self.space_latched {
            self.space_latched = true;
            return Some(HotkeyAction::TogglePlaying);
        }
        if ctrl_h && !self.h_latched {
            self.h_latched = true;
            return Some(HotkeyAction::ToggleUi);
        }
        if ctrl_s && !self.s_latched {
            self.s_latched = true;
            return Some(HotkeyAction::ShowSaveDialog);
        }
        None
    }
}

#[derive(Debug)]
pub struct KeyboardController {
    /// Application reference used to access shared state.
    app: gtk::Application,

    keys: KeyState,

    tracker: HotkeyTracker,
}

impl KeyboardController {
    pub fn new(app: gtk::Application) -> Self {
        Self {
            app,
            keys: KeyState::default(),
            tracker: HotkeyTracker::default(),
        }
    }

    /// Listens for key events on `widget` during the capture phase, so
    /// hotkeys are seen before the editor handles them.
    pub fn setup_widget(&self, widget: &impl IsA<gtk::Widget>) {
        let key_controller = gtk::EventControllerKey::new();
        key_controller.set_propagation_phase(gtk::PropagationPhase::Capture);

        key_controller.connect_key_pressed(glib::clone!(
            #[weak(rename_to = app)]
            self.app,
            #[upgrade_or]
            glib::Propagation::Proceed,
            move |_, key, _, _| {
                let app_data = get_data!(app, AppData, as_mut());
                let keyboard = &mut app_data.keyboard_controller;

                if keyboard.keys.set(key, true) {
                    log::trace!("{} {key}", "key-pressed".white().bold());
                }

                // Keep hotkeys out of the text editor.
                if keyboard.keys.is_hotkey() {
                    glib::Propagation::Stop
                } else {
                    glib::Propagation::Proceed
                }
            }
        ));

        key_controller.connect_key_released(glib::clone!(
            #[weak(rename_to = app)]
            self.app,
            move |_, key, _, _| {
                let app_data = get_data!(app, AppData, as_mut());
                if app_data.keyboard_controller.keys.set(key, false) {
                    log::trace!("{} {key}", "key-released".white().bold());
                }
            }
        ));

        widget.as_ref().add_controller(key_controller);
    }

    /// Forgets held keys, e.g. when the window loses focus mid-press.
    pub fn reset(&mut self) {
        self.keys = KeyState::default();
    }

    pub fn poll(&mut self) -> Option<HotkeyAction> {
        self.tracker.poll(&self.keys)
    }
}
