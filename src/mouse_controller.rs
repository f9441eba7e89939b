// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

use gtk::{glib, prelude::*};
use owo_colors::OwoColorize;

use crate::{app::*, *};

/// Last cursor position over the GL area, in window pixels from the top-left.
#[derive(Debug)]
pub struct MouseController {
    app: gtk::Application,
    position: [f32; 2],
}

impl MouseController {
    pub fn new(app: gtk::Application) -> Self {
        Self {
            app,
            position: [0.0; 2],
        }
    }

    pub fn setup_area(&self, area: &gtk::GLArea) {
        let motion_controller = gtk::EventControllerMotion::new();
        motion_controller.connect_motion(glib::clone!(
            #[weak(rename_to = app)]
            self.app,
            move |_, x, y| {
                let app_data = get_data!(app, AppData, as_mut());
                let mouse = &mut app_data.mouse_controller;
                mouse.position = [x as f32, y as f32];

                log::trace!("{} {:?}", "motion".white().bold(), mouse.position);
            }
        ));
        area.add_controller(motion_controller);
    }

    pub fn position(&self) -> [f32; 2] {
        self.position
    }
}
