// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

mod app;
mod cli;
mod diagnostics;
mod editor;
mod frame_controller;
mod keyboard_controller;
mod live_loop;
mod logging;
mod mouse_controller;
mod renderer;
mod settings;
mod shader_manager;
mod source_buffer;
mod storage;


pub const APP_NAME: &str = "glsl-live";
pub const APP_TITLE: &str = "GLSL Live";
pub const APP_ABOUT: &str = "Live GLSL fragment shader editor";
pub const APP_AUTHOR: &str = "Harlen Batagelo, hbatagelo@gmail.com";
pub const APP_ID: &str = "com.github.hbatagelo.glsl-live";
pub const APP_SEMVER: &str = "1.0.0";
pub const GL_VERSION: (i32, i32) = (3, 3);

fn main() -> gtk::glib::ExitCode {
    let args = cli::parse_args().unwrap_or_else(|err| match err {
        cli::CliError::Clap(err) => err.exit(),
    });

    if let Err(err) = logging::init_logging(logging::default_level(args.verbose)) {
        eprintln!("{err}");
    }

    let cli_config = cli::resolve(&args);
    let exit_code = app::run(cli_config);

    log::logger().flush();
    exit_code
}
