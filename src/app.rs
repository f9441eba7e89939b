// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

//! GTK application runtime and window management.
//!
//! Builds the window (a GL area with the editor overlay on top), loads GL,
//! drives one live-loop frame per render and persists the edited shaders
//! when the window closes.

use function_name::named;
use gtk::{gdk, glib, prelude::*};
use owo_colors::OwoColorize;
use std::{path::PathBuf, rc::Rc, sync::Once};

use crate::{
    cli::CliConfig,
    editor::*,
    frame_controller::*,
    keyboard_controller::*,
    live_loop::*,
    mouse_controller::*,
    renderer::{gl_api::*, *},
    settings::Settings,
    shader_manager::ShaderManager,
    storage::ShaderStore,
    *,
};

/// Ensures that GL function pointers are only loaded once.
static LOAD_GL: Once = Once::new();

/// Global application state stored on the [`gtk::Application`].
pub struct AppData {
    pub settings: Settings,

    /// Fragment shader given on the command line, if any.
    pub fragment: Option<PathBuf>,

    /// Hotkey-driven flags.
    pub session: Session,

    pub live_loop: LiveLoop,

    /// Frame timing and FPS statistics.
    pub frame_controller: FrameController,

    pub keyboard_controller: KeyboardController,

    pub mouse_controller: MouseController,

    /// Created once the GL context exists, dropped while it is still current.
    pub manager: Option<ShaderManager>,

    pub renderer: Option<Renderer>,

    pub editor: Option<Editor>,

    pub save_form: SaveAsForm,

    pub window: Option<gtk::ApplicationWindow>,

    pub area: Option<gtk::GLArea>,

    /// Frame driver source used when vsync is off.
    pub idle_source: Option<glib::SourceId>,

    /// Set once the latest pair has been written on the way out.
    pub saved_on_exit: bool,
}

/// Initializes and runs the GTK application.
pub fn run(cli_config: CliConfig) -> glib::ExitCode {
    let app = gtk::Application::builder().application_id(APP_ID).build();

    let CliConfig { settings, fragment } = cli_config;
    let session = Session::new(settings.start_playing, settings.show_ui);

    set_data!(
        app,
        AppData {
            live_loop: LiveLoop::new(settings.recompile),
            frame_controller: FrameController::new(settings.stats_interval),
            keyboard_controller: KeyboardController::new(app.clone()),
            mouse_controller: MouseController::new(app.clone()),
            settings,
            fragment,
            session,
            manager: None,
            renderer: None,
            editor: None,
            save_form: SaveAsForm::default(),
            window: None,
            area: None,
            idle_source: None,
            saved_on_exit: false,
        }
    );

    app.connect_activate(activate);
    app.run_with_args(&[""])
}

/// GTK activation handler.
#[named]
fn activate(app: &gtk::Application) {
    log::debug!("{}", function_name!().white().bold());

    let app_data = get_data!(app, AppData, as_mut());
    if app_data.window.is_some() {
        return;
    }

    let settings = &app_data.settings;
    let window = gtk::ApplicationWindow::builder()
        .application(app)
        .name(APP_NAME)
        .icon_name(APP_NAME)
        .title(APP_TITLE)
        .default_width(settings.window_width)
        .default_height(settings.window_height)
        .width_request(320)
        .height_request(240)
        .build();

    let area = setup_area(&app_data.mouse_controller);
    let editor = Editor::new(settings);
    editor.set_visible(app_data.session.ui_visible);

    let overlay = gtk::Overlay::new();
    overlay.set_child(Some(&area));
    overlay.add_overlay(editor.widget());
    window.set_child(Some(&overlay));

    // Capture on the window so hotkeys work whichever widget has focus.
    app_data.keyboard_controller.setup_widget(&window);

    window.connect_is_active_notify(glib::clone!(
        #[weak]
        app,
        move |window| {
            log::debug!("Window active: {}", window.is_active());
            if !window.is_active() {
                get_data!(app, AppData, as_mut()).keyboard_controller.reset();
            }
        }
    ));

    window.connect_close_request(glib::clone!(
        #[weak]
        app,
        #[upgrade_or]
        glib::Propagation::Proceed,
        move |_| {
            save_on_exit(get_data!(app, AppData, as_mut()));
            glib::Propagation::Proceed
        }
    ));

    if settings.fullscreen {
        window.fullscreen();
    }

    app_data.editor = Some(editor);
    app_data.area = Some(area);
    app_data.window = Some(window.clone());
    window.present();
}

/// Creates the GL area and connects its lifecycle handlers.
fn setup_area(mouse_controller: &MouseController) -> gtk::GLArea {
    let area = gtk::GLArea::new();

    area.set_required_version(GL_VERSION.0, GL_VERSION.1);
    area.set_has_depth_buffer(false);
    area.set_has_stencil_buffer(false);
    area.set_auto_render(false);
    area.set_focusable(true);
    area.set_hexpand(true);
    area.set_vexpand(true);

    mouse_controller.setup_area(&area);

    area.connect_realize(on_realize);
    area.connect_unrealize(on_unrealize);
    area.connect_render(on_render);

    area
}

/// Loads GL, builds the shader pipeline and starts the frame driver.
#[named]
fn on_realize(area: &gtk::GLArea) {
    log::debug!("{}", function_name!().white().bold());

    if let Some(err) = area.error() {
        log::error!("{err}");
        let (major, minor) = area.required_version();
        log::error!("OpenGL {major}.{minor} required");
        std::process::exit(1);
    }

    let Some(gl_context) = area.context() else {
        log::error!("Failed to get GL context");
        std::process::exit(1);
    };
    gl_context.make_current();

    LOAD_GL.call_once(|| {
        log_gl_version(&gl_context);
        if let Err(err) = load_gl_functions() {
            log::error!("Failed to load GL functions: {err}");
            std::process::exit(1);
        }
        log_glsl_version();
    });

    let app = get_app_from_area(area);
    let app_data = get_data!(app, AppData, as_mut());

    let renderer = Renderer::new().unwrap_or_else(|err| {
        log::error!("Failed to create renderer: {err}");
        std::process::exit(1);
    });

    let gl: Rc<dyn GlApi> = Rc::new(NativeGl::new());
    let store = ShaderStore::new(app_data.settings.shader_dir.clone());
    let manager = ShaderManager::new(gl, store, app_data.fragment.as_deref());

    if let Some(editor) = &app_data.editor {
        editor.set_sources(
            manager.vertex_shader().source(),
            manager.fragment_shader().source(),
        );
        connect_editor(&app, editor);
    }

    app_data.renderer = Some(renderer);
    app_data.manager = Some(manager);

    setup_frame_driver(app_data, area);
}

/// Forwards editor input to the shader pipeline.
fn connect_editor(app: &gtk::Application, editor: &Editor) {
    editor.connect_fragment_changed(glib::clone!(
        #[weak]
        app,
        move |text| {
            let app_data = get_data!(app, AppData, as_mut());
            if let Some(manager) = app_data.manager.as_mut() {
                manager.fragment_shader_mut().set_source(text);
            }
        }
    ));

    editor.connect_save(glib::clone!(
        #[weak]
        app,
        move |name| {
            let app_data = get_data!(app, AppData, as_mut());
            let Some(manager) = app_data.manager.as_ref() else {
                return;
            };

            let saved = app_data.save_form.submit(name, manager);
            if let Some(path) = &saved {
                log::info!("Saved {}", path.display());
                app_data.session.close_save_dialog();
            }
            if let Some(editor) = &app_data.editor {
                editor.set_save_error(app_data.save_form.error());
                editor.set_save_bar_visible(app_data.session.save_dialog_open);
            }
        }
    ));
}

/// Queues a render every frame-clock tick, or as fast as the main loop
/// allows when vsync is off.
fn setup_frame_driver(app_data: &mut AppData, area: &gtk::GLArea) {
    if app_data.settings.vsync {
        area.add_tick_callback(|area, _| {
            area.queue_render();
            glib::ControlFlow::Continue
        });
    } else {
        let source_id = glib::idle_add_local(glib::clone!(
            #[weak]
            area,
            #[upgrade_or]
            glib::ControlFlow::Break,
            move || {
                area.queue_render();
                glib::ControlFlow::Continue
            }
        ));
        app_data.idle_source = Some(source_id);
    }
}

/// Loads OpenGL function pointers via libepoxy.
///
/// Required because GTK does not expose GL symbol loading.
fn load_gl_functions() -> Result<(), Box<dyn std::error::Error>> {
    let library = unsafe {
        libloading::os::unix::Library::new("libepoxy.so.0")
            .map_err(|err| format!("Failed to load libepoxy.so.0: {err}"))?
    };

    epoxy::load_with(|name| {
        unsafe { library.get::<_>(name.as_bytes()) }
            .map(|symbol| *symbol)
            .unwrap_or(std::ptr::null())
    });

    gl::load_with(epoxy::get_proc_addr);

    let version = unsafe { gl::GetString(gl::VERSION) };
    if version.is_null() {
        return Err("GL functions not loaded properly".into());
    }

    Ok(())
}

fn log_gl_version(gl_context: &gdk::GLContext) {
    let (major, minor) = gl_context.version();
    log::info!("GL version: {major}.{minor}");
}

fn log_glsl_version() {
    let glsl_version = glsl_version().unwrap_or_else(|err| {
        log::warn!("Failed to get GLSL version: {err}");
        "Unknown".to_string()
    });
    log::info!("GLSL version: {glsl_version}");
}

fn glsl_version() -> Result<String, &'static str> {
    unsafe {
        let ptr = gl::GetString(gl::SHADING_LANGUAGE_VERSION);
        if ptr.is_null() {
            return Err("Failed to get GLSL version string");
        }

        std::ffi::CStr::from_ptr(ptr as *const std::ffi::c_char)
            .to_str()
            .map(|s| s.to_string())
            .map_err(|_| "Invalid UTF-8 in GLSL version string")
    }
}

/// Runs one live-loop frame.
#[named]
fn on_render(area: &gtk::GLArea, gl_context: &gdk::GLContext) -> glib::Propagation {
    gl_context.make_current();

    let app = get_app_from_area(area);
    let app_data = get_data!(app, AppData, as_mut());

    if let Some(action) = app_data.keyboard_controller.poll() {
        handle_hotkey(app_data, action);
    }

    let timing = app_data.frame_controller.tick();
    log::trace!(
        "{} frame={} t={:?} dt={:?}",
        function_name!().white().bold(),
        app_data.live_loop.frame(),
        app_data.live_loop.scene_time(),
        timing.time_delta,
    );

    let (Some(manager), Some(renderer)) = (app_data.manager.as_mut(), app_data.renderer.as_ref())
    else {
        return glib::Propagation::Stop;
    };

    let scale = area.scale_factor();
    let viewport = Viewport::new(
        (area.width() * scale).max(0) as u32,
        (area.height() * scale).max(0) as u32,
    );
    let [x, y] = app_data.mouse_controller.position();
    let input = FrameInput {
        viewport,
        cursor: [x * scale as f32, y * scale as f32],
        time_delta: timing.time_delta,
    };

    renderer.begin_frame(viewport);
    app_data
        .live_loop
        .render_frame(manager, &app_data.session, &input, |program| {
            renderer.draw(program)
        });

    if let Some(editor) = app_data.editor.as_mut() {
        editor.set_visible(app_data.session.ui_visible);
        editor.set_save_bar_visible(app_data.session.save_dialog_open);
        editor.show_diagnostics(app_data.live_loop.diagnostics());
    }

    if let (Some(report), Some(window)) = (&timing.fps_report, &app_data.window) {
        window.set_title(Some(&report.title()));
    }

    glib::Propagation::Stop
}

fn handle_hotkey(app_data: &mut AppData, action: HotkeyAction) {
    log::debug!("Hotkey: {action:?}");

    match action {
        HotkeyAction::SaveAndQuit => {
            save_on_exit(app_data);
            // Closing re-enters AppData through close-request, so leave the
            // render callback first.
            if let Some(window) = app_data.window.clone() {
                glib::idle_add_local_once(move || window.close());
            }
        }
        HotkeyAction::TogglePlaying => {
            let playing = app_data.session.toggle_playing();
            log::info!("{}", if playing { "Playing" } else { "Paused" });
        }
        HotkeyAction::ToggleUi => {
            app_data.session.toggle_ui();
            if !app_data.session.ui_visible {
                app_data.session.close_save_dialog();
            }
        }
        HotkeyAction::ShowSaveDialog => {
            app_data.session.open_save_dialog();
        }
    }
}

/// Writes the latest pair once per run.
fn save_on_exit(app_data: &mut AppData) {
    if app_data.saved_on_exit {
        return;
    }
    let Some(manager) = app_data.manager.as_ref() else {
        return;
    };

    match manager.save_latest() {
        Ok(()) => log::info!("Saved latest shaders to {}", manager.store().root().display()),
        Err(err) => log::error!("Failed to save latest shaders: {err}"),
    }
    app_data.saved_on_exit = true;
}

/// Releases GL objects while the context is still current.
#[named]
fn on_unrealize(area: &gtk::GLArea) {
    log::debug!("{}", function_name!().white().bold());

    let app = get_app_from_area(area);
    let app_data = get_data!(app, AppData, as_mut());
    save_on_exit(app_data);

    if let Some(source_id) = app_data.idle_source.take() {
        source_id.remove();
    }

    if let Some(gl_context) = area.context() {
        gl_context.make_current();
        app_data.manager = None;
        app_data.renderer = None;
    } else {
        log::warn!("No GL context left to release shader objects");
        std::mem::forget(app_data.manager.take());
        std::mem::forget(app_data.renderer.take());
    }
}

/// Gets the application from a [`gtk::GLArea`], assuming
/// it's contained in a [`gtk::Window`].
/// Panics if the [`gtk::GLArea`] isn't in a [`gtk::Window`] or
/// the [`gtk::Window`] has no [`gtk::Application`].
fn get_app_from_area(area: &gtk::GLArea) -> gtk::Application {
    area.root()
        .and_downcast::<gtk::Window>()
        .and_then(|window| window.application())
        .expect("GL area outside an application window")
}

/// Sets typed user data on a [`glib::Object`], using the type name as the key.
///
/// The second argument must be a struct literal `TypeName { ... }`, since
/// `TypeName` is used both as the type and the key.
#[macro_export]
macro_rules! set_data {
    ($obj:expr, $ty:ident { $($fields:tt)* }) => {{
        let key = stringify!($ty);
        let obj = &$obj;
        let data = $ty { $($fields)* };
        unsafe {
            obj.set_data(key, data)
        }
    }};
}

/// Retrieves typed user data from a [`glib::Object`], using the type name
/// as the key, e.g. `get_data!(app, AppData, as_mut())`.
///
/// Panics if the data is missing.
#[macro_export]
macro_rules! get_data {
    ($obj:expr, $ty:ty, $($tail:tt)+) => {{
        let key = stringify!($ty);
        let obj = &$obj;
        unsafe {
            obj.data::<$ty>(key)
                .expect(concat!("Missing data: ", stringify!($ty))).$($tail)+
        }
    }};
}
