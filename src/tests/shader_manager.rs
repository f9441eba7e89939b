use pretty_assertions::assert_eq;
use std::{fs, path::Path, rc::Rc};

use super::super::{
    renderer::{gl_api::GlApi, headless::HeadlessGl, shader::*},
    shader_manager::*,
    storage::*,
};

const SOLID_FRAGMENT: &str = "#version 330 core
in vec2 fragCoord;
out vec4 fragColor;
void main()
{
    fragColor = vec4(1.0);
}
";

const BROKEN_FRAGMENT: &str = "#version 330 core
in vec2 fragCoord;
out vec4 fragColor;
void main()
{
    fragColor = vec4(1.0)
}
";

fn manager_in(root: &Path, fragment: Option<&Path>) -> (Rc<HeadlessGl>, ShaderManager) {
    let headless = Rc::new(HeadlessGl::new());
    let gl: Rc<dyn GlApi> = headless.clone();
    let manager = ShaderManager::new(gl, ShaderStore::new(root), fragment);
    (headless, manager)
}

#[test]
fn test_empty_directory_uses_and_persists_builtins() {
    let dir = tempfile::tempdir().unwrap();
    let (headless, manager) = manager_in(dir.path(), None);

    assert_eq!(manager.vertex_shader().source(), BUILTIN_VERTEX_SHADER);
    assert_eq!(manager.fragment_shader().source(), BUILTIN_FRAGMENT_SHADER);
    assert!(manager.vertex_shader().is_good());
    assert!(manager.fragment_shader().is_good());
    assert!(manager.shader_program().is_good());
    assert_eq!(headless.live_programs(), 1);

    let store = manager.store();
    assert_eq!(
        fs::read_to_string(store.default_path(ShaderStage::Fragment)).unwrap(),
        BUILTIN_FRAGMENT_SHADER
    );
    assert_eq!(
        fs::read_to_string(store.default_path(ShaderStage::Vertex)).unwrap(),
        BUILTIN_VERTEX_SHADER
    );
}

#[test]
fn test_default_file_is_used_when_no_latest() {
    let dir = tempfile::tempdir().unwrap();
    let store = ShaderStore::new(dir.path());
    write_text_file(&store.default_path(ShaderStage::Fragment), SOLID_FRAGMENT).unwrap();

    let (_, manager) = manager_in(dir.path(), None);

    assert_eq!(manager.fragment_shader().source(), SOLID_FRAGMENT);
    assert_eq!(manager.vertex_shader().source(), BUILTIN_VERTEX_SHADER);
    assert!(manager.shader_program().is_good());
}

#[test]
fn test_latest_wins_over_default() {
    let dir = tempfile::tempdir().unwrap();
    let store = ShaderStore::new(dir.path());
    write_text_file(&store.default_path(ShaderStage::Fragment), BUILTIN_FRAGMENT_SHADER).unwrap();
    write_text_file(&store.latest_path(ShaderStage::Fragment), SOLID_FRAGMENT).unwrap();

    let (_, manager) = manager_in(dir.path(), None);

    assert_eq!(manager.fragment_shader().source(), SOLID_FRAGMENT);
}

#[test]
fn test_blank_latest_falls_through() {
    let dir = tempfile::tempdir().unwrap();
    let store = ShaderStore::new(dir.path());
    write_text_file(&store.latest_path(ShaderStage::Fragment), "  \n\n").unwrap();
    write_text_file(&store.default_path(ShaderStage::Fragment), SOLID_FRAGMENT).unwrap();

    let (_, manager) = manager_in(dir.path(), None);

    assert_eq!(manager.fragment_shader().source(), SOLID_FRAGMENT);
}

#[test]
fn test_command_line_fragment_wins_over_latest() {
    let dir = tempfile::tempdir().unwrap();
    let store = ShaderStore::new(dir.path());
    write_text_file(&store.latest_path(ShaderStage::Fragment), BUILTIN_FRAGMENT_SHADER).unwrap();
    let explicit = dir.path().join("mine.glsl");
    fs::write(&explicit, SOLID_FRAGMENT).unwrap();

    let (_, manager) = manager_in(dir.path(), Some(&explicit));

    assert_eq!(manager.fragment_shader().source(), SOLID_FRAGMENT);
}

#[test]
fn test_broken_initial_fragment_gives_empty_program() {
    let dir = tempfile::tempdir().unwrap();
    let store = ShaderStore::new(dir.path());
    write_text_file(&store.latest_path(ShaderStage::Fragment), BROKEN_FRAGMENT).unwrap();

    let (headless, manager) = manager_in(dir.path(), None);

    assert_eq!(manager.fragment_shader().source(), BROKEN_FRAGMENT);
    assert!(!manager.fragment_shader().is_good());
    assert!(!manager.shader_program().is_good());
    assert_eq!(manager.shader_program().id(), 0);
    assert_eq!(headless.live_programs(), 0);
    assert_eq!(
        manager.startup_log(),
        Some(manager.fragment_shader().compilation_error())
    );
    assert!(manager.startup_log().unwrap().starts_with("0:6("));
}

#[test]
fn test_startup_log_empty_after_link() {
    let dir = tempfile::tempdir().unwrap();
    let (_, manager) = manager_in(dir.path(), None);
    assert_eq!(manager.startup_log(), None);
}

#[test]
fn test_unreadable_command_line_fragment_keeps_latest() {
    let dir = tempfile::tempdir().unwrap();
    let store = ShaderStore::new(dir.path());
    write_text_file(&store.latest_path(ShaderStage::Fragment), SOLID_FRAGMENT).unwrap();
    let missing = dir.path().join("missing.glsl");

    let (_, manager) = manager_in(dir.path(), Some(&missing));

    assert_eq!(manager.fragment_shader().source(), SOLID_FRAGMENT);
    assert!(manager.shader_program().is_good());
}

#[test]
fn test_relink_keeps_program_on_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (headless, mut manager) = manager_in(dir.path(), None);
    let good_id = manager.shader_program().id();

    manager
        .fragment_shader_mut()
        .compile_from_text(BROKEN_FRAGMENT, ShaderStage::Fragment);
    let result = manager.relink();

    assert_eq!(
        result.err(),
        Some(ShaderError::InvalidUnit(ShaderStage::Fragment))
    );
    assert_eq!(manager.shader_program().id(), good_id);
    assert!(manager.shader_program().is_good());
    assert_eq!(headless.live_programs(), 1);
}

#[test]
fn test_relink_swaps_in_new_program() {
    let dir = tempfile::tempdir().unwrap();
    let (headless, mut manager) = manager_in(dir.path(), None);
    let old_id = manager.shader_program().id();

    assert!(manager
        .fragment_shader_mut()
        .compile_from_text(SOLID_FRAGMENT, ShaderStage::Fragment));
    manager.relink().unwrap();

    assert!(manager.shader_program().is_good());
    assert!(manager.shader_program().id() != old_id);
    assert_eq!(headless.live_programs(), 1);
}

#[test]
fn test_save_latest_writes_both_stages() {
    let dir = tempfile::tempdir().unwrap();
    let (_, mut manager) = manager_in(dir.path(), None);
    manager.fragment_shader_mut().set_source(SOLID_FRAGMENT);

    manager.save_latest().unwrap();

    let store = manager.store();
    assert_eq!(
        fs::read_to_string(store.latest_path(ShaderStage::Fragment)).unwrap(),
        SOLID_FRAGMENT
    );
    assert_eq!(
        fs::read_to_string(store.latest_path(ShaderStage::Vertex)).unwrap(),
        BUILTIN_VERTEX_SHADER
    );
}

#[test]
fn test_save_latest_refuses_empty_fragment() {
    let dir = tempfile::tempdir().unwrap();
    let (_, mut manager) = manager_in(dir.path(), None);
    manager.save_latest().unwrap();
    manager.fragment_shader_mut().set_source("");

    assert!(matches!(
        manager.save_latest(),
        Err(StorageError::EmptyText(_))
    ));
    assert_eq!(
        fs::read_to_string(manager.store().latest_path(ShaderStage::Fragment)).unwrap(),
        BUILTIN_FRAGMENT_SHADER
    );
}

#[test]
fn test_save_as() {
    let dir = tempfile::tempdir().unwrap();
    let (_, manager) = manager_in(dir.path(), None);

    let path = manager.save_as("waves").unwrap();

    assert_eq!(path, dir.path().join("waves").join("waves_fragment.glsl"));
    assert_eq!(fs::read_to_string(&path).unwrap(), BUILTIN_FRAGMENT_SHADER);
    assert!(matches!(
        manager.save_as("../escape"),
        Err(StorageError::InvalidName(_))
    ));
}

#[test]
fn test_load_fragment_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let (_, mut manager) = manager_in(dir.path(), None);

    let missing = dir.path().join("missing.glsl");
    assert!(manager.load_fragment_shader_from_path(&missing).is_err());
    assert_eq!(manager.fragment_shader().source(), BUILTIN_FRAGMENT_SHADER);

    let empty = dir.path().join("empty.glsl");
    fs::write(&empty, "").unwrap();
    assert!(matches!(
        manager.load_fragment_shader_from_path(&empty),
        Err(StorageError::EmptyText(_))
    ));
    assert_eq!(manager.fragment_shader().source(), BUILTIN_FRAGMENT_SHADER);

    let solid = dir.path().join("solid.glsl");
    fs::write(&solid, SOLID_FRAGMENT).unwrap();
    manager.load_fragment_shader_from_path(&solid).unwrap();
    assert_eq!(manager.fragment_shader().source(), SOLID_FRAGMENT);
}

#[test]
fn test_save_fragment_to_path_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (_, mut manager) = manager_in(dir.path(), None);
    let path = dir.path().join("copy").join("shader.glsl");

    manager.save_fragment_shader_to_path(&path).unwrap();
    manager.fragment_shader_mut().set_source(SOLID_FRAGMENT);
    manager.load_fragment_shader_from_path(&path).unwrap();

    assert_eq!(manager.fragment_shader().source(), BUILTIN_FRAGMENT_SHADER);
}
