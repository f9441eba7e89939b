use pretty_assertions::assert_eq;
use std::{fs, rc::Rc};

use super::super::{
    editor::*,
    renderer::{gl_api::GlApi, headless::HeadlessGl},
    shader_manager::*,
    storage::ShaderStore,
};

fn manager_in(root: &std::path::Path) -> ShaderManager {
    let gl: Rc<dyn GlApi> = Rc::new(HeadlessGl::new());
    ShaderManager::new(gl, ShaderStore::new(root), None)
}

#[test]
fn test_save_form_empty_name_sets_error() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager_in(dir.path());
    let mut form = SaveAsForm::default();

    assert_eq!(form.submit("   ", &manager), None);
    assert_eq!(form.error(), Some("Please enter a name"));
}

#[test]
fn test_save_form_error_persists_until_success() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager_in(dir.path());
    let mut form = SaveAsForm::default();

    assert_eq!(form.submit("a/b", &manager), None);
    let first_error = form.error().map(str::to_string);
    assert!(first_error.unwrap().contains("a/b"));

    assert_eq!(form.submit("", &manager), None);
    assert!(form.error().is_some());

    let path = form.submit("sunset", &manager).unwrap();
    assert_eq!(form.error(), None);
    assert_eq!(
        fs::read_to_string(path).unwrap(),
        BUILTIN_FRAGMENT_SHADER
    );
}

#[test]
fn test_output_text_success() {
    assert_eq!(output_text(None), "Compiled successfully.");
}

#[test]
fn test_output_text_lists_diagnostics() {
    assert_eq!(
        output_text(Some("0:6(1): error: syntax error\n0:2(3): warning: unused\n")),
        "6:1: error: syntax error\n2:3: warning: unused"
    );
}

#[test]
fn test_output_text_keeps_blank_logs() {
    assert_eq!(output_text(Some("")), "");
}
