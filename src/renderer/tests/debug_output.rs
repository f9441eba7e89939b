use pretty_assertions::assert_eq;

use super::super::debug_output::*;

#[test]
fn test_severity_to_level() {
    assert_eq!(level_for(gl::DEBUG_SEVERITY_HIGH), log::Level::Error);
    assert_eq!(level_for(gl::DEBUG_SEVERITY_MEDIUM), log::Level::Warn);
    assert_eq!(level_for(gl::DEBUG_SEVERITY_LOW), log::Level::Debug);
    assert_eq!(level_for(gl::DEBUG_SEVERITY_NOTIFICATION), log::Level::Trace);
}

#[test]
fn test_source_and_kind_names() {
    assert_eq!(source_name(gl::DEBUG_SOURCE_SHADER_COMPILER), "shader compiler");
    assert_eq!(source_name(0), "other");
    assert_eq!(kind_name(gl::DEBUG_TYPE_PERFORMANCE), "performance");
    assert_eq!(kind_name(gl::DEBUG_TYPE_ERROR), "error");
}
