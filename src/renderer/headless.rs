// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory [`GlApi`] for exercising the shader pipeline without a GPU.
//!
//! "Compiling" runs a deliberately tiny syntax check: balanced braces and
//! parentheses, a `main` function, and statements that end in `;`.
//! "Linking" requires a compiled vertex and fragment shader and checks
//! that every fragment `in` has a matching vertex `out`. Uniform locations
//! are assigned in declaration order.

use gl::types::*;
use std::{cell::RefCell, collections::HashMap};

use super::{
    gl_api::{GlApi, UniformShape},
    shader::ShaderStage,
};

#[derive(Default)]
pub struct HeadlessGl {
    state: RefCell<State>,
}

#[derive(Default)]
struct State {
    next_id: GLuint,
    shaders: HashMap<GLuint, FakeShader>,
    programs: HashMap<GLuint, FakeProgram>,
    current_program: GLuint,
    compile_count: usize,
    refuse_programs: bool,
}

struct FakeShader {
    stage: ShaderStage,
    source: String,
    status: Option<Result<(), String>>,
}

#[derive(Default)]
struct FakeProgram {
    attached: Vec<GLuint>,
    linked: bool,
    log: String,
    uniforms: Vec<String>,
    values: HashMap<GLint, Vec<f32>>,
}

impl State {
    fn allocate_id(&mut self) -> GLuint {
        self.next_id += 1;
        self.next_id
    }

    fn write_uniform(&mut self, location: GLint, data: &[f32]) {
        let current = self.current_program;
        if location < 0 {
            return;
        }
        if let Some(program) = self.programs.get_mut(&current) {
            if (location as usize) < program.uniforms.len() {
                program.values.insert(location, data.to_vec());
            }
        }
    }

    fn read_uniform(&self, program: GLuint, location: GLint) -> Vec<f32> {
        self.programs
            .get(&program)
            .and_then(|program| program.values.get(&location))
            .cloned()
            .unwrap_or_default()
    }

    fn link(&self, attached: &[GLuint]) -> Result<Vec<String>, String> {
        let mut vertex = None;
        let mut fragment = None;
        let mut uniforms = Vec::new();

        for id in attached {
            let shader = self
                .shaders
                .get(id)
                .ok_or_else(|| format!("error: shader {id} does not exist"))?;
            if !matches!(shader.status, Some(Ok(()))) {
                return Err(format!("error: {} shader {id} is not compiled", shader.stage));
            }
            match shader.stage {
                ShaderStage::Vertex => vertex = Some(shader),
                ShaderStage::Fragment => fragment = Some(shader),
                ShaderStage::Geometry => {}
            }
            for name in declarations(&shader.source, "uniform") {
                if !uniforms.contains(&name) {
                    uniforms.push(name);
                }
            }
        }

        let vertex = vertex.ok_or("error: no vertex shader attached")?;
        let fragment = fragment.ok_or("error: no fragment shader attached")?;

        let outputs = declarations(&vertex.source, "out");
        for input in declarations(&fragment.source, "in") {
            if !outputs.contains(&input) {
                return Err(format!(
                    "error: fragment shader input `{input}` has no matching vertex shader output"
                ));
            }
        }

        Ok(uniforms)
    }
}

impl HeadlessGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of shader objects created and not yet deleted.
    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    /// Number of program objects created and not yet deleted.
    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn current_program(&self) -> GLuint {
        self.state.borrow().current_program
    }

    /// Total number of compile calls issued.
    pub fn compile_count(&self) -> usize {
        self.state.borrow().compile_count
    }

    /// Makes [`GlApi::create_program`] return `0`, as a driver out of resources would.
    pub fn refuse_programs(&self, refuse: bool) {
        self.state.borrow_mut().refuse_programs = refuse;
    }

    pub fn attached_to(&self, program: GLuint) -> Vec<GLuint> {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|program| program.attached.clone())
            .unwrap_or_default()
    }
}

impl GlApi for HeadlessGl {
    fn create_shader(&self, stage: ShaderStage) -> GLuint {
        let mut state = self.state.borrow_mut();
        let id = state.allocate_id();
        state.shaders.insert(
            id,
            FakeShader {
                stage,
                source: String::new(),
                status: None,
            },
        );
        id
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        if let Some(shader) = self.state.borrow_mut().shaders.get_mut(&shader) {
            shader.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: GLuint) {
        let mut state = self.state.borrow_mut();
        state.compile_count += 1;
        if let Some(shader) = state.shaders.get_mut(&shader) {
            shader.status = Some(check_syntax(&shader.source));
        }
    }

    fn shader_compile_status(&self, shader: GLuint) -> bool {
        matches!(
            self.state.borrow().shaders.get(&shader).map(|s| &s.status),
            Some(Some(Ok(())))
        )
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        match self.state.borrow().shaders.get(&shader).map(|s| &s.status) {
            Some(Some(Err(log))) => log.clone(),
            _ => String::new(),
        }
    }

    fn delete_shader(&self, shader: GLuint) {
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> GLuint {
        let mut state = self.state.borrow_mut();
        if state.refuse_programs {
            return 0;
        }
        let id = state.allocate_id();
        state.programs.insert(id, FakeProgram::default());
        id
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        if let Some(program) = self.state.borrow_mut().programs.get_mut(&program) {
            program.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) {
        if let Some(program) = self.state.borrow_mut().programs.get_mut(&program) {
            program.attached.retain(|&id| id != shader);
        }
    }

    fn link_program(&self, program: GLuint) {
        let mut state = self.state.borrow_mut();
        let Some(attached) = state.programs.get(&program).map(|p| p.attached.clone()) else {
            return;
        };
        let result = state.link(&attached);
        if let Some(program) = state.programs.get_mut(&program) {
            match result {
                Ok(uniforms) => {
                    program.linked = true;
                    program.log.clear();
                    program.uniforms = uniforms;
                }
                Err(log) => {
                    program.linked = false;
                    program.log = log;
                    program.uniforms.clear();
                }
            }
            program.values.clear();
        }
    }

    fn program_link_status(&self, program: GLuint) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|program| program.linked)
    }

    fn program_info_log(&self, program: GLuint) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|program| program.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: GLuint) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        if state.current_program == program {
            state.current_program = 0;
        }
    }

    fn use_program(&self, program: GLuint) {
        self.state.borrow_mut().current_program = program;
    }

    fn uniform_location(&self, program: GLuint, name: &str) -> GLint {
        self.state
            .borrow()
            .programs
            .get(&program)
            .filter(|program| program.linked)
            .and_then(|program| program.uniforms.iter().position(|u| u == name))
            .map_or(-1, |index| index as GLint)
    }

    fn uniform_1i(&self, location: GLint, value: GLint) {
        self.state
            .borrow_mut()
            .write_uniform(location, &[value as f32]);
    }

    fn uniform_1f(&self, location: GLint, value: GLfloat) {
        self.state.borrow_mut().write_uniform(location, &[value]);
    }

    fn uniform_fv(&self, location: GLint, shape: UniformShape, data: &[GLfloat]) {
        assert_eq!(data.len(), shape.components());
        self.state.borrow_mut().write_uniform(location, data);
    }

    fn get_uniform_iv(&self, program: GLuint, location: GLint, storage: &mut [GLint]) {
        let values = self.state.borrow().read_uniform(program, location);
        for (slot, value) in storage.iter_mut().zip(values.iter().chain(std::iter::repeat(&0.0))) {
            *slot = *value as GLint;
        }
    }

    fn get_uniform_fv(&self, program: GLuint, location: GLint, storage: &mut [GLfloat]) {
        let values = self.state.borrow().read_uniform(program, location);
        for (slot, value) in storage.iter_mut().zip(values.iter().chain(std::iter::repeat(&0.0))) {
            *slot = *value;
        }
    }
}

/// Replaces `//` and `/* */` comments with spaces, keeping line breaks.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut previous = ' ';
                for c in chars.by_ref() {
                    if c == '\n' {
                        out.push('\n');
                    }
                    if previous == '*' && c == '/' {
                        break;
                    }
                    previous = c;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

fn has_assignment(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'='
            && bytes.get(i + 1) != Some(&b'=')
            && !matches!(i.checked_sub(1).map(|p| bytes[p]), Some(b'=' | b'!' | b'<' | b'>'))
    })
}

fn statement_is_terminated(line: &str) -> bool {
    const CONTROL: [&str; 4] = ["if", "for", "while", "else"];

    if line.ends_with([';', '{', '}', ',', '(']) || line == "else" {
        return true;
    }
    if line.ends_with(')') {
        let is_control = CONTROL.iter().any(|keyword| {
            line.strip_prefix(keyword)
                .is_some_and(|rest| rest.starts_with([' ', '(']))
        });
        return is_control || (!has_assignment(line) && !line.starts_with("return"));
    }
    false
}

fn check_syntax(source: &str) -> Result<(), String> {
    let source = strip_comments(source);
    let mut braces = 0i64;
    let mut parens = 0i64;
    let mut last_line = 0;

    for (index, line) in source.lines().enumerate() {
        let line_number = index + 1;
        last_line = line_number;
        let line = line.trim();

        for c in line.chars() {
            match c {
                '{' => braces += 1,
                '}' => braces -= 1,
                '(' => parens += 1,
                ')' => parens -= 1,
                _ => {}
            }
            if braces < 0 || parens < 0 {
                return Err(format!(
                    "0:{line_number}(1): error: syntax error, unexpected '{c}'"
                ));
            }
        }

        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !statement_is_terminated(line) {
            return Err(format!(
                "0:{line_number}(1): error: syntax error, unexpected end of line, expecting ';'"
            ));
        }
    }

    if braces != 0 || parens != 0 {
        return Err(format!(
            "0:{last_line}(1): error: syntax error, unexpected end of file"
        ));
    }
    if !source.contains("void main") {
        return Err("0:0(0): error: main function not found".to_string());
    }
    Ok(())
}

/// Names declared at global scope with the given storage qualifier.
fn declarations(source: &str, qualifier: &str) -> Vec<String> {
    strip_comments(source)
        .lines()
        .filter_map(|line| {
            let mut tokens = line.trim().trim_end_matches(';').split_whitespace();
            if tokens.next()? != qualifier {
                return None;
            }
            let _type = tokens.next()?;
            let name = tokens.next()?;
            Some(name.split('[').next().unwrap_or(name).to_string())
        })
        .collect()
}
