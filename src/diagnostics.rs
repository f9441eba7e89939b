// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

//! Turns driver compile logs into line-addressed messages.
//!
//! Recognized forms:
//!
//! ```text
//! 0:12(5): error: syntax error, unexpected '}'      Mesa
//! 0(12) : error C0000: syntax error, unexpected '}' NVIDIA
//! ERROR: 0:12: '}' : syntax error                   AMD, Intel
//! ```
//!
//! Lines in any other shape are kept as unaddressed notes.

use regex::Regex;
use std::{collections::BTreeSet, fmt, sync::LazyLock};

static MESA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d+:(\d+)\((\d+)\)\s*:\s*(error|warning|info)\s*:\s*(.*)$")
        .expect("static pattern")
});

static NVIDIA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d+\((\d+)\)\s*:\s*(error|warning)\s*(?:[A-Z]\d+)?\s*:\s*(.*)$")
        .expect("static pattern")
});

static KHRONOS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(ERROR|WARNING)\s*:\s*\d+:(\d+)\s*:\s*(.*)$").expect("static pattern")
});

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl Severity {
    fn parse(text: &str) -> Self {
        match text.to_ascii_lowercase().as_str() {
            "error" => Severity::Error,
            "warning" => Severity::Warning,
            _ => Severity::Note,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based source line, if the driver gave one.
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(f, "{line}:{column}: ")?,
            (Some(line), None) => write!(f, "{line}: ")?,
            _ => {}
        }
        write!(f, "{}: {}", self.severity, self.message)
    }
}

fn parse_line(text: &str) -> Option<Diagnostic> {
    let number = |m: Option<regex::Match>| m.and_then(|m| m.as_str().parse().ok());

    if let Some(caps) = MESA.captures(text) {
        return Some(Diagnostic {
            line: number(caps.get(1)),
            column: number(caps.get(2)),
            severity: Severity::parse(&caps[3]),
            message: caps[4].trim().to_string(),
        });
    }
    if let Some(caps) = NVIDIA.captures(text) {
        return Some(Diagnostic {
            line: number(caps.get(1)),
            column: None,
            severity: Severity::parse(&caps[2]),
            message: caps[3].trim().to_string(),
        });
    }
    if let Some(caps) = KHRONOS.captures(text) {
        return Some(Diagnostic {
            line: number(caps.get(2)),
            column: None,
            severity: Severity::parse(&caps[1]),
            message: caps[3].trim().to_string(),
        });
    }

    let text = text.trim();
    (!text.is_empty()).then(|| Diagnostic {
        line: None,
        column: None,
        severity: Severity::Note,
        message: text.to_string(),
    })
}

pub fn parse(log: &str) -> Vec<Diagnostic> {
    log.lines().filter_map(parse_line).collect()
}

/// Source lines that carry at least one error.
pub fn error_lines(diagnostics: &[Diagnostic]) -> BTreeSet<u32> {
    diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .filter_map(|d| d.line)
        .collect()
}
