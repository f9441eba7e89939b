// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

//! Owned, growable shader text edited in place by the UI.

use std::{
    collections::hash_map::DefaultHasher,
    fmt,
    hash::{Hash, Hasher},
};

/// Capacity reserved up front so typical edits never reallocate.
pub const DEFAULT_CAPACITY: usize = 100 * 1024;

/// Editable shader source text.
///
/// The buffer keeps its allocation across [`SourceBuffer::replace`] calls,
/// so the address handed to an editor widget stays stable unless the text
/// outgrows the reserved capacity.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceBuffer {
    text: String,
}

impl SourceBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Overwrites the contents, reusing the existing allocation when possible.
    pub fn replace(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    /// Hash of the current text, used to detect edits between frames.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.text.hash(&mut hasher);
        hasher.finish()
    }
}

impl Default for SourceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<str> for SourceBuffer {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for SourceBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for SourceBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceBuffer")
            .field("len", &self.text.len())
            .field("capacity", &self.text.capacity())
            .finish()
    }
}
