// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shader text on disk.
//!
//! Writes never lose the previous file: an existing target is copied to
//! `<file>.tmp` first and restored from it if the write fails. The copy is
//! removed once the target holds either the new or the restored text; if the
//! restore fails too, the copy is left in place.

use std::{
    ffi::OsString,
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::renderer::shader::ShaderStage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File path is empty")]
    EmptyPath,
    #[error("Refusing to write empty text to {0}")]
    EmptyText(PathBuf),
    #[error("Invalid shader name '{0}'")]
    InvalidName(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub fn read_text_file(path: &Path) -> Result<String, StorageError> {
    if path.as_os_str().is_empty() {
        return Err(StorageError::EmptyPath);
    }
    fs::read_to_string(path).map_err(|err| StorageError::io(path, err))
}

/// Replaces the contents of `path` with `text`, creating parent directories.
///
/// Empty text is rejected so a cleared editor never truncates a shader.
pub fn write_text_file(path: &Path, text: &str) -> Result<(), StorageError> {
    write_with_backup(path, text, |path, text| fs::write(path, text))
}

pub(crate) fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

pub(crate) fn write_with_backup<W>(path: &Path, text: &str, write: W) -> Result<(), StorageError>
where
    W: FnOnce(&Path, &str) -> io::Result<()>,
{
    if path.as_os_str().is_empty() {
        return Err(StorageError::EmptyPath);
    }
    if text.is_empty() {
        return Err(StorageError::EmptyText(path.to_path_buf()));
    }

    let backup = if path.is_file() {
        let backup = backup_path(path);
        fs::copy(path, &backup).map_err(|err| StorageError::io(&backup, err))?;
        Some(backup)
    } else {
        None
    };

    let result = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|err| StorageError::io(dir, err))
        }
        _ => Ok(()),
    }
    .and_then(|()| write(path, text).map_err(|err| StorageError::io(path, err)));

    if let Some(backup) = backup {
        let target_intact = match &result {
            Ok(()) => true,
            Err(_) => match fs::copy(&backup, path) {
                Ok(_) => true,
                Err(err) => {
                    log::error!(
                        "Failed to restore {} from backup: {err}; previous text kept in {}",
                        path.display(),
                        backup.display()
                    );
                    false
                }
            },
        };
        if target_intact {
            if let Err(err) = fs::remove_file(&backup) {
                log::warn!("Failed to remove backup {}: {err}", backup.display());
            }
        }
    }

    if let Err(err) = &result {
        log::error!("{err}");
    }
    result
}

/// Where the default, latest and saved shaders live under one root.
///
/// ```text
/// <root>/default/default_vertex.glsl
/// <root>/default/default_fragment.glsl
/// <root>/latest_fragment.glsl
/// <root>/latest_vertex.glsl
/// <root>/<name>/<name>_fragment.glsl
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderStore {
    root: PathBuf,
}

impl ShaderStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn default_path(&self, stage: ShaderStage) -> PathBuf {
        self.root
            .join("default")
            .join(format!("default_{}.glsl", stage.name()))
    }

    pub fn latest_path(&self, stage: ShaderStage) -> PathBuf {
        self.root.join(format!("latest_{}.glsl", stage.name()))
    }

    /// Path a fragment shader saved under `name` is written to.
    pub fn save_as_path(&self, name: &str) -> Result<PathBuf, StorageError> {
        let name = validate_name(name)?;
        Ok(self
            .root
            .join(name)
            .join(format!("{name}_{}.glsl", ShaderStage::Fragment.name())))
    }
}

fn validate_name(name: &str) -> Result<&str, StorageError> {
    let trimmed = name.trim();
    let is_valid = !trimmed.is_empty()
        && trimmed != "."
        && trimmed != ".."
        && !trimmed.contains(['/', '\\', '\0']);
    if is_valid {
        Ok(trimmed)
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}
