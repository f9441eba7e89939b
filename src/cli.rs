// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command-line interface and startup configuration.
//!
//! Arguments are parsed before logging starts so `--verbose` can pick the
//! log level; settings are resolved afterwards so loading them is logged.

use std::{ffi::OsString, path::PathBuf};

use clap::{Arg, ArgAction, ArgMatches, Command};
use thiserror::Error;

use crate::{settings::*, *};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Clap(#[from] clap::Error),
}

/// Raw command-line arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// Fragment shader opened as the initial text.
    pub fragment: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub shader_dir: Option<PathBuf>,
    pub paused: bool,
    pub no_ui: bool,
    pub verbose: bool,
}

impl CliArgs {
    /// Overrides the settings given on the command line.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(dir) = &self.shader_dir {
            settings.shader_dir = dir.clone();
        }
        if self.paused {
            settings.start_playing = false;
        }
        if self.no_ui {
            settings.show_ui = false;
        }
    }
}

/// Resolved startup configuration.
#[derive(Debug)]
pub struct CliConfig {
    pub settings: Settings,
    pub fragment: Option<PathBuf>,
}

fn command() -> Command {
    Command::new(APP_NAME)
        .author(APP_AUTHOR)
        .version(APP_SEMVER)
        .about(APP_ABOUT)
        .arg(
            Arg::new("fragment")
                .value_name("FRAGMENT")
                .help("Fragment shader to open instead of the last edited one")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Settings file to use instead of the per-user config.toml")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("shader-dir")
                .long("shader-dir")
                .value_name("DIR")
                .help("Directory holding the default, latest and saved shaders")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("paused")
                .long("paused")
                .help("Start with the scene paused")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-ui")
                .long("no-ui")
                .help("Start with the editor hidden")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log everything, including per-frame traces")
                .action(ArgAction::SetTrue),
        )
        .after_help(
            "Hotkeys: Ctrl+Space play/pause, Ctrl+H toggle editor, \
             Ctrl+S save as, Ctrl+Q save and quit",
        )
}

fn from_matches(matches: &ArgMatches) -> CliArgs {
    CliArgs {
        fragment: matches.get_one::<PathBuf>("fragment").cloned(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        shader_dir: matches.get_one::<PathBuf>("shader-dir").cloned(),
        paused: matches.get_flag("paused"),
        no_ui: matches.get_flag("no-ui"),
        verbose: matches.get_flag("verbose"),
    }
}

pub fn parse_args() -> Result<CliArgs, CliError> {
    parse_from(std::env::args_os())
}

pub fn parse_from<I, T>(args: I) -> Result<CliArgs, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;
    Ok(from_matches(&matches))
}

/// Loads settings and applies the command-line overrides.
///
/// A `FRAGMENT` that is not a readable file is dropped with a warning.
pub fn resolve(args: &CliArgs) -> CliConfig {
    let mut settings = Settings::load(args.config.as_deref());
    args.apply(&mut settings);

    let fragment = args.fragment.clone().filter(|path| {
        let exists = path.is_file();
        if !exists {
            log::warn!("File not found: {}", path.display());
        }
        exists
    });

    CliConfig { settings, fragment }
}
