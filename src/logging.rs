// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

//! Asynchronous log sink.
//!
//! Records are formatted on the calling thread and queued to a single
//! worker that writes them to the console and to `latest.log`. The queue
//! is bounded; when it is full, logging blocks instead of dropping records.

use chrono::{Local, NaiveDateTime};
use crossbeam::channel::{self, Receiver, Sender};
use log::{Level, LevelFilter, Log, Metadata, Record};
use simple_logger::SimpleLogger;
use std::{
    fs::{self, File},
    io::{self, LineWriter, Write},
    path::PathBuf,
    thread,
};
use thiserror::Error;

use crate::*;

/// Records that may wait in the queue before callers block.
pub const QUEUE_CAPACITY: usize = 8192;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Logger already installed: {0}")]
    SetLogger(#[from] log::SetLoggerError),
    #[error("Failed to start log worker: {0}")]
    Worker(#[from] io::Error),
}

/// One record, formatted and detached from the caller's borrows.
#[derive(Debug)]
struct Entry {
    level: Level,
    target: String,
    file: Option<String>,
    line: Option<u32>,
    formatted: String,
    message: String,
}

enum Message {
    Entry(Entry),
    Flush(Sender<()>),
}

pub struct AsyncLogger {
    level: LevelFilter,
    sender: Sender<Message>,
}

impl AsyncLogger {
    /// Starts the worker. `console` echoes records, `file` receives the
    /// formatted lines.
    pub fn new(
        level: LevelFilter,
        console: Option<Box<dyn Log>>,
        file: Option<Box<dyn Write + Send>>,
    ) -> Result<Self, LoggingError> {
        let (sender, receiver) = channel::bounded(QUEUE_CAPACITY);

        thread::Builder::new()
            .name(format!("{APP_NAME}-log"))
            .spawn(move || run_worker(receiver, console, file))?;

        Ok(Self { level, sender })
    }
}

impl Log for AsyncLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let file = record.file().unwrap_or("?");
        let line = record.line().unwrap_or(0);
        let message = record.args().to_string();
        let entry = Entry {
            level: record.level(),
            target: record.target().to_string(),
            file: record.file().map(str::to_string),
            line: record.line(),
            formatted: format_line(
                &Local::now().naive_local(),
                record.level(),
                file,
                line,
                &message,
            ),
            // The console backend prints the target but not the source location.
            message: format!("{file}:{line}: {message}"),
        };

        // Blocks while the queue is full. Fails only once the worker is gone.
        let _ = self.sender.send(Message::Entry(entry));
    }

    /// Waits until every record queued before this call has been written.
    fn flush(&self) {
        let (ack, done) = channel::bounded(1);
        if self.sender.send(Message::Flush(ack)).is_ok() {
            let _ = done.recv();
        }
    }
}

fn run_worker(
    receiver: Receiver<Message>,
    console: Option<Box<dyn Log>>,
    mut file: Option<Box<dyn Write + Send>>,
) {
    for message in receiver {
        match message {
            Message::Entry(entry) => {
                if let Some(console) = &console {
                    console.log(
                        &Record::builder()
                            .args(format_args!("{}", entry.message))
                            .level(entry.level)
                            .target(&entry.target)
                            .file(entry.file.as_deref())
                            .line(entry.line)
                            .build(),
                    );
                }
                if let Some(writer) = file.as_mut() {
                    if writeln!(writer, "{}", entry.formatted).is_err() {
                        file = None;
                    }
                }
            }
            Message::Flush(ack) => {
                if let Some(console) = &console {
                    console.flush();
                }
                if let Some(writer) = file.as_mut() {
                    let _ = writer.flush();
                }
                let _ = ack.send(());
            }
        }
    }
}

/// `[2025.01.31 12:34:56.789][INFO][src/app.rs:42: message]`
pub fn format_line(
    time: &NaiveDateTime,
    level: Level,
    file: &str,
    line: u32,
    message: &str,
) -> String {
    format!(
        "[{}][{level}][{file}:{line}: {message}]",
        time.format("%Y.%m.%d %H:%M:%S%.3f")
    )
}

/// `Debug` in debug builds and `Info` in release; `Trace` when verbose.
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Trace
    } else if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Directory holding `latest.log`.
pub fn log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
}

/// Installs the asynchronous logger as the global `log` backend.
///
/// `latest.log` is truncated on every start. If it cannot be created,
/// logging continues on the console only.
pub fn init_logging(level: LevelFilter) -> Result<(), LoggingError> {
    let path = log_dir().join("latest.log");
    let file = fs::create_dir_all(log_dir())
        .and_then(|()| File::create(&path))
        .map(|file| Box::new(LineWriter::new(file)) as Box<dyn Write + Send>);

    let (file, file_error) = match file {
        Ok(file) => (Some(file), None),
        Err(err) => (None, Some(err)),
    };

    let console: Box<dyn Log> = Box::new(SimpleLogger::new().with_level(level));
    let logger = AsyncLogger::new(level, Some(console), file)?;
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);

    match file_error {
        None => log::debug!("Logging to {}", path.display()),
        Some(err) => log::warn!("Cannot write {}: {err}", path.display()),
    }
    Ok(())
}
