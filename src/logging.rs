//! Tracing setup.
//!
//! The interactive menu owns the whole terminal, so nothing is written to
//! stderr unless `RUST_LOG` asks for it. Debug output goes to a log file
//! instead, opened once settings are known.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

type Slot = Arc<Mutex<Option<File>>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Option<File>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A `MakeWriter` that swallows everything until a file is attached through
/// its [`LogFileHandle`].
#[derive(Clone, Default)]
pub struct LogFileWriter {
    slot: Slot,
}

/// Attaches the destination file to a [`LogFileWriter`].
#[derive(Clone)]
pub struct LogFileHandle {
    slot: Slot,
}

impl LogFileWriter {
    pub fn new() -> (Self, LogFileHandle) {
        let slot = Slot::default();
        (Self { slot: slot.clone() }, LogFileHandle { slot })
    }
}

impl LogFileHandle {
    /// Open `path` for appending; later events land there.
    pub fn attach(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        *lock(&self.slot) = Some(file);
        Ok(())
    }
}

pub struct LogFileGuard {
    slot: Slot,
}

impl Write for LogFileGuard {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match lock(&self.slot).as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match lock(&self.slot).as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for LogFileWriter {
    type Writer = LogFileGuard;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileGuard {
            slot: self.slot.clone(),
        }
    }
}

/// Install the global subscriber: stderr filtered by `RUST_LOG` (off by
/// default) plus the deferred file layer at `ssh_parallels=debug`.
pub fn init() -> LogFileHandle {
    let terminal_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    let terminal_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(terminal_filter);

    let (file_writer, handle) = LogFileWriter::new();
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer)
        .with_filter(EnvFilter::new("ssh_parallels=debug"));

    tracing_subscriber::registry()
        .with(terminal_layer)
        .with(file_layer)
        .init();

    handle
}
