//! Event Sinks
//!
//! Append-only JSONL logging plus in-memory and discarding sinks.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use dialogue_events::DialogueEvent;

/// Destination for dialogue events.
///
/// A failing sink never aborts a simulation step; the simulator logs the
/// error and carries on.
pub trait EventSink {
    fn record(&mut self, event: &DialogueEvent) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writes one JSON object per line
pub struct JsonlEventLogger {
    writer: Option<BufWriter<File>>,
    event_count: u64,
}

impl JsonlEventLogger {
    /// Create a logger writing to `path`, truncating any previous log
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            event_count: 0,
        })
    }

    /// Create a logger that counts events without writing them
    pub fn null() -> Self {
        Self {
            writer: None,
            event_count: 0,
        }
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }
}

impl EventSink for JsonlEventLogger {
    fn record(&mut self, event: &DialogueEvent) -> io::Result<()> {
        self.event_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = event.to_jsonl()?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for JsonlEventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(error = %e, "failed to flush event log");
        }
    }
}

/// Keeps events in memory. Clones share the same buffer, so a test can hand
/// one clone to the simulator and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<DialogueEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<DialogueEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> Vec<DialogueEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn drain(&self) -> Vec<DialogueEvent> {
        std::mem::take(&mut *self.lock())
    }
}

impl EventSink for MemorySink {
    fn record(&mut self, event: &DialogueEvent) -> io::Result<()> {
        self.lock().push(event.clone());
        Ok(())
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _event: &DialogueEvent) -> io::Result<()> {
        Ok(())
    }
}
