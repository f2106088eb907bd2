//! In-memory console

use std::sync::Arc;

use parking_lot::Mutex;

use super::Console;
use crate::level::Channel;
use crate::value::Frozen;

/// One write received by a [`MemoryConsole`]
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Channel that was written to
    pub channel: Channel,
    /// Prefix passed with the write
    pub prefix: String,
    /// Frozen arguments, in call order
    pub args: Vec<Frozen>,
}

/// Console that keeps every write in memory
///
/// Clones share the same buffer, so one handle can be given to a
/// [`Logger`](crate::Logger) and the other kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct MemoryConsole {
    records: Arc<Mutex<Vec<Record>>>,
}

impl MemoryConsole {
    /// Empty console
    pub fn new() -> Self {
        Self::default()
    }

    /// All writes so far
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    /// Writes to `channel` so far
    pub fn records_on(&self, channel: Channel) -> Vec<Record> {
        self.records
            .lock()
            .iter()
            .filter(|record| record.channel == channel)
            .cloned()
            .collect()
    }

    /// Remove and return all writes so far
    pub fn take(&self) -> Vec<Record> {
        std::mem::take(&mut *self.records.lock())
    }

    /// Forget all writes
    pub fn clear(&self) {
        self.records.lock().clear();
    }

    fn push(&self, channel: Channel, prefix: &str, args: &[Frozen]) {
        self.records.lock().push(Record {
            channel,
            prefix: prefix.to_string(),
            args: args.to_vec(),
        });
    }
}

impl Console for MemoryConsole {
    fn log(&self, prefix: &str, args: &[Frozen]) {
        self.push(Channel::Log, prefix, args);
    }

    fn warn(&self, prefix: &str, args: &[Frozen]) {
        self.push(Channel::Warn, prefix, args);
    }

    fn error(&self, prefix: &str, args: &[Frozen]) {
        self.push(Channel::Error, prefix, args);
    }
}
