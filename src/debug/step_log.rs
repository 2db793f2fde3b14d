use std::io;
use std::sync::Weak;

use crate::debug::archive::DebugArchive;
use crate::debug::error::ArchiveError;

/// Buffered log for one step of work, committed to the archive as a single entry.
///
/// Writes only touch the local buffer; the archive lock is taken once, at
/// commit. The entry name (and so its position in the session) is fixed when
/// the log is created.
///
/// Use it with `write!`/`writeln!` through [`io::Write`]. A log that is dropped
/// without [`close`] is committed on drop, with failures logged rather than
/// returned.
///
/// [`close`]: StepLog::close
#[derive(Debug, Default)]
pub struct StepLog {
    pending: Option<PendingEntry>,
}

#[derive(Debug)]
struct PendingEntry {
    path: String,
    buf: Vec<u8>,
    archive: Weak<DebugArchive>,
}

impl StepLog {
    pub(crate) fn new(path: String, archive: Weak<DebugArchive>) -> Self {
        Self {
            pending: Some(PendingEntry {
                path,
                buf: Vec::new(),
                archive,
            }),
        }
    }

    /// A log that discards everything written to it.
    pub fn disabled() -> Self {
        Self { pending: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.pending.is_some()
    }

    /// Archive path this log will be committed under.
    pub fn path(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.path.as_str())
    }

    /// Bytes buffered so far.
    pub fn len(&self) -> usize {
        self.pending.as_ref().map_or(0, |p| p.buf.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn write_text(&mut self, text: &str) {
        if let Some(pending) = self.pending.as_mut() {
            pending.buf.extend_from_slice(text.as_bytes());
        }
    }

    /// Commit the buffered contents as one archive entry.
    ///
    /// A no-op for disabled logs, and for logs whose archive is already
    /// closed or gone.
    pub fn close(mut self) -> Result<(), ArchiveError> {
        match self.pending.take() {
            Some(pending) => pending.commit(),
            None => Ok(()),
        }
    }
}

impl PendingEntry {
    fn commit(self) -> Result<(), ArchiveError> {
        match self.archive.upgrade() {
            Some(archive) => archive.commit_entry(&self.path, &self.buf),
            None => Ok(()),
        }
    }
}

impl io::Write for StepLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(pending) = self.pending.as_mut() {
            pending.buf.extend_from_slice(buf);
        }
        // Disabled logs accept and drop everything; `Ok(0)` would make
        // `write_all` fail.
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for StepLog {
    fn drop(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let path = pending.path.clone();
        if let Err(e) = pending.commit() {
            tracing::warn!(path = %path, error = %e, "Failed to commit step log on drop");
        }
    }
}
