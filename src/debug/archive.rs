use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use parking_lot::Mutex;
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::debug::error::ArchiveError;
use crate::debug::naming::{entry_path, session_name, GRAPH_EXTENSION, STEP_LOG_EXTENSION};
use crate::debug::step_log::StepLog;

/// One debug session: a zip file that entries are appended to as the process runs.
///
/// All methods take `&self` and serialize on a single lock, so an archive can be
/// shared across threads behind an `Arc`. Every entry is flushed and synced to
/// disk as soon as it is written. If the process dies before [`close`], the
/// central directory is missing but the entry bytes already on disk are intact.
///
/// [`close`]: DebugArchive::close
pub struct DebugArchive {
    name: String,
    path: PathBuf,
    inner: Mutex<ArchiveInner>,
}

struct ArchiveInner {
    step: u64,
    /// `None` once the archive has been closed.
    open: Option<OpenArchive>,
}

struct OpenArchive {
    /// Shares its descriptor with the zip writer; kept for `sync_data`.
    file: File,
    zip: ZipWriter<File>,
}

impl DebugArchive {
    /// Create a new session archive in `dir`, creating the directory if needed.
    ///
    /// The file is named after the current time and opened with create-new
    /// semantics: an existing file with the same name is an error, never
    /// overwritten.
    pub fn create(dir: &Path) -> Result<Self, ArchiveError> {
        Self::create_at(dir, &Local::now())
    }

    /// Like [`create`](DebugArchive::create), with the session named after `at`.
    pub fn create_at<Tz>(dir: &Path, at: &DateTime<Tz>) -> Result<Self, ArchiveError>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        std::fs::create_dir_all(dir).map_err(|source| ArchiveError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let name = session_name(at);
        let path = dir.join(&name);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => ArchiveError::AlreadyExists(path.clone()),
                _ => ArchiveError::Io(e),
            })?;
        let archive = Self::from_file(name, path, file)?;
        tracing::debug!(session = %archive.name, path = %archive.path.display(), "Created debug archive");
        Ok(archive)
    }

    fn from_file(name: String, path: PathBuf, file: File) -> Result<Self, ArchiveError> {
        let zip = ZipWriter::new(file.try_clone()?);
        Ok(Self {
            name,
            path,
            inner: Mutex::new(ArchiveInner {
                step: 0,
                open: Some(OpenArchive { file, zip }),
            }),
        })
    }

    /// Session name, which is also the archive's file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of steps handed out so far.
    pub fn steps(&self) -> u64 {
        self.inner.lock().step
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().open.is_none()
    }

    /// Append a rendered graph as `debug/<step>-<label>.dot`.
    pub fn append_graph(&self, label: &str, rendered: &str) -> Result<(), ArchiveError> {
        self.append(label, Some(GRAPH_EXTENSION), rendered.as_bytes())
    }

    /// Append raw bytes as `debug/<step>-<label>`.
    pub fn append_blob(&self, label: &str, data: &[u8]) -> Result<(), ArchiveError> {
        self.append(label, None, data)
    }

    /// Reserve the next step for a log that is written now and committed later.
    ///
    /// The entry is named when the sink is created, so it sorts before anything
    /// appended after this call even if the sink is closed last. Returns a
    /// disabled sink once the archive is closed.
    pub fn new_step_log(self: &Arc<Self>, label: &str) -> StepLog {
        let mut inner = self.inner.lock();
        if inner.open.is_none() {
            return StepLog::disabled();
        }
        let path = entry_path(inner.step, label, Some(STEP_LOG_EXTENSION));
        inner.step += 1;
        StepLog::new(path, Arc::downgrade(self))
    }

    /// Write the central directory and close the file.
    ///
    /// Later calls, and appends after close, are no-ops.
    pub fn close(&self) -> Result<(), ArchiveError> {
        let mut inner = self.inner.lock();
        let Some(open) = inner.open.take() else {
            return Ok(());
        };
        let steps = inner.step;
        open.finish()?;
        tracing::debug!(session = %self.name, steps, "Closed debug archive");
        Ok(())
    }

    fn append(&self, label: &str, ext: Option<&str>, data: &[u8]) -> Result<(), ArchiveError> {
        let mut inner = self.inner.lock();
        let ArchiveInner { step, open } = &mut *inner;
        let Some(open) = open.as_mut() else {
            return Ok(());
        };

        // The step is consumed even if the write below fails.
        let path = entry_path(*step, label, ext);
        *step += 1;

        open.write_entry(&path, data)?;
        tracing::debug!(session = %self.name, path = %path, bytes = data.len(), "Appended debug entry");
        Ok(())
    }

    /// Write an entry whose name was fixed earlier by [`new_step_log`].
    ///
    /// [`new_step_log`]: DebugArchive::new_step_log
    pub(crate) fn commit_entry(&self, path: &str, data: &[u8]) -> Result<(), ArchiveError> {
        let mut inner = self.inner.lock();
        let Some(open) = inner.open.as_mut() else {
            return Ok(());
        };
        open.write_entry(path, data)?;
        tracing::debug!(session = %self.name, path = %path, bytes = data.len(), "Committed step log");
        Ok(())
    }
}

impl OpenArchive {
    fn write_entry(&mut self, path: &str, data: &[u8]) -> Result<(), ArchiveError> {
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        let written = self
            .zip
            .start_file(path, options)
            .map_err(ArchiveError::from)
            .and_then(|()| self.zip.write_all(data).map_err(ArchiveError::from));

        // Sync even after a failed write so earlier entries stay recoverable.
        let synced = self.sync();
        written.and(synced)
    }

    fn sync(&mut self) -> Result<(), ArchiveError> {
        self.zip.flush()?;
        self.file.sync_data()?;
        Ok(())
    }

    fn finish(mut self) -> Result<(), ArchiveError> {
        let mut file = self.zip.finish()?;
        file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}

impl Drop for DebugArchive {
    fn drop(&mut self) {
        let Some(open) = self.inner.get_mut().open.take() else {
            return;
        };
        tracing::warn!(session = %self.name, "Debug archive dropped without close");
        if let Err(e) = open.finish() {
            tracing::warn!(session = %self.name, error = %e, "Failed to finalize debug archive");
        }
    }
}

impl fmt::Debug for DebugArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugArchive")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Handle to the current debug session, or to nothing when debugging is off.
///
/// Every operation is defined on the disabled handle as a silent no-op, so
/// callers never need to check whether diagnostics are enabled.
#[derive(Debug, Clone, Default)]
pub struct DebugHandle(Option<Arc<DebugArchive>>);

impl DebugHandle {
    /// Start a new session archive in `dir`.
    pub fn create(dir: &Path) -> Result<Self, ArchiveError> {
        Ok(Self(Some(Arc::new(DebugArchive::create(dir)?))))
    }

    pub fn disabled() -> Self {
        Self(None)
    }

    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    pub fn archive(&self) -> Option<&Arc<DebugArchive>> {
        self.0.as_ref()
    }

    pub fn append_graph(&self, label: &str, rendered: &str) -> Result<(), ArchiveError> {
        match &self.0 {
            Some(archive) => archive.append_graph(label, rendered),
            None => Ok(()),
        }
    }

    pub fn append_blob(&self, label: &str, data: &[u8]) -> Result<(), ArchiveError> {
        match &self.0 {
            Some(archive) => archive.append_blob(label, data),
            None => Ok(()),
        }
    }

    pub fn new_step_log(&self, label: &str) -> StepLog {
        match &self.0 {
            Some(archive) => archive.new_step_log(label),
            None => StepLog::disabled(),
        }
    }

    pub fn close(&self) -> Result<(), ArchiveError> {
        match &self.0 {
            Some(archive) => archive.close(),
            None => Ok(()),
        }
    }
}

impl From<DebugArchive> for DebugHandle {
    fn from(archive: DebugArchive) -> Self {
        Self(Some(Arc::new(archive)))
    }
}
