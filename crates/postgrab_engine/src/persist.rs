use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempPath};
use thiserror::Error;

use crate::filename::{truncate_on_char_boundary, MAX_FILENAME_BYTES};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Image names are fixed per post; a re-run replaces them.
        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// Moves `temp` to `destination` without ever replacing an existing file.
///
/// When the name is taken, `<stem>_(1).<ext>`, `<stem>_(2).<ext>`, ... are tried
/// in order and the first free one is used. Returns the path actually written.
pub fn persist_without_clobber(temp: TempPath, destination: &Path) -> Result<PathBuf, PersistError> {
    let mut temp = temp;
    let mut candidate = destination.to_path_buf();
    let mut suffix: u32 = 0;
    loop {
        match temp.persist_noclobber(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                temp = err.path;
                suffix += 1;
                candidate = numbered_path(destination, suffix);
            }
            Err(err) => return Err(PersistError::Io(err.error)),
        }
    }
}

/// `dir/name.ext` -> `dir/name_(n).ext`
///
/// The stem is shortened when needed so the numbered name still fits in 255 bytes.
pub fn numbered_path(path: &Path, n: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tail = match path.extension() {
        Some(ext) => format!("_({n}).{}", ext.to_string_lossy()),
        None => format!("_({n})"),
    };
    let budget = MAX_FILENAME_BYTES.saturating_sub(tail.len());
    path.with_file_name(format!("{}{}", truncate_on_char_boundary(&stem, budget), tail))
}
