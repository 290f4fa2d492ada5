// src/store.rs

use crate::error::{OplError, Result};
use crate::models::{LogEntry, Schema};
use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Commands that are too common to be worth logging. Matched as a prefix of the first word.
const NOISE_COMMANDS: &[&str] = &[
    "alias", "cd", "chmod", "chown", "cp", "exit", "find", "id", "kill", "ls", "locate", "make",
    "man", "mkdir", "mv", "nano", "opl", "ps", "pwd", "uname", "vim", "which", "whoami",
];

/// Result of a successful `append`.
#[derive(Debug, PartialEq, Eq)]
pub enum AppendOutcome {
    Recorded(PathBuf),
    Filtered,
}

/// Day-file store for a single schema.
#[derive(Debug, Clone)]
pub struct EntryStore {
    folder: PathBuf,
    schema: Schema,
}

impl EntryStore {
    /// Creates the folder if it is missing.
    pub fn open(folder: impl Into<PathBuf>, schema: Schema) -> Result<Self> {
        let folder = folder.into();
        if !folder.exists() {
            fs::create_dir_all(&folder)?;
        }
        Ok(EntryStore { folder, schema })
    }

    /// `<folder>/<YYYY-MM-DD>.json` for the day the entry was recorded.
    pub fn day_file(&self, entry: &LogEntry) -> Result<PathBuf> {
        let day = entry.day().ok_or_else(|| {
            OplError::InvalidInput(format!("Timestamp {:?} has no date prefix", entry.date))
        })?;
        Ok(self.folder.join(format!("{}.json", day)))
    }

    /// Read-modify-write of the entry's day file. There is no file locking.
    pub fn append(&self, entry: &LogEntry) -> Result<AppendOutcome> {
        if self.schema == Schema::Command && is_noise(&entry.text) {
            tracing::debug!(command = %entry.text, "command matched noise filter, not logged");
            return Ok(AppendOutcome::Filtered);
        }

        let path = self.day_file(entry)?;
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let mut raw = Vec::new();
        file.read_to_end(&mut raw)?;
        let mut entries = if raw.iter().all(u8::is_ascii_whitespace) {
            Vec::new()
        } else {
            self.schema
                .decode(&raw)
                .map_err(|source| OplError::CorruptLog {
                    path: path.clone(),
                    source,
                })?
        };
        entries.push(entry.clone());

        let encoded = self.schema.encode(&entries)?;
        file.seek(SeekFrom::Start(0))?;
        file.set_len(0)?;
        file.write_all(encoded.as_bytes())?;
        file.flush()?;

        tracing::debug!(path = %path.display(), count = entries.len(), "entry appended");
        Ok(AppendOutcome::Recorded(path))
    }
}

/// True when the first word of `command` starts with a denylisted command.
pub fn is_noise(command: &str) -> bool {
    command
        .split_whitespace()
        .next()
        .is_some_and(|first| NOISE_COMMANDS.iter().any(|noise| first.starts_with(noise)))
}

/// Collects entries from a single day file or every file under a folder.
///
/// Each file is decoded as whichever schema it was written in; `only` drops files of the
/// other schema. Files are visited in filesystem order, symlinks followed, and concatenated
/// as found; nothing is sorted. Files that are not valid logs are skipped with a warning.
pub fn read_all(path: &Path, only: Option<Schema>) -> Result<Vec<LogEntry>> {
    if !path.exists() {
        return Err(OplError::LocationNotFound(path.to_path_buf()));
    }

    let mut logs = Vec::new();
    for item in WalkDir::new(path).follow_links(true) {
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable path");
                continue;
            }
        };
        if !item.file_type().is_file() {
            continue;
        }

        let file_path = item.path();
        let raw = match fs::read(file_path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(path = %file_path.display(), error = %e, "could not read log file");
                continue;
            }
        };
        match Schema::detect(&raw) {
            Ok((schema, entries)) if only.map_or(true, |want| want == schema) => {
                logs.extend(entries)
            }
            Ok((schema, _)) => {
                tracing::debug!(path = %file_path.display(), schema = schema.name(), "skipping log of other schema");
            }
            Err(e) => {
                tracing::warn!(path = %file_path.display(), error = %e, "not a valid opl log file");
            }
        }
    }
    Ok(logs)
}

/// Stable sort by timestamp. Only used when the caller asks for it.
pub fn sort_chronologically(entries: &mut [LogEntry]) {
    entries.sort_by(|a, b| a.date.cmp(&b.date));
}
