//! Append-only journal of list mutations
//!
//! One JSON line per add/remove. Replaying the file in order rebuilds the
//! lists; a damaged final line (torn write) is dropped and cut off.

use crate::error::{ListStoreError, Result};
use crate::types::ListMutation;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

pub struct ListJournal {
    path: PathBuf,
    file: File,
    sync_writes: bool,
}

impl ListJournal {
    /// Open the journal, returning it together with the mutations already in it
    pub fn open(path: &Path, sync_writes: bool) -> Result<(Self, Vec<ListMutation>)> {
        let (mutations, valid_len, needs_newline) = replay(path)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if file.metadata()?.len() > valid_len {
            file.set_len(valid_len)?;
        }
        if needs_newline {
            file.write_all(b"\n")?;
        }

        let journal = Self {
            path: path.to_path_buf(),
            file,
            sync_writes,
        };
        Ok((journal, mutations))
    }

    pub fn append(&mut self, mutation: &ListMutation) -> Result<()> {
        let mut line = serde_json::to_vec(mutation)?;
        line.push(b'\n');
        let sync_writes = self.sync_writes;
        write_or_rollback(&mut self.file, |file| {
            file.write_all(&line)?;
            if sync_writes {
                file.sync_data()?;
            }
            Ok(())
        })?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parsed mutations, byte length of the intact prefix, and whether that
/// prefix lacks a trailing newline
fn replay(path: &Path) -> Result<(Vec<ListMutation>, u64, bool)> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok((Vec::new(), 0, false)),
        Err(e) => return Err(e.into()),
    };

    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let last = lines.len().saturating_sub(1);

    let mut mutations = Vec::with_capacity(lines.len());
    let mut offset = 0usize;
    let mut valid_len = 0usize;
    for (n, line) in lines.iter().enumerate() {
        offset += line.len();
        let trimmed = line.trim();
        if trimmed.is_empty() {
            valid_len = offset;
            continue;
        }
        match serde_json::from_str::<ListMutation>(trimmed) {
            Ok(mutation) => {
                mutations.push(mutation);
                valid_len = offset;
            }
            Err(e) if n == last => {
                warn!("Dropping damaged list journal tail at line {}: {}", n + 1, e);
            }
            Err(e) => {
                return Err(ListStoreError::Storage(format!(
                    "journal {:?} line {} unreadable: {}",
                    path,
                    n + 1,
                    e
                )));
            }
        }
    }

    let needs_newline = valid_len > 0 && !content[..valid_len].ends_with('\n');
    Ok((mutations, valid_len as u64, needs_newline))
}

/// Run `write`, cutting the file back to its previous length on failure
fn write_or_rollback(
    file: &mut File,
    write: impl FnOnce(&mut File) -> std::io::Result<()>,
) -> std::io::Result<()> {
    let start = file.metadata()?.len();
    if let Err(e) = write(file) {
        if let Err(truncate) = file.set_len(start) {
            tracing::error!(
                "List journal rollback to {} bytes failed after write error {}: {}",
                start,
                e,
                truncate
            );
        }
        return Err(e);
    }
    Ok(())
}
