//! Record storage
//!
//! In-memory index of intercept records, optionally backed by an append-only
//! JSON-lines journal. Every change appends a full snapshot of the record;
//! replay keeps the last snapshot per request id and the order in which
//! request ids first appeared.
//!
//! Storage is owned by the ledger actor and never shared, so it needs no
//! locking of its own.

use crate::{
    config::LedgerConfig,
    error::{Error, Result},
    types::InterceptRecord,
};
use risk_engine::RequestId;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only journal file
struct Journal {
    path: PathBuf,
    file: File,
    sync_writes: bool,
}

/// What replay found in an existing journal
struct Replayed {
    records: Vec<InterceptRecord>,
    /// Byte length of the intact prefix
    valid_len: u64,
    /// Intact prefix does not end with a newline
    needs_newline: bool,
}

impl Journal {
    /// Open for appending, cutting the file back to its intact prefix
    fn open(path: &Path, sync_writes: bool, replayed: &Replayed) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if file.metadata()?.len() > replayed.valid_len {
            file.set_len(replayed.valid_len)?;
        }
        if replayed.needs_newline {
            file.write_all(b"\n")?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            file,
            sync_writes,
        })
    }

    fn append(&mut self, record: &InterceptRecord) -> Result<()> {
        let mut line = serde_json::to_vec(record)?;
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

    /// Read every snapshot in the journal. A damaged final line (torn write)
    /// is dropped; damage anywhere else is an error.
    fn replay(path: &Path) -> Result<Replayed> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Replayed {
                    records: Vec::new(),
                    valid_len: 0,
                    needs_newline: false,
                })
            }
            Err(e) => return Err(e.into()),
        };

        let lines: Vec<&str> = content.split_inclusive('\n').collect();
        let last = lines.len().saturating_sub(1);

        let mut records = Vec::with_capacity(lines.len());
        let mut offset = 0usize;
        let mut valid_len = 0usize;
        for (n, line) in lines.iter().enumerate() {
            offset += line.len();
            let trimmed = line.trim();
            if trimmed.is_empty() {
                valid_len = offset;
                continue;
            }
            match serde_json::from_str::<InterceptRecord>(trimmed) {
                Ok(record) => {
                    records.push(record);
                    valid_len = offset;
                }
                Err(e) if n == last => {
                    tracing::warn!("Dropping damaged journal tail at line {}: {}", n + 1, e);
                }
                Err(e) => {
                    return Err(Error::Storage(format!(
                        "journal {:?} line {} unreadable: {}",
                        path,
                        n + 1,
                        e
                    )));
                }
            }
        }

        Ok(Replayed {
            records,
            valid_len: valid_len as u64,
            needs_newline: valid_len > 0 && !content[..valid_len].ends_with('\n'),
        })
    }
}

/// Run `write` against the journal, cutting the file back to its previous
/// length if it fails. A partial line left behind would otherwise be glued to
/// the next append and poison every later replay.
fn write_or_rollback(
    file: &mut File,
    write: impl FnOnce(&mut File) -> std::io::Result<()>,
) -> std::io::Result<()> {
    let start = file.metadata()?.len();
    if let Err(e) = write(file) {
        if let Err(truncate) = file.set_len(start) {
            tracing::error!(
                "Journal rollback to {} bytes failed after write error {}: {}",
                start,
                e,
                truncate
            );
        }
        return Err(e);
    }
    Ok(())
}

/// Intercept record storage
pub struct Storage {
    records: HashMap<RequestId, InterceptRecord>,

    /// Request ids in creation order
    order: Vec<RequestId>,

    journal: Option<Journal>,
}

impl Storage {
    /// Memory-only storage
    pub fn in_memory() -> Self {
        Self {
            records: HashMap::new(),
            order: Vec::new(),
            journal: None,
        }
    }

    /// Open storage per configuration, replaying the journal if one is set
    pub fn open(config: &LedgerConfig) -> Result<Self> {
        let mut storage = Self::in_memory();

        let Some(path) = config.journal_path.as_deref() else {
            return Ok(storage);
        };

        let mut replayed = Journal::replay(path)?;
        let entries = replayed.records.len();
        for record in std::mem::take(&mut replayed.records) {
            storage.index(record);
        }

        tracing::info!(
            "Replayed {} journal entries into {} records from {:?}",
            entries,
            storage.records.len(),
            path
        );

        storage.journal = Some(Journal::open(path, config.sync_writes, &replayed)?);
        Ok(storage)
    }

    /// Write a record snapshot (journal first, then index)
    pub fn put(&mut self, record: InterceptRecord) -> Result<()> {
        if let Some(journal) = self.journal.as_mut() {
            journal.append(&record)?;
        }
        self.index(record);
        Ok(())
    }

    /// Get record by request id
    pub fn get(&self, request_id: &RequestId) -> Option<&InterceptRecord> {
        self.records.get(request_id)
    }

    /// Newest records first, by creation order
    pub fn recent(&self, limit: usize) -> Vec<InterceptRecord> {
        self.order
            .iter()
            .rev()
            .filter_map(|id| self.records.get(id))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether storage holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Journal location, if any
    pub fn journal_path(&self) -> Option<&Path> {
        self.journal.as_ref().map(|j| j.path.as_path())
    }

    fn index(&mut self, record: InterceptRecord) {
        if !self.records.contains_key(&record.request_id) {
            self.order.push(record.request_id.clone());
        }
        self.records.insert(record.request_id.clone(), record);
    }
}
