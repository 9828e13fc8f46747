//! Storage layer for Ticketdesk data.
//!
//! This module handles persistence of the ticket collection.
//!
//! ## Layout
//!
//! Data lives in `~/.local/share/ticketdesk/<workspace-hash>/` (or under
//! `$TD_DATA_DIR` when set):
//!
//! - `tickets.jsonl` - one ticket per line, newest-first, rewritten in
//!   full after every mutation
//! - `config.kdl` - session preferences (see [`crate::config`])

pub mod backend;

pub use backend::{MemoryBackend, TicketBackend};

use crate::models::Ticket;
use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Environment variable overriding the base data directory.
pub const DATA_DIR_ENV: &str = "TD_DATA_DIR";

const TICKETS_FILE: &str = "tickets.jsonl";
const CONFIG_FILE: &str = "config.kdl";

/// JSONL-file backend for a single workspace.
#[derive(Debug, Clone)]
pub struct FileBackend {
    /// Root directory for this workspace's data
    pub root: PathBuf,
}

impl FileBackend {
    /// Open existing storage for the given workspace.
    pub fn open(workspace: &Path) -> Result<Self> {
        Self::open_at(get_storage_dir(workspace)?)
    }

    /// Initialize storage for a workspace. Safe to call twice.
    pub fn init(workspace: &Path) -> Result<Self> {
        Self::init_at(get_storage_dir(workspace)?)
    }

    /// Check if storage exists for the given workspace.
    pub fn exists(workspace: &Path) -> Result<bool> {
        Ok(get_storage_dir(workspace)?.join(TICKETS_FILE).exists())
    }

    /// Open storage under an explicit base data directory.
    pub fn open_with_data_dir(workspace: &Path, data_dir: &Path) -> Result<Self> {
        Self::open_at(get_storage_dir_with_base(workspace, data_dir)?)
    }

    /// Initialize storage under an explicit base data directory.
    pub fn init_with_data_dir(workspace: &Path, data_dir: &Path) -> Result<Self> {
        Self::init_at(get_storage_dir_with_base(workspace, data_dir)?)
    }

    /// Check for storage under an explicit base data directory.
    pub fn exists_with_data_dir(workspace: &Path, data_dir: &Path) -> Result<bool> {
        Ok(get_storage_dir_with_base(workspace, data_dir)?
            .join(TICKETS_FILE)
            .exists())
    }

    fn open_at(root: PathBuf) -> Result<Self> {
        if !root.join(TICKETS_FILE).exists() {
            return Err(Error::NotInitialized);
        }
        Ok(Self { root })
    }

    fn init_at(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root)?;
        let tickets_path = root.join(TICKETS_FILE);
        if !tickets_path.exists() {
            File::create(&tickets_path)?;
            tracing::debug!(path = %tickets_path.display(), "created ticket file");
        }
        Ok(Self { root })
    }

    pub fn tickets_path(&self) -> PathBuf {
        self.root.join(TICKETS_FILE)
    }

    /// Path of the session-level `config.kdl`.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }
}

impl TicketBackend for FileBackend {
    fn load(&self) -> Result<Vec<Ticket>> {
        let file = File::open(self.tickets_path())?;
        let reader = BufReader::new(file);

        let mut tickets = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            tickets.push(serde_json::from_str::<Ticket>(&line)?);
        }

        tracing::debug!(count = tickets.len(), "loaded tickets");
        Ok(tickets)
    }

    fn save(&mut self, tickets: &[Ticket]) -> Result<()> {
        let path = self.tickets_path();
        let tmp_path = path.with_extension("jsonl.tmp");

        {
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            for ticket in tickets {
                serde_json::to_writer(&mut writer, ticket)?;
                writer.write_all(b"\n")?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp_path, &path)?;

        tracing::debug!(count = tickets.len(), path = %path.display(), "saved tickets");
        Ok(())
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn backend_type(&self) -> &'static str {
        "file"
    }
}

/// Base directory under which per-workspace directories are created.
///
/// `$TD_DATA_DIR` if set, otherwise `<data dir>/ticketdesk`.
pub fn data_base_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let data_dir = dirs::data_dir()
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("ticketdesk"))
}

/// Get the storage directory for a workspace.
///
/// Uses a hash of the canonical workspace path so every directory gets its
/// own ticket collection.
pub fn get_storage_dir(workspace: &Path) -> Result<PathBuf> {
    get_storage_dir_with_base(workspace, &data_base_dir()?)
}

/// Get the storage directory for a workspace under an explicit base.
pub fn get_storage_dir_with_base(workspace: &Path, base: &Path) -> Result<PathBuf> {
    let canonical = workspace
        .canonicalize()
        .map_err(|e| Error::Other(format!("Could not canonicalize workspace path: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(canonical.to_string_lossy().as_bytes());
    let hash_hex = format!("{:x}", hasher.finalize());

    Ok(base.join(&hash_hex[..12]))
}
