//! Trade snapshot persistence for crash recovery and audit.
//!
//! The active [`Trade`] is written as pretty JSON after every state
//! transition and can be loaded back at start-up.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::PersistenceError;
use crate::trade::Trade;

/// Reads and writes the trade snapshot file.
#[derive(Debug, Clone)]
pub struct TradeStore {
    path: PathBuf,
}

impl TradeStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `trade` to disk, creating parent directories if needed.
    ///
    /// The snapshot goes to a sibling temp file first and is renamed into
    /// place, so a crash mid-write leaves the previous snapshot intact.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, trade: &Trade) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        {
            let writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(writer, trade)?;
        }
        fs::rename(&tmp, &self.path)?;

        debug!(
            path = %self.path.display(),
            in_position = trade.in_position,
            "Trade snapshot saved"
        );
        Ok(())
    }

    /// Loads the snapshot. A missing file yields a fresh trade.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self) -> Result<Trade, PersistenceError> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "No trade snapshot, starting flat");
            return Ok(Trade::default());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let trade: Trade = serde_json::from_reader(reader)?;
        info!(
            path = %self.path.display(),
            in_position = trade.in_position,
            "Trade snapshot loaded"
        );
        Ok(trade)
    }
}
