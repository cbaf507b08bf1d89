//! CSV journal of submitted trades.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{TradeInstruction, TradeKind, TransactionId};

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Journal IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Journal CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One row of the journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub timestamp: DateTime<Utc>,
    pub kind: TradeKind,
    pub asset: String,
    pub amount: Decimal,
    pub counterparty: Option<String>,
    pub recipient: Option<String>,
    pub transaction: String,
}

impl JournalEntry {
    pub fn new(instruction: &TradeInstruction, transaction: &TransactionId, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            kind: instruction.kind,
            asset: instruction.asset.clone(),
            amount: instruction.amount,
            counterparty: instruction.counterparty.clone(),
            recipient: instruction.recipient.clone(),
            transaction: transaction.to_string(),
        }
    }
}

/// Append-only trade log with a header row
#[derive(Debug, Clone)]
pub struct TradeJournal {
    path: PathBuf,
}

impl TradeJournal {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, entry: &JournalEntry) -> Result<(), JournalError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let is_new = fs::metadata(&self.path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(is_new).from_writer(file);
        writer.serialize(entry)?;
        writer.flush()?;
        Ok(())
    }

    /// All entries, oldest first. A missing journal is empty.
    pub fn entries(&self) -> Result<Vec<JournalEntry>, JournalError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        reader
            .deserialize()
            .collect::<Result<Vec<JournalEntry>, csv::Error>>()
            .map_err(JournalError::from)
    }
}
