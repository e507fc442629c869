//! History ledger append/amend operation.
//!
//! A single operation with two modes, both working over the complete history
//! sequence: amend the entry for the current step in place, or append a
//! fully-formed entry for a new step. Callers always supply the full prior
//! history; the store write that follows is version-checked, so a stale
//! history can never clobber a newer one.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::store::{HistoryEntry, HistoryPatch, StepStatus};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("no history entry exists at step {index}")]
    MissingStep { index: usize },
    #[error("a new history step requires department, status and timestamp")]
    IncompleteEntry,
}

/// A possibly-incomplete entry supplied by a caller. Append mode insists on
/// all three required fields being present.
#[derive(Debug, Clone, Default)]
pub struct HistoryDraft {
    pub department_id: Option<String>,
    pub status: Option<StepStatus>,
    pub timestamp: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub file_url: Option<String>,
}

impl HistoryDraft {
    fn into_entry(self) -> Result<HistoryEntry, LedgerError> {
        match (self.department_id, self.status, self.timestamp) {
            (Some(department_id), Some(status), Some(timestamp)) => Ok(HistoryEntry {
                department_id,
                status,
                timestamp,
                notes: self.notes,
                file_url: self.file_url,
            }),
            _ => Err(LedgerError::IncompleteEntry),
        }
    }
}

#[derive(Debug, Clone)]
pub enum LedgerUpdate {
    /// Merge the patch into the entry at `step_index`. Prior entries are
    /// never touched once superseded.
    Amend {
        step_index: usize,
        patch: HistoryPatch,
    },
    /// Append a complete entry for the next step (or the synthetic
    /// completion entry).
    Append { entry: HistoryDraft },
}

/// Apply an update to a history sequence, returning the replacement
/// sequence. Pure; the caller owns the subsequent write.
pub fn apply(history: &[HistoryEntry], update: LedgerUpdate) -> Result<Vec<HistoryEntry>, LedgerError> {
    let mut next: Vec<HistoryEntry> = history.to_vec();
    match update {
        LedgerUpdate::Amend { step_index, patch } => {
            let entry = next
                .get_mut(step_index)
                .ok_or(LedgerError::MissingStep { index: step_index })?;
            patch.apply(entry);
        }
        LedgerUpdate::Append { entry } => {
            next.push(entry.into_entry()?);
        }
    }
    Ok(next)
}
