use thiserror::Error;

/// Failures surfaced by the document store. All of these are non-fatal to
/// the application; callers report them and carry on.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection} record not found: {id}")]
    NotFound { collection: &'static str, id: String },

    /// A conditional write lost the race: the stored version moved past the
    /// one the caller read. Retry by re-reading and recomputing.
    #[error("version conflict on document {id}: expected {expected}, found {actual}")]
    VersionConflict {
        id: String,
        expected: u64,
        actual: u64,
    },

    /// The backing service is not reachable or not yet initialized.
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid record: {0}")]
    Validation(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::VersionConflict { .. })
    }
}
