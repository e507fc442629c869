pub mod client;
pub mod errors;
pub mod retry;
pub mod types;

pub use client::{DocumentStore, InMemoryDocStore};
pub use errors::StoreError;
pub use retry::RetryConfig;
pub use types::{
    department_name, Department, DocumentPatch, DocumentQuery, DocumentRecord, DocumentStatus,
    HistoryEntry, HistoryPatch, NewDocument, Role, StepStatus, User, UserStatus, Versioned,
    Workflow, WorkflowPatch, DRAFT_STEP, SYSTEM_DEPARTMENT_ID,
};
