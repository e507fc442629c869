// docflow - document approval workflow core
// This exposes the core components for testing and integration

pub mod config;
pub mod files;
pub mod policy;
pub mod reports;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod users;
pub mod workflows;

// Re-export key types for easy access
pub use config::{config, init_config, DocflowConfig};
pub use files::{FileRef, FileStore, FileStoreError, InMemoryFileStore, StoredFile};
pub use reports::{build_report, Report, ReportOptions};
pub use session::IdleSession;
pub use store::{
    Department, DocumentQuery, DocumentRecord, DocumentStatus, DocumentStore, HistoryEntry,
    InMemoryDocStore, NewDocument, RetryConfig, Role, StepStatus, StoreError, User, UserStatus,
    Workflow,
};
pub use telemetry::{generate_correlation_id, init_telemetry, shutdown_telemetry};
pub use users::{IdentityProvider, LocalIdentityProvider, NewUser, UserDirectory};
pub use workflows::{
    Decision, DocumentStateMachine, TransitionError, TransitionOutcome, WorkflowTemplates,
};
