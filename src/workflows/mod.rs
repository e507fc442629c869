pub mod ledger;
pub mod state_machine;
pub mod templates;

pub use ledger::{HistoryDraft, LedgerError, LedgerUpdate};
pub use state_machine::{Decision, DocumentStateMachine, TransitionError, TransitionOutcome};
pub use templates::{NewWorkflow, TemplateError, WorkflowTemplates};
