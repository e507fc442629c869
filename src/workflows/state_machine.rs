//! Document progression state machine.
//!
//! States: Draft (no workflow bound) -> Pending@i for each department in the
//! bound workflow's path -> Completed | Rejected (terminal). Every
//! transition is a read / pure-compute / version-checked-write cycle against
//! the store, retried on write conflict, so at most one transition can
//! commit per pending step even with racing actors. Preconditions are
//! enforced here, not just hidden in the UI.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::store::{
    DocumentPatch, DocumentRecord, DocumentStatus, DocumentStore, HistoryPatch, RetryConfig,
    StepStatus, StoreError, User, SYSTEM_DEPARTMENT_ID,
};
use crate::workflows::ledger::{self, HistoryDraft, LedgerError, LedgerUpdate};

/// Notes recorded on the synthetic completion entry.
const COMPLETION_NOTES: &str = "Workflow finished";
/// Notes recorded on the seed entry when a workflow is bound.
const INITIATION_NOTES: &str = "Workflow initiated.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("notes are required for this action")]
    NotesRequired,
    #[error("administrators cannot act on workflow steps")]
    AdministratorCannotAct,
    #[error("only the initiator may bind a workflow to their draft")]
    NotInitiator,
    #[error("document is already bound to workflow {workflow_id}")]
    AlreadyBound { workflow_id: String },
    #[error("workflow must route through at least one department")]
    EmptyWorkflow,
    #[error("document has no workflow bound")]
    NoWorkflow,
    #[error("document is terminal with status {status:?}")]
    Terminal { status: DocumentStatus },
    #[error("step {index} is not awaiting action")]
    StepNotPending { index: usize },
    #[error("step belongs to department {expected}, actor belongs to {actual:?}")]
    WrongDepartment {
        expected: String,
        actual: Option<String>,
    },
    #[error("write conflict persisted after {attempts} attempts")]
    ConflictExhausted { attempts: u32 },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of a committed transition.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub document: DocumentRecord,
    /// Step index the document advanced to, when the transition moved it
    /// along the path.
    pub advanced_to: Option<usize>,
}

pub struct DocumentStateMachine<S: DocumentStore> {
    store: Arc<S>,
    retry: RetryConfig,
}

impl<S: DocumentStore> DocumentStateMachine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(store: Arc<S>, retry: RetryConfig) -> Self {
        Self { store, retry }
    }

    /// Draft -> Pending@0. Seeds the history ledger with the first pending
    /// entry and points the document at the workflow's first department.
    pub async fn bind_workflow(
        &self,
        document_id: &str,
        workflow_id: &str,
        actor: &User,
    ) -> Result<TransitionOutcome, TransitionError> {
        if actor.role.is_administrator() {
            return Err(TransitionError::AdministratorCannotAct);
        }
        let workflow = self.store.get_workflow(workflow_id).await?;
        let first_department = workflow
            .department_ids
            .first()
            .cloned()
            .ok_or(TransitionError::EmptyWorkflow)?;

        for attempt in 0..self.retry.max_attempts {
            let versioned = self.store.get_document(document_id).await?;
            let doc = versioned.record;
            if !doc.is_draft() {
                return Err(TransitionError::AlreadyBound {
                    workflow_id: doc.workflow_id,
                });
            }
            if doc.initiator_id != actor.id {
                return Err(TransitionError::NotInitiator);
            }

            let seed = HistoryDraft {
                department_id: Some(first_department.clone()),
                status: Some(StepStatus::Pending),
                timestamp: Some(Utc::now()),
                notes: Some(INITIATION_NOTES.to_string()),
                file_url: (!doc.file_url.is_empty()).then(|| doc.file_url.clone()),
            };
            let history = ledger::apply(&doc.history, LedgerUpdate::Append { entry: seed })?;

            let patch = DocumentPatch {
                workflow_id: Some(workflow.id.clone()),
                current_step: Some(0),
                status: Some(DocumentStatus::InProgress),
                pending_department_id: Some(first_department.clone()),
                history: Some(history),
                ..DocumentPatch::default()
            };
            match self
                .commit(document_id, versioned.version, patch, doc, attempt)
                .await?
            {
                Some(document) => {
                    info!(
                        document_id,
                        workflow_id,
                        pending_department = %first_department,
                        "workflow bound to document"
                    );
                    return Ok(TransitionOutcome {
                        document,
                        advanced_to: Some(0),
                    });
                }
                None => continue,
            }
        }
        Err(TransitionError::ConflictExhausted {
            attempts: self.retry.max_attempts,
        })
    }

    /// Approve or reject the step currently awaiting action. Notes are
    /// mandatory; the actor must belong to the pending department and must
    /// not be an administrator.
    pub async fn decide(
        &self,
        document_id: &str,
        decision: Decision,
        notes: &str,
        actor: &User,
    ) -> Result<TransitionOutcome, TransitionError> {
        let notes = notes.trim();
        if notes.is_empty() {
            return Err(TransitionError::NotesRequired);
        }
        if actor.role.is_administrator() {
            return Err(TransitionError::AdministratorCannotAct);
        }

        for attempt in 0..self.retry.max_attempts {
            let versioned = self.store.get_document(document_id).await?;
            let doc = versioned.record;

            if doc.status != DocumentStatus::InProgress {
                return Err(TransitionError::Terminal { status: doc.status });
            }
            if doc.is_draft() {
                return Err(TransitionError::NoWorkflow);
            }
            let workflow = self.store.get_workflow(&doc.workflow_id).await?;
            let step = doc.step_index().ok_or(TransitionError::NoWorkflow)?;
            let step_department = workflow
                .department_ids
                .get(step)
                .cloned()
                .ok_or(TransitionError::StepNotPending { index: step })?;

            if actor.department_id.as_deref() != Some(step_department.as_str()) {
                return Err(TransitionError::WrongDepartment {
                    expected: step_department,
                    actual: actor.department_id.clone(),
                });
            }
            match doc.history.get(step) {
                Some(entry) if entry.status == StepStatus::Pending => {}
                _ => return Err(TransitionError::StepNotPending { index: step }),
            }

            let now = Utc::now();
            let resolved_status = match decision {
                Decision::Approve => StepStatus::Approved,
                Decision::Reject => StepStatus::Rejected,
            };
            let mut history = ledger::apply(
                &doc.history,
                LedgerUpdate::Amend {
                    step_index: step,
                    patch: HistoryPatch {
                        status: Some(resolved_status),
                        timestamp: Some(now),
                        notes: Some(notes.to_string()),
                        ..HistoryPatch::default()
                    },
                },
            )?;

            let (patch, advanced_to) = match decision {
                Decision::Reject => (
                    DocumentPatch {
                        history: Some(history),
                        status: Some(DocumentStatus::Rejected),
                        pending_department_id: Some(String::new()),
                        ..DocumentPatch::default()
                    },
                    None,
                ),
                Decision::Approve => {
                    let next_step = step + 1;
                    if next_step >= workflow.department_ids.len() {
                        history = ledger::apply(
                            &history,
                            LedgerUpdate::Append {
                                entry: HistoryDraft {
                                    department_id: Some(SYSTEM_DEPARTMENT_ID.to_string()),
                                    status: Some(StepStatus::Completed),
                                    timestamp: Some(now),
                                    notes: Some(COMPLETION_NOTES.to_string()),
                                    file_url: None,
                                },
                            },
                        )?;
                        (
                            DocumentPatch {
                                history: Some(history),
                                status: Some(DocumentStatus::Completed),
                                pending_department_id: Some(String::new()),
                                ..DocumentPatch::default()
                            },
                            None,
                        )
                    } else {
                        let next_department = workflow.department_ids[next_step].clone();
                        history = ledger::apply(
                            &history,
                            LedgerUpdate::Append {
                                entry: HistoryDraft {
                                    department_id: Some(next_department.clone()),
                                    status: Some(StepStatus::Pending),
                                    timestamp: Some(now),
                                    notes: None,
                                    file_url: None,
                                },
                            },
                        )?;
                        (
                            DocumentPatch {
                                history: Some(history),
                                current_step: Some(next_step as i32),
                                pending_department_id: Some(next_department),
                                ..DocumentPatch::default()
                            },
                            Some(next_step),
                        )
                    }
                }
            };

            match self
                .commit(document_id, versioned.version, patch, doc, attempt)
                .await?
            {
                Some(document) => {
                    info!(
                        document_id,
                        step,
                        decision = ?decision,
                        status = ?document.status,
                        "workflow step resolved"
                    );
                    return Ok(TransitionOutcome {
                        document,
                        advanced_to,
                    });
                }
                None => continue,
            }
        }
        Err(TransitionError::ConflictExhausted {
            attempts: self.retry.max_attempts,
        })
    }

    /// Attempt the conditional write. Returns the updated record on
    /// success, `None` when the write conflicted and another attempt is
    /// warranted.
    async fn commit(
        &self,
        document_id: &str,
        expected_version: u64,
        patch: DocumentPatch,
        mut doc: DocumentRecord,
        attempt: u32,
    ) -> Result<Option<DocumentRecord>, TransitionError> {
        match self
            .store
            .update_document(document_id, expected_version, patch.clone())
            .await
        {
            Ok(_) => {
                patch.apply(&mut doc);
                Ok(Some(doc))
            }
            Err(err) if self.retry.should_retry(&err, attempt) => {
                warn!(
                    document_id,
                    attempt,
                    error = %err,
                    "document write conflicted, retrying against fresh state"
                );
                tokio::time::sleep(self.retry.delay_for(attempt)).await;
                Ok(None)
            }
            Err(StoreError::VersionConflict { .. }) => Err(TransitionError::ConflictExhausted {
                attempts: self.retry.max_attempts,
            }),
            Err(err) => Err(err.into()),
        }
    }
}
