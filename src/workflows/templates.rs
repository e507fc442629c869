//! Workflow template management.
//!
//! Templates are ordered department lists. They stay editable only until a
//! bound document makes real progress: once any document has moved past its
//! first pending step the template is locked for good, so in-flight routing
//! never changes under a document.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::store::{
    DocumentStore, StepStatus, StoreError, User, Workflow, WorkflowPatch,
};
use crate::workflows::state_machine::{DocumentStateMachine, TransitionError, TransitionOutcome};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("workflow needs at least one department")]
    EmptyDepartments,
    #[error("workflow description is required")]
    MissingDescription,
    #[error("administrators cannot manage workflows")]
    AdministratorCannotManage,
    #[error("workflow {workflow_id} is locked: a bound document has progressed")]
    WorkflowLocked { workflow_id: String },
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct NewWorkflow {
    pub name: String,
    pub description: String,
    pub department_ids: Vec<String>,
}

pub struct WorkflowTemplates<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> WorkflowTemplates<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn create_workflow(
        &self,
        new: NewWorkflow,
        actor: &User,
    ) -> Result<Workflow, TemplateError> {
        if actor.role.is_administrator() {
            return Err(TemplateError::AdministratorCannotManage);
        }
        if new.department_ids.is_empty() {
            return Err(TemplateError::EmptyDepartments);
        }
        if new.description.trim().is_empty() {
            return Err(TemplateError::MissingDescription);
        }
        let workflow = self
            .store
            .insert_workflow(Workflow {
                id: String::new(),
                name: new.name,
                description: new.description,
                department_ids: new.department_ids,
                initiator_id: actor.id.clone(),
            })
            .await?;
        info!(workflow_id = %workflow.id, steps = workflow.department_ids.len(), "workflow created");
        Ok(workflow)
    }

    /// The "Create Workflow" dialog in one call: build a template from a
    /// draft document (the template takes the document's name) and bind the
    /// document to it immediately.
    pub async fn create_and_bind(
        &self,
        document_id: &str,
        description: &str,
        department_ids: Vec<String>,
        actor: &User,
    ) -> Result<(Workflow, TransitionOutcome), TemplateError> {
        let draft = self.store.get_document(document_id).await?.record;
        let workflow = self
            .create_workflow(
                NewWorkflow {
                    name: draft.name,
                    description: description.to_string(),
                    department_ids,
                },
                actor,
            )
            .await?;
        let machine = DocumentStateMachine::new(Arc::clone(&self.store));
        let outcome = machine.bind_workflow(document_id, &workflow.id, actor).await?;
        Ok((workflow, outcome))
    }

    /// Edits are refused once any bound document has progressed past its
    /// first pending step.
    pub async fn update_workflow(
        &self,
        workflow_id: &str,
        patch: WorkflowPatch,
        actor: &User,
    ) -> Result<Workflow, TemplateError> {
        if actor.role.is_administrator() {
            return Err(TemplateError::AdministratorCannotManage);
        }
        if let Some(department_ids) = &patch.department_ids {
            if department_ids.is_empty() {
                return Err(TemplateError::EmptyDepartments);
            }
        }
        if self.is_locked(workflow_id).await? {
            return Err(TemplateError::WorkflowLocked {
                workflow_id: workflow_id.to_string(),
            });
        }
        Ok(self.store.update_workflow(workflow_id, patch).await?)
    }

    /// A workflow is locked when any bound document has `current_step > 0`
    /// or a first history entry that is no longer Pending.
    pub async fn is_locked(&self, workflow_id: &str) -> Result<bool, TemplateError> {
        let documents = self.store.list_documents().await?;
        Ok(documents.iter().any(|doc| {
            doc.workflow_id == workflow_id
                && (doc.current_step > 0
                    || doc
                        .history
                        .first()
                        .is_some_and(|entry| entry.status != StepStatus::Pending))
        }))
    }

    /// Templates visible to a user: health promoters only see their own.
    pub async fn list_for(&self, user: &User) -> Result<Vec<Workflow>, TemplateError> {
        let workflows = self.store.list_workflows().await?;
        if user.role.is_health_promoter() {
            Ok(workflows
                .into_iter()
                .filter(|w| w.initiator_id == user.id)
                .collect())
        } else {
            Ok(workflows)
        }
    }
}
