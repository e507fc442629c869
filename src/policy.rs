//! Role and visibility policy.
//!
//! Pure functions over the current user and the records in question; no
//! ambient context. The store-facing services call these before mutating
//! anything, so the rules hold even when a client skips the UI gating.

use crate::store::{DocumentQuery, DocumentRecord, DocumentStatus, Role, StepStatus, User, Workflow};

/// Administrators observe; everyone else can create drafts.
pub fn can_initiate(role: Role) -> bool {
    !role.is_administrator()
}

/// Only administrators manage user accounts.
pub fn can_manage_users(role: Role) -> bool {
    role.is_administrator()
}

/// Workflow templates are managed by the working roles, not administrators.
pub fn can_manage_workflows(role: Role) -> bool {
    !role.is_administrator()
}

/// Whether `user` may act on the step a document is currently waiting at:
/// never an administrator, only while the current step is genuinely pending,
/// and only from the pending department itself.
pub fn can_act_on(user: &User, doc: &DocumentRecord, workflow: &Workflow) -> bool {
    if user.role.is_administrator() {
        return false;
    }
    if doc.status != DocumentStatus::InProgress {
        return false;
    }
    let Some(step) = doc.step_index() else {
        return false;
    };
    let step_pending = doc
        .history
        .get(step)
        .is_some_and(|entry| entry.status == StepStatus::Pending);
    let own_department = match (&user.department_id, workflow.department_ids.get(step)) {
        (Some(own), Some(dept)) => own == dept,
        _ => false,
    };
    step_pending && own_department
}

/// The dashboard's derived list, expressed as a store query.
///
/// Health Promoters get `pending at own department AND initiated by self`,
/// which their role can essentially never satisfy since they do not approve
/// steps. That is the behavior the production system ships with; it is kept
/// deliberately rather than widened here.
pub fn dashboard_query(user: &User) -> DocumentQuery {
    match user.role {
        Role::Administrator => DocumentQuery::in_progress(),
        Role::HealthPromoter => DocumentQuery::in_progress()
            .pending_at(user.department_id.clone().unwrap_or_default())
            .initiated_by(user.id.clone()),
        _ => DocumentQuery::in_progress()
            .pending_at(user.department_id.clone().unwrap_or_default()),
    }
}

/// Detail-view access: administrators, unrouted documents, terminal
/// documents, the pending department, or any department on the path.
pub fn can_view_details(user: &User, doc: &DocumentRecord, workflow: Option<&Workflow>) -> bool {
    if user.role.is_administrator() {
        return true;
    }
    let has_workflow = workflow.is_some_and(|w| !w.department_ids.is_empty());
    if !has_workflow {
        return true;
    }
    if matches!(doc.status, DocumentStatus::Completed | DocumentStatus::Rejected) {
        return true;
    }
    let Some(own) = user.department_id.as_deref() else {
        return false;
    };
    if doc.pending_department_id == own {
        return true;
    }
    workflow.is_some_and(|w| w.department_ids.iter().any(|d| d == own))
}

/// The all-documents listing: administrators see everything, health
/// promoters see what they initiated, controllers see documents whose path
/// includes their department plus their own drafts.
pub fn visible_documents<'a>(
    user: &User,
    documents: &'a [DocumentRecord],
    workflows: &[Workflow],
) -> Vec<&'a DocumentRecord> {
    documents
        .iter()
        .filter(|doc| match user.role {
            Role::Administrator => true,
            Role::HealthPromoter => doc.initiator_id == user.id,
            _ => {
                let workflow = workflows.iter().find(|w| w.id == doc.workflow_id);
                match workflow {
                    None => doc.initiator_id == user.id,
                    Some(w) => user
                        .department_id
                        .as_deref()
                        .is_some_and(|own| w.department_ids.iter().any(|d| d == own)),
                }
            }
        })
        .collect()
}

/// Documents the reporting aggregator may draw from for a given user.
/// Narrower than the listing rule: drafts never contribute metrics for
/// controller roles.
pub fn report_scope<'a>(
    user: &User,
    documents: &'a [DocumentRecord],
    workflows: &[Workflow],
) -> Vec<&'a DocumentRecord> {
    documents
        .iter()
        .filter(|doc| match user.role {
            Role::Administrator => true,
            Role::HealthPromoter => doc.initiator_id == user.id,
            _ => {
                if doc.workflow_id.is_empty() {
                    return false;
                }
                workflows
                    .iter()
                    .find(|w| w.id == doc.workflow_id)
                    .zip(user.department_id.as_deref())
                    .is_some_and(|(w, own)| w.department_ids.iter().any(|d| d == own))
            }
        })
        .collect()
}
