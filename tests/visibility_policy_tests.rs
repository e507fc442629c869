//! Tests for src/policy.rs: the capability matrix, dashboard query shapes,
//! and detail-view visibility rules.

mod common;

use common::*;
use docflow::policy;
use docflow::store::{DocumentQuery, DocumentStatus, Role};
use docflow::store::{DocumentRecord, HistoryEntry, StepStatus, Workflow};

fn in_progress_doc(workflow_id: &str, pending: &str, initiator: &str) -> DocumentRecord {
    DocumentRecord {
        id: format!("doc-{pending}-{initiator}"),
        name: "Doc".into(),
        doc_type: "PDF".into(),
        content: String::new(),
        file_url: String::new(),
        workflow_id: workflow_id.to_string(),
        current_step: 0,
        history: vec![HistoryEntry::pending(pending, chrono::Utc::now())],
        status: DocumentStatus::InProgress,
        pending_department_id: pending.to_string(),
        initiator_id: initiator.to_string(),
        initiator_name: "Someone".into(),
    }
}

fn path_workflow(id: &str, departments: &[&str]) -> Workflow {
    Workflow {
        id: id.to_string(),
        name: "wf".into(),
        description: "desc".into(),
        department_ids: departments.iter().map(|d| d.to_string()).collect(),
        initiator_id: "promoter-1".into(),
    }
}

#[test]
fn capability_matrix() {
    assert!(!policy::can_initiate(Role::Administrator));
    assert!(policy::can_initiate(Role::HealthPromoter));
    assert!(policy::can_initiate(Role::SubDistrict7Controller));

    assert!(policy::can_manage_users(Role::Administrator));
    assert!(!policy::can_manage_users(Role::Tdhs));

    assert!(!policy::can_manage_workflows(Role::Administrator));
    assert!(policy::can_manage_workflows(Role::HealthPromoter));
}

#[test]
fn administrators_never_act_on_pending_steps() {
    let wf = path_workflow("w1", &[DEPT_A]);
    let doc = in_progress_doc("w1", DEPT_A, "promoter-1");
    let mut admin_in_dept = admin();
    admin_in_dept.department_id = Some(DEPT_A.to_string());
    assert!(!policy::can_act_on(&admin_in_dept, &doc, &wf));
    assert!(policy::can_act_on(&controller("c", DEPT_A), &doc, &wf));
    assert!(!policy::can_act_on(&controller("c", DEPT_B), &doc, &wf));
}

#[test]
fn acting_requires_a_genuinely_pending_step() {
    let wf = path_workflow("w1", &[DEPT_A]);
    let mut doc = in_progress_doc("w1", DEPT_A, "promoter-1");
    doc.history[0].status = StepStatus::Approved;
    assert!(!policy::can_act_on(&controller("c", DEPT_A), &doc, &wf));

    let mut rejected = in_progress_doc("w1", DEPT_A, "promoter-1");
    rejected.status = DocumentStatus::Rejected;
    assert!(!policy::can_act_on(&controller("c", DEPT_A), &rejected, &wf));
}

#[test]
fn dashboard_queries_per_role() {
    assert_eq!(policy::dashboard_query(&admin()), DocumentQuery::in_progress());

    let ctrl = controller("ctrl-1", DEPT_B);
    assert_eq!(
        policy::dashboard_query(&ctrl),
        DocumentQuery::in_progress().pending_at(DEPT_B)
    );

    // Health promoters get the doubly-narrowed filter the production system
    // ships with: pending at their (non-approving) department AND initiated
    // by them. Pinned on purpose.
    let hp = promoter("promoter-1");
    assert_eq!(
        policy::dashboard_query(&hp),
        DocumentQuery::in_progress()
            .pending_at("")
            .initiated_by("promoter-1")
    );
}

#[test]
fn detail_view_visibility_rules() {
    let wf = path_workflow("w1", &[DEPT_A, DEPT_B]);
    let doc = in_progress_doc("w1", DEPT_A, "promoter-1");

    // Administrator sees all.
    assert!(policy::can_view_details(&admin(), &doc, Some(&wf)));
    // No workflow bound: anyone may look.
    assert!(policy::can_view_details(&controller("c", DEPT_C), &doc, None));
    // Pending at my department.
    assert!(policy::can_view_details(&controller("c", DEPT_A), &doc, Some(&wf)));
    // My department is later in the path.
    assert!(policy::can_view_details(&controller("c", DEPT_B), &doc, Some(&wf)));
    // Not on the path, not terminal: no access.
    assert!(!policy::can_view_details(&controller("c", DEPT_C), &doc, Some(&wf)));

    // Terminal documents are visible regardless of department.
    let mut done = doc.clone();
    done.status = DocumentStatus::Completed;
    assert!(policy::can_view_details(&controller("c", DEPT_C), &done, Some(&wf)));
    let mut rejected = doc.clone();
    rejected.status = DocumentStatus::Rejected;
    assert!(policy::can_view_details(&controller("c", DEPT_C), &rejected, Some(&wf)));
}

#[test]
fn listing_visibility_per_role() {
    let workflows = vec![path_workflow("w1", &[DEPT_A, DEPT_B])];
    let mut draft_doc = in_progress_doc("", "", "ctrl-1");
    draft_doc.workflow_id = String::new();
    draft_doc.current_step = -1;
    draft_doc.history.clear();
    let documents = vec![
        in_progress_doc("w1", DEPT_A, "promoter-1"),
        in_progress_doc("w1", DEPT_B, "promoter-2"),
        draft_doc,
    ];

    let all = policy::visible_documents(&admin(), &documents, &workflows);
    assert_eq!(all.len(), 3);

    let own = policy::visible_documents(&promoter("promoter-1"), &documents, &workflows);
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].initiator_id, "promoter-1");

    // Controller in dept A: both routed documents (path membership), plus
    // the draft they initiated.
    let ctrl = controller("ctrl-1", DEPT_A);
    let visible = policy::visible_documents(&ctrl, &documents, &workflows);
    assert_eq!(visible.len(), 3);

    // Controller outside the path sees nothing.
    let outsider = controller("ctrl-9", DEPT_C);
    assert!(policy::visible_documents(&outsider, &documents, &workflows).is_empty());
}

#[test]
fn report_scope_excludes_drafts_for_controllers() {
    let workflows = vec![path_workflow("w1", &[DEPT_A])];
    let mut draft_doc = in_progress_doc("", "", "ctrl-1");
    draft_doc.workflow_id = String::new();
    let documents = vec![in_progress_doc("w1", DEPT_A, "promoter-1"), draft_doc];

    let ctrl = controller("ctrl-1", DEPT_A);
    let scoped = policy::report_scope(&ctrl, &documents, &workflows);
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].workflow_id, "w1");
}
