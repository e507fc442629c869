#![allow(dead_code)]
//! Shared fixtures for the integration suites: a seeded in-memory store
//! with three departments and the usual cast of users.

use std::sync::Arc;

use docflow::store::{
    Department, DocumentRecord, DocumentStore, InMemoryDocStore, NewDocument, Role, User,
    UserStatus, Workflow,
};

pub const DEPT_A: &str = "dept-a";
pub const DEPT_B: &str = "dept-b";
pub const DEPT_C: &str = "dept-c";

pub fn controller(id: &str, department_id: &str) -> User {
    User {
        id: id.to_string(),
        name: format!("Controller {id}"),
        email: format!("{id}@example.org"),
        persal_id: "12345678".to_string(),
        role: Role::SubDistrict1AController,
        department_id: Some(department_id.to_string()),
        status: UserStatus::Active,
    }
}

pub fn promoter(id: &str) -> User {
    User {
        id: id.to_string(),
        name: format!("Promoter {id}"),
        email: format!("{id}@example.org"),
        persal_id: "87654321".to_string(),
        role: Role::HealthPromoter,
        department_id: None,
        status: UserStatus::Active,
    }
}

pub fn admin() -> User {
    User {
        id: "admin".to_string(),
        name: "Admin".to_string(),
        email: "admin@example.org".to_string(),
        persal_id: "00000000".to_string(),
        role: Role::Administrator,
        department_id: None,
        status: UserStatus::Active,
    }
}

pub async fn seeded_store() -> Arc<InMemoryDocStore> {
    let store = Arc::new(InMemoryDocStore::new());
    for (id, name) in [(DEPT_A, "Records"), (DEPT_B, "Clinical"), (DEPT_C, "Finance")] {
        store
            .upsert_department(Department {
                id: id.to_string(),
                name: name.to_string(),
                icon: "folder".to_string(),
            })
            .await
            .expect("seed department");
    }
    store
}

pub async fn draft(store: &InMemoryDocStore, initiator: &User) -> DocumentRecord {
    store
        .insert_document(NewDocument {
            name: "Annual submission".to_string(),
            doc_type: "PDF".to_string(),
            content: "body".to_string(),
            file_url: "file-1".to_string(),
            initiator_id: initiator.id.clone(),
            initiator_name: initiator.name.clone(),
        })
        .await
        .expect("insert draft")
}

pub async fn workflow(store: &InMemoryDocStore, departments: &[&str]) -> Workflow {
    store
        .insert_workflow(Workflow {
            id: String::new(),
            name: "Submission review".to_string(),
            description: "Routes submissions through review".to_string(),
            department_ids: departments.iter().map(|d| d.to_string()).collect(),
            initiator_id: "promoter-1".to_string(),
        })
        .await
        .expect("insert workflow")
}
