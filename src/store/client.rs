//! Data-access seam over the hosted document database.
//!
//! The rest of the crate only ever talks to `DocumentStore`: create / read /
//! update / delete by id, live subscription to query results, and atomic
//! single-document writes. Document updates are version-checked so that
//! concurrent workflow transitions cannot silently overwrite each other.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{watch, RwLock};
use tracing::debug;
use uuid::Uuid;

use super::errors::StoreError;
use super::types::{
    Department, DocumentPatch, DocumentQuery, DocumentRecord, DocumentStatus, NewDocument, Role,
    User, UserStatus, Versioned, Workflow, WorkflowPatch, DRAFT_STEP,
};

/// External live-query document database. Writes are atomic per record,
/// never across records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    // Departments
    async fn list_departments(&self) -> Result<Vec<Department>, StoreError>;
    async fn upsert_department(&self, department: Department) -> Result<(), StoreError>;
    async fn delete_department(&self, id: &str) -> Result<(), StoreError>;

    // Workflows
    async fn list_workflows(&self) -> Result<Vec<Workflow>, StoreError>;
    async fn get_workflow(&self, id: &str) -> Result<Workflow, StoreError>;
    async fn insert_workflow(&self, workflow: Workflow) -> Result<Workflow, StoreError>;
    async fn update_workflow(&self, id: &str, patch: WorkflowPatch) -> Result<Workflow, StoreError>;

    // Documents
    async fn insert_document(&self, new: NewDocument) -> Result<DocumentRecord, StoreError>;
    async fn get_document(&self, id: &str) -> Result<Versioned, StoreError>;
    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, StoreError>;
    async fn query_documents(&self, query: &DocumentQuery)
        -> Result<Vec<DocumentRecord>, StoreError>;
    /// Conditional write: applies `patch` only if the stored version still
    /// equals `expected_version`. Returns the new version on success.
    async fn update_document(
        &self,
        id: &str,
        expected_version: u64,
        patch: DocumentPatch,
    ) -> Result<u64, StoreError>;
    async fn delete_document(&self, id: &str) -> Result<(), StoreError>;
    /// Live snapshot stream for a query; a fresh snapshot is published after
    /// every mutation of the documents collection.
    async fn subscribe_documents(
        &self,
        query: DocumentQuery,
    ) -> Result<watch::Receiver<Vec<DocumentRecord>>, StoreError>;

    // Users
    async fn get_user(&self, id: &str) -> Result<User, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn insert_user(&self, user: User) -> Result<(), StoreError>;
    async fn set_user_role(&self, id: &str, role: Role) -> Result<(), StoreError>;
    async fn set_user_status(&self, id: &str, status: UserStatus) -> Result<(), StoreError>;
}

struct VersionedSlot {
    record: DocumentRecord,
    version: u64,
}

struct DocumentSubscriber {
    query: DocumentQuery,
    sender: watch::Sender<Vec<DocumentRecord>>,
}

/// In-process implementation backing tests, the demo harness, and any
/// deployment that does not need a hosted store.
#[derive(Default)]
pub struct InMemoryDocStore {
    departments: RwLock<HashMap<String, Department>>,
    workflows: RwLock<HashMap<String, Workflow>>,
    documents: RwLock<HashMap<String, VersionedSlot>>,
    users: RwLock<HashMap<String, User>>,
    subscribers: RwLock<Vec<DocumentSubscriber>>,
}

impl InMemoryDocStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot_for(query: &DocumentQuery, documents: &HashMap<String, VersionedSlot>) -> Vec<DocumentRecord> {
        let mut matched: Vec<DocumentRecord> = documents
            .values()
            .filter(|slot| query.matches(&slot.record))
            .map(|slot| slot.record.clone())
            .collect();
        // Deterministic snapshot order for consumers and tests.
        matched.sort_by(|a, b| a.id.cmp(&b.id));
        matched
    }

    /// Push fresh snapshots to every live subscriber, dropping the ones
    /// whose receivers have gone away.
    async fn notify_subscribers(&self) {
        let documents = self.documents.read().await;
        let mut subscribers = self.subscribers.write().await;
        subscribers.retain(|sub| {
            let snapshot = Self::snapshot_for(&sub.query, &documents);
            sub.sender.send(snapshot).is_ok()
        });
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocStore {
    async fn list_departments(&self) -> Result<Vec<Department>, StoreError> {
        let mut departments: Vec<Department> =
            self.departments.read().await.values().cloned().collect();
        departments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(departments)
    }

    async fn upsert_department(&self, department: Department) -> Result<(), StoreError> {
        if department.id.is_empty() || department.name.is_empty() {
            return Err(StoreError::Validation(
                "department id and name are required".to_string(),
            ));
        }
        self.departments
            .write()
            .await
            .insert(department.id.clone(), department);
        Ok(())
    }

    async fn delete_department(&self, id: &str) -> Result<(), StoreError> {
        // Departments are deleted independently; workflows referencing the
        // id keep it and render "Unknown" downstream.
        self.departments
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound {
                collection: "departments",
                id: id.to_string(),
            })
    }

    async fn list_workflows(&self) -> Result<Vec<Workflow>, StoreError> {
        let mut workflows: Vec<Workflow> = self.workflows.read().await.values().cloned().collect();
        workflows.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(workflows)
    }

    async fn get_workflow(&self, id: &str) -> Result<Workflow, StoreError> {
        self.workflows
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                collection: "workflows",
                id: id.to_string(),
            })
    }

    async fn insert_workflow(&self, mut workflow: Workflow) -> Result<Workflow, StoreError> {
        if workflow.id.is_empty() {
            workflow.id = Uuid::new_v4().to_string();
        }
        self.workflows
            .write()
            .await
            .insert(workflow.id.clone(), workflow.clone());
        Ok(workflow)
    }

    async fn update_workflow(&self, id: &str, patch: WorkflowPatch) -> Result<Workflow, StoreError> {
        let mut workflows = self.workflows.write().await;
        let workflow = workflows.get_mut(id).ok_or_else(|| StoreError::NotFound {
            collection: "workflows",
            id: id.to_string(),
        })?;
        patch.apply(workflow);
        Ok(workflow.clone())
    }

    async fn insert_document(&self, new: NewDocument) -> Result<DocumentRecord, StoreError> {
        let record = DocumentRecord {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            doc_type: new.doc_type,
            content: new.content,
            file_url: new.file_url,
            workflow_id: String::new(),
            current_step: DRAFT_STEP,
            history: Vec::new(),
            status: DocumentStatus::InProgress,
            pending_department_id: String::new(),
            initiator_id: new.initiator_id,
            initiator_name: new.initiator_name,
        };
        self.documents.write().await.insert(
            record.id.clone(),
            VersionedSlot {
                record: record.clone(),
                version: 1,
            },
        );
        self.notify_subscribers().await;
        Ok(record)
    }

    async fn get_document(&self, id: &str) -> Result<Versioned, StoreError> {
        self.documents
            .read()
            .await
            .get(id)
            .map(|slot| Versioned {
                record: slot.record.clone(),
                version: slot.version,
            })
            .ok_or_else(|| StoreError::NotFound {
                collection: "documents",
                id: id.to_string(),
            })
    }

    async fn list_documents(&self) -> Result<Vec<DocumentRecord>, StoreError> {
        let documents = self.documents.read().await;
        Ok(Self::snapshot_for(&DocumentQuery::all(), &documents))
    }

    async fn query_documents(
        &self,
        query: &DocumentQuery,
    ) -> Result<Vec<DocumentRecord>, StoreError> {
        let documents = self.documents.read().await;
        Ok(Self::snapshot_for(query, &documents))
    }

    async fn update_document(
        &self,
        id: &str,
        expected_version: u64,
        patch: DocumentPatch,
    ) -> Result<u64, StoreError> {
        let new_version = {
            let mut documents = self.documents.write().await;
            let slot = documents.get_mut(id).ok_or_else(|| StoreError::NotFound {
                collection: "documents",
                id: id.to_string(),
            })?;
            if slot.version != expected_version {
                return Err(StoreError::VersionConflict {
                    id: id.to_string(),
                    expected: expected_version,
                    actual: slot.version,
                });
            }
            patch.apply(&mut slot.record);
            slot.version += 1;
            slot.version
        };
        debug!(document_id = id, version = new_version, "document updated");
        self.notify_subscribers().await;
        Ok(new_version)
    }

    async fn delete_document(&self, id: &str) -> Result<(), StoreError> {
        let removed = self.documents.write().await.remove(id);
        if removed.is_none() {
            return Err(StoreError::NotFound {
                collection: "documents",
                id: id.to_string(),
            });
        }
        self.notify_subscribers().await;
        Ok(())
    }

    async fn subscribe_documents(
        &self,
        query: DocumentQuery,
    ) -> Result<watch::Receiver<Vec<DocumentRecord>>, StoreError> {
        let initial = {
            let documents = self.documents.read().await;
            Self::snapshot_for(&query, &documents)
        };
        let (sender, receiver) = watch::channel(initial);
        self.subscribers
            .write()
            .await
            .push(DocumentSubscriber { query, sender });
        Ok(receiver)
    }

    async fn get_user(&self, id: &str) -> Result<User, StoreError> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                collection: "users",
                id: id.to_string(),
            })
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn insert_user(&self, user: User) -> Result<(), StoreError> {
        if user.id.is_empty() {
            return Err(StoreError::Validation("user id is required".to_string()));
        }
        self.users.write().await.insert(user.id.clone(), user);
        Ok(())
    }

    async fn set_user_role(&self, id: &str, role: Role) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or_else(|| StoreError::NotFound {
            collection: "users",
            id: id.to_string(),
        })?;
        user.role = role;
        Ok(())
    }

    async fn set_user_status(&self, id: &str, status: UserStatus) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or_else(|| StoreError::NotFound {
            collection: "users",
            id: id.to_string(),
        })?;
        user.status = status;
        Ok(())
    }
}
