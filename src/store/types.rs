use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Department id used for the synthetic completion entry appended after the
/// final workflow step. Not a real routing target.
pub const SYSTEM_DEPARTMENT_ID: &str = "system";

/// `current_step` value for a draft document with no workflow bound.
pub const DRAFT_STEP: i32 = -1;

/// A named routing target. Documents wait at one department at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: String,
    pub name: String,
    /// Icon reference for the UI layer. Opaque to the core.
    pub icon: String,
}

/// Resolve a department name, degrading to "Unknown" for dangling references
/// (departments are deleted independently of the workflows that mention them).
pub fn department_name(departments: &[Department], id: &str) -> String {
    departments
        .iter()
        .find(|d| d.id == id)
        .map(|d| d.name.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Ordered list of departments a document must traverse for approval.
/// Index 0 is the first stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub department_ids: Vec<String>,
    pub initiator_id: String,
}

/// Partial update for a workflow template. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct WorkflowPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub department_ids: Option<Vec<String>>,
}

impl WorkflowPatch {
    pub fn apply(&self, workflow: &mut Workflow) {
        if let Some(name) = &self.name {
            workflow.name = name.clone();
        }
        if let Some(description) = &self.description {
            workflow.description = description.clone();
        }
        if let Some(department_ids) = &self.department_ids {
            workflow.department_ids = department_ids.clone();
        }
    }
}

/// Status of a single workflow step in the history ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

/// Aggregate status of a document across its whole workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentStatus {
    #[serde(rename = "In-Progress")]
    InProgress,
    Completed,
    Rejected,
}

/// One entry per workflow step, in step order. A synthetic final entry with
/// department id "system" and status Completed is appended after the last
/// step is approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub department_id: String,
    pub status: StepStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

impl HistoryEntry {
    pub fn pending(department_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            department_id: department_id.into(),
            status: StepStatus::Pending,
            timestamp,
            notes: None,
            file_url: None,
        }
    }
}

/// Partial amendment merged into an existing history entry. `None` fields
/// keep their prior value.
#[derive(Debug, Clone, Default)]
pub struct HistoryPatch {
    pub status: Option<StepStatus>,
    pub timestamp: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub file_url: Option<String>,
}

impl HistoryPatch {
    pub fn apply(&self, entry: &mut HistoryEntry) {
        if let Some(status) = self.status {
            entry.status = status;
        }
        if let Some(timestamp) = self.timestamp {
            entry.timestamp = timestamp;
        }
        if let Some(notes) = &self.notes {
            entry.notes = Some(notes.clone());
        }
        if let Some(file_url) = &self.file_url {
            entry.file_url = Some(file_url.clone());
        }
    }
}

/// The stateful entity being routed through a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub name: String,
    pub doc_type: String,
    pub content: String,
    pub file_url: String,
    /// Empty string means draft: no workflow bound yet.
    pub workflow_id: String,
    /// Index into the bound workflow's `department_ids`; -1 for drafts.
    pub current_step: i32,
    pub history: Vec<HistoryEntry>,
    pub status: DocumentStatus,
    /// Equals `department_ids[current_step]` while in progress with a bound
    /// workflow; empty otherwise.
    pub pending_department_id: String,
    pub initiator_id: String,
    pub initiator_name: String,
}

impl DocumentRecord {
    pub fn is_draft(&self) -> bool {
        self.workflow_id.is_empty()
    }

    /// Current-step index as a usize, when a workflow is bound.
    pub fn step_index(&self) -> Option<usize> {
        usize::try_from(self.current_step).ok()
    }
}

/// Payload for creating a draft document. The store fills in the workflow
/// fields (empty), history (empty), status and initiator attribution.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub name: String,
    pub doc_type: String,
    pub content: String,
    pub file_url: String,
    pub initiator_id: String,
    pub initiator_name: String,
}

/// Partial update for a document. Every workflow transition is written as a
/// patch against a known version (see `DocumentStore::update_document`).
#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub name: Option<String>,
    pub doc_type: Option<String>,
    pub content: Option<String>,
    pub file_url: Option<String>,
    pub workflow_id: Option<String>,
    pub current_step: Option<i32>,
    pub history: Option<Vec<HistoryEntry>>,
    pub status: Option<DocumentStatus>,
    pub pending_department_id: Option<String>,
}

impl DocumentPatch {
    pub fn apply(&self, doc: &mut DocumentRecord) {
        if let Some(name) = &self.name {
            doc.name = name.clone();
        }
        if let Some(doc_type) = &self.doc_type {
            doc.doc_type = doc_type.clone();
        }
        if let Some(content) = &self.content {
            doc.content = content.clone();
        }
        if let Some(file_url) = &self.file_url {
            doc.file_url = file_url.clone();
        }
        if let Some(workflow_id) = &self.workflow_id {
            doc.workflow_id = workflow_id.clone();
        }
        if let Some(current_step) = self.current_step {
            doc.current_step = current_step;
        }
        if let Some(history) = &self.history {
            doc.history = history.clone();
        }
        if let Some(status) = self.status {
            doc.status = status;
        }
        if let Some(pending_department_id) = &self.pending_department_id {
            doc.pending_department_id = pending_department_id.clone();
        }
    }
}

/// Conjunctive filter over the documents collection, mirroring the query
/// shapes the dashboard issues against the backing store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentQuery {
    pub status: Option<DocumentStatus>,
    pub pending_department_id: Option<String>,
    pub initiator_id: Option<String>,
}

impl DocumentQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn in_progress() -> Self {
        Self {
            status: Some(DocumentStatus::InProgress),
            ..Self::default()
        }
    }

    pub fn pending_at(mut self, department_id: impl Into<String>) -> Self {
        self.pending_department_id = Some(department_id.into());
        self
    }

    pub fn initiated_by(mut self, user_id: impl Into<String>) -> Self {
        self.initiator_id = Some(user_id.into());
        self
    }

    pub fn matches(&self, doc: &DocumentRecord) -> bool {
        if let Some(status) = self.status {
            if doc.status != status {
                return false;
            }
        }
        if let Some(pending) = &self.pending_department_id {
            if &doc.pending_department_id != pending {
                return false;
            }
        }
        if let Some(initiator) = &self.initiator_id {
            if &doc.initiator_id != initiator {
                return false;
            }
        }
        true
    }
}

/// Closed role enumeration. Serialized with the exact display strings the
/// record store uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Administrator,
    #[serde(rename = "Health Promoter")]
    HealthPromoter,
    #[serde(rename = "TDHS")]
    Tdhs,
    #[serde(rename = "Sub - District 1A User's Controller")]
    SubDistrict1AController,
    #[serde(rename = "Sub - District 1B User's Controller")]
    SubDistrict1BController,
    #[serde(rename = "Sub - District 2 User's Controller")]
    SubDistrict2Controller,
    #[serde(rename = "Sub - District 3 & 4 User's Controller")]
    SubDistrict3And4Controller,
    #[serde(rename = "Sub - District 5 & 6 User's Controller")]
    SubDistrict5And6Controller,
    #[serde(rename = "Sub - District 7 User's Controller")]
    SubDistrict7Controller,
}

impl Role {
    pub fn is_administrator(&self) -> bool {
        matches!(self, Role::Administrator)
    }

    pub fn is_health_promoter(&self) -> bool {
        matches!(self, Role::HealthPromoter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserStatus {
    Active,
    Deleted,
}

/// Application user. Identity lives with the external identity provider;
/// this record carries role and department membership. Users are only ever
/// soft-deleted by flipping `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub persal_id: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    pub status: UserStatus,
}

/// A document read paired with the store version that produced it. Feed the
/// version back into `update_document` for a conditional write.
#[derive(Debug, Clone)]
pub struct Versioned {
    pub record: DocumentRecord,
    pub version: u64,
}
