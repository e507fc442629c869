//! User directory: administrator-managed accounts backed by an external
//! identity provider plus the users collection. Accounts are only ever
//! soft-deleted; the record survives with status Deleted.

use std::sync::Arc;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::policy;
use crate::store::{DocumentStore, Role, StoreError, User, UserStatus};

static PERSAL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{8}$").expect("persal id pattern"));

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("persal number must be exactly 8 digits")]
    InvalidPersalId,
    #[error("only administrators can manage users")]
    Forbidden,
    #[error("identity provider error: {0}")]
    Identity(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// External authentication collaborator. The application never stores
/// credentials; it only records the uid the provider hands back.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_account(&self, email: &str, password: &str) -> Result<String, DirectoryError>;
}

/// Development stand-in that mints opaque uids locally.
#[derive(Debug, Default)]
pub struct LocalIdentityProvider;

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn create_account(&self, _email: &str, _password: &str) -> Result<String, DirectoryError> {
        Ok(Uuid::new_v4().to_string())
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub persal_id: String,
    pub role: Role,
    pub department_id: Option<String>,
}

pub struct UserDirectory<S: DocumentStore, P: IdentityProvider> {
    store: Arc<S>,
    identity: Arc<P>,
}

impl<S: DocumentStore, P: IdentityProvider> UserDirectory<S, P> {
    pub fn new(store: Arc<S>, identity: Arc<P>) -> Self {
        Self { store, identity }
    }

    /// Create an identity-provider account and the matching user record.
    /// All validation happens before any state changes.
    pub async fn add_user(
        &self,
        actor: &User,
        new: NewUser,
        password: &str,
        confirm_password: &str,
    ) -> Result<User, DirectoryError> {
        if !policy::can_manage_users(actor.role) {
            return Err(DirectoryError::Forbidden);
        }
        if new.name.trim().is_empty() {
            return Err(DirectoryError::MissingField("name"));
        }
        if new.email.trim().is_empty() {
            return Err(DirectoryError::MissingField("email"));
        }
        if password.is_empty() {
            return Err(DirectoryError::MissingField("password"));
        }
        if password != confirm_password {
            return Err(DirectoryError::PasswordMismatch);
        }
        if !PERSAL_ID.is_match(&new.persal_id) {
            return Err(DirectoryError::InvalidPersalId);
        }

        let uid = self.identity.create_account(&new.email, password).await?;
        let user = User {
            id: uid,
            name: new.name,
            email: new.email,
            persal_id: new.persal_id,
            role: new.role,
            department_id: new.department_id,
            status: UserStatus::Active,
        };
        self.store.insert_user(user.clone()).await?;
        info!(user_id = %user.id, role = ?user.role, "user account created");
        Ok(user)
    }

    pub async fn update_role(
        &self,
        actor: &User,
        user_id: &str,
        role: Role,
    ) -> Result<(), DirectoryError> {
        if !policy::can_manage_users(actor.role) {
            return Err(DirectoryError::Forbidden);
        }
        Ok(self.store.set_user_role(user_id, role).await?)
    }

    /// Soft delete: flips the record's status. Removing the identity
    /// account is a backend concern outside this directory.
    pub async fn soft_delete(&self, actor: &User, user_id: &str) -> Result<(), DirectoryError> {
        if !policy::can_manage_users(actor.role) {
            return Err(DirectoryError::Forbidden);
        }
        self.store.set_user_status(user_id, UserStatus::Deleted).await?;
        info!(user_id, "user soft-deleted");
        Ok(())
    }

    pub async fn list_users(&self, actor: &User) -> Result<Vec<User>, DirectoryError> {
        if !policy::can_manage_users(actor.role) {
            return Err(DirectoryError::Forbidden);
        }
        Ok(self.store.list_users().await?)
    }
}
