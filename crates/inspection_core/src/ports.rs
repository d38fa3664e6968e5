//! crates/inspection_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the relational store and the file storage behind it.

use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::{
    NewSubmission, Role, Submission, SubmissionFields, SubmissionStatus, SubmissionWithOwner,
    User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, disk).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The relational store. Each method is a single statement; no transaction spans
/// two calls.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---

    /// Fails with `Conflict` when the email is already registered.
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get_user_role(&self, user_id: Uuid) -> PortResult<Role>;

    // --- Submission Management ---

    /// Persists a submission with status `pending`. Fails with `NotFound` when
    /// the owner does not exist.
    async fn create_submission(&self, submission: NewSubmission) -> PortResult<Submission>;

    async fn get_submission(&self, submission_id: Uuid) -> PortResult<Submission>;

    /// Newest `created_at` first.
    async fn list_submissions_by_user(&self, user_id: Uuid) -> PortResult<Vec<Submission>>;

    /// Every submission joined with its owner's name, newest first.
    async fn list_all_submissions(&self) -> PortResult<Vec<SubmissionWithOwner>>;

    async fn update_submission_fields(
        &self,
        submission_id: Uuid,
        fields: &SubmissionFields,
    ) -> PortResult<()>;

    async fn update_submission_status(
        &self,
        submission_id: Uuid,
        status: SubmissionStatus,
    ) -> PortResult<()>;

    async fn delete_submission(&self, submission_id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores an uploaded document and returns the path it can later be found under.
    async fn store(&self, original_file_name: &str, bytes: &[u8]) -> PortResult<String>;

    /// Removes a document previously returned by `store`.
    async fn discard(&self, path: &str) -> PortResult<()>;
}
