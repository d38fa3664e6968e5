//! crates/inspection_core/src/lifecycle.rs
//!
//! Creation, listing, editing, status changes and deletion of submissions.
//!
//! Resource-targeted mutations check in a fixed order: the target must exist,
//! then the caller must be authorized, then the store is mutated. The read and
//! the write are separate statements; a concurrent delete between them is not
//! guarded against.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    Identity, NewSubmission, Submission, SubmissionEdit, SubmissionFields, SubmissionStatus,
    SubmissionWithOwner, UploadedDocument,
};
use crate::error::{ServiceResult, ValidationError};
use crate::identity::IdentityResolver;
use crate::policy::{self, Operation};
use crate::ports::{DatabaseService, DocumentStore};

pub struct SubmissionService {
    db: Arc<dyn DatabaseService>,
    documents: Arc<dyn DocumentStore>,
    resolver: Arc<IdentityResolver>,
}

impl SubmissionService {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        documents: Arc<dyn DocumentStore>,
        resolver: Arc<IdentityResolver>,
    ) -> Self {
        Self {
            db,
            documents,
            resolver,
        }
    }

    /// Files a new submission for `owner_id`. It always starts as `pending`.
    pub async fn submit(
        &self,
        owner_id: Uuid,
        fields: SubmissionFields,
        document: Option<UploadedDocument>,
    ) -> ServiceResult<Uuid> {
        let document_path = match document {
            Some(doc) => Some(self.documents.store(&doc.file_name, &doc.bytes).await?),
            None => None,
        };

        let created = self
            .db
            .create_submission(NewSubmission {
                user_id: owner_id,
                fields,
                document_path: document_path.clone(),
            })
            .await;
        let submission = match created {
            Ok(submission) => submission,
            Err(err) => {
                // The row never landed, so the stored file has no owner.
                if let Some(path) = document_path {
                    if let Err(e) = self.documents.discard(&path).await {
                        warn!(file = %path, "Failed to discard orphaned upload: {}", e);
                    }
                }
                return Err(err.into());
            }
        };

        info!(submission_id = %submission.id, user_id = %owner_id, "Submission created");
        Ok(submission.id)
    }

    /// The caller's own submissions, newest first.
    pub async fn list_own(&self, owner_id: Uuid) -> ServiceResult<Vec<Submission>> {
        policy::authorize(Operation::ListOwnSubmissions, owner_id, None, None)?;
        Ok(self.db.list_submissions_by_user(owner_id).await?)
    }

    /// Every submission with its owner's name, newest first. Experts only.
    pub async fn list_all(&self, caller: &Identity) -> ServiceResult<Vec<SubmissionWithOwner>> {
        self.authorize(Operation::ListAllSubmissions, caller, None).await?;
        Ok(self.db.list_all_submissions().await?)
    }

    /// Overwrites the fields given in `edit`; absent or empty fields keep their value.
    /// The document and the status are never touched here.
    pub async fn edit(
        &self,
        caller: &Identity,
        submission_id: Uuid,
        edit: SubmissionEdit,
    ) -> ServiceResult<()> {
        let current = self.db.get_submission(submission_id).await?;
        self.authorize(Operation::EditSubmission, caller, Some(current.user_id))
            .await?;

        let merged = edit.merge_into(&current.fields);
        self.db
            .update_submission_fields(submission_id, &merged)
            .await?;

        info!(%submission_id, user_id = %caller.user_id, "Submission edited");
        Ok(())
    }

    /// Moves a submission to `new_status`. Any allowed value may follow any other.
    ///
    /// Returns the submission as it stands after the change.
    pub async fn update_status(
        &self,
        caller: &Identity,
        submission_id: Uuid,
        new_status: &str,
    ) -> ServiceResult<Submission> {
        let status: SubmissionStatus = new_status
            .parse()
            .map_err(ValidationError::BadStatus)?;

        let mut submission = self.db.get_submission(submission_id).await?;
        self.authorize(Operation::UpdateStatus, caller, Some(submission.user_id))
            .await?;

        self.db
            .update_submission_status(submission_id, status)
            .await?;

        info!(
            %submission_id,
            from = %submission.status,
            to = %status,
            "Submission status changed"
        );
        submission.status = status;
        Ok(submission)
    }

    /// Permanently removes a submission.
    pub async fn delete(&self, caller: &Identity, submission_id: Uuid) -> ServiceResult<()> {
        let current = self.db.get_submission(submission_id).await?;
        self.authorize(Operation::DeleteSubmission, caller, Some(current.user_id))
            .await?;

        self.db.delete_submission(submission_id).await?;

        info!(%submission_id, user_id = %caller.user_id, "Submission deleted");
        Ok(())
    }

    /// Owners pass without a role lookup; everyone else has their role re-read
    /// from the store rather than trusting the token snapshot.
    async fn authorize(
        &self,
        op: Operation,
        caller: &Identity,
        owner_id: Option<Uuid>,
    ) -> ServiceResult<()> {
        if policy::granted_by_ownership(op, caller.user_id, owner_id) {
            return Ok(());
        }

        let role = self.resolver.current_role_if_known(caller.user_id).await?;
        policy::authorize(op, caller.user_id, role, owner_id).map_err(|e| {
            warn!(user_id = %caller.user_id, operation = ?op, "Access denied");
            e.into()
        })
    }
}
