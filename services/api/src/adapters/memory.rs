//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the `DatabaseService` port. Used for local
//! development (`DATABASE_URL=memory`) and by the test suite. Enforces the same
//! constraints as the PostgreSQL schema: unique emails and existing owners.

use async_trait::async_trait;
use chrono::Utc;
use inspection_core::domain::{
    NewSubmission, Role, Submission, SubmissionFields, SubmissionStatus, SubmissionWithOwner,
    User, UserCredentials,
};
use inspection_core::ports::{DatabaseService, PortError, PortResult};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserCredentials>,
    /// Each row carries its insertion sequence so ties on `created_at` still
    /// order newest first.
    submissions: HashMap<Uuid, (u64, Submission)>,
    next_seq: u64,
}

impl Tables {
    fn submission_mut(&mut self, submission_id: Uuid) -> PortResult<&mut Submission> {
        self.submissions
            .get_mut(&submission_id)
            .map(|(_, s)| s)
            .ok_or_else(|| PortError::NotFound(format!("Submission {}", submission_id)))
    }
}

/// A `DatabaseService` that keeps every row in memory.
#[derive(Default)]
pub struct InMemoryDb {
    tables: RwLock<Tables>,
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Changes a user's role directly. No exposed operation promotes users; this
    /// is how experts get seeded.
    pub async fn set_role(&self, user_id: Uuid, role: Role) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        let creds = tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {}", user_id)))?;
        creds.user.role = role;
        Ok(())
    }
}

fn newest_first(rows: &mut [(u64, Submission)]) {
    rows.sort_by(|(seq_a, a), (seq_b, b)| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| seq_b.cmp(seq_a))
    });
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> PortResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|c| c.user.email == email) {
            return Err(PortError::Conflict(format!("User with email {}", email)));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            role,
        };
        tables.users.insert(
            user.id,
            UserCredentials {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.tables
            .read()
            .await
            .users
            .values()
            .find(|c| c.user.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User with email {}", email)))
    }

    async fn get_user_role(&self, user_id: Uuid) -> PortResult<Role> {
        self.tables
            .read()
            .await
            .users
            .get(&user_id)
            .map(|c| c.user.role)
            .ok_or_else(|| PortError::NotFound(format!("User {}", user_id)))
    }

    async fn create_submission(&self, submission: NewSubmission) -> PortResult<Submission> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&submission.user_id) {
            return Err(PortError::NotFound(format!("User {}", submission.user_id)));
        }

        let created = Submission {
            id: Uuid::new_v4(),
            user_id: submission.user_id,
            fields: submission.fields,
            document_path: submission.document_path,
            status: SubmissionStatus::Pending,
            created_at: Utc::now(),
        };
        let seq = tables.next_seq;
        tables.next_seq += 1;
        tables.submissions.insert(created.id, (seq, created.clone()));
        Ok(created)
    }

    async fn get_submission(&self, submission_id: Uuid) -> PortResult<Submission> {
        self.tables
            .read()
            .await
            .submissions
            .get(&submission_id)
            .map(|(_, s)| s.clone())
            .ok_or_else(|| PortError::NotFound(format!("Submission {}", submission_id)))
    }

    async fn list_submissions_by_user(&self, user_id: Uuid) -> PortResult<Vec<Submission>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = tables
            .submissions
            .values()
            .filter(|(_, s)| s.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut rows);
        Ok(rows.into_iter().map(|(_, s)| s).collect())
    }

    async fn list_all_submissions(&self) -> PortResult<Vec<SubmissionWithOwner>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = tables.submissions.values().cloned().collect();
        newest_first(&mut rows);
        Ok(rows
            .into_iter()
            .filter_map(|(_, submission)| {
                // Inner join: rows whose owner is gone are skipped.
                let owner = tables.users.get(&submission.user_id)?;
                Some(SubmissionWithOwner {
                    owner_name: owner.user.name.clone(),
                    submission,
                })
            })
            .collect())
    }

    async fn update_submission_fields(
        &self,
        submission_id: Uuid,
        fields: &SubmissionFields,
    ) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        // An UPDATE matching no row is not an error.
        if let Ok(submission) = tables.submission_mut(submission_id) {
            submission.fields = fields.clone();
        }
        Ok(())
    }

    async fn update_submission_status(
        &self,
        submission_id: Uuid,
        status: SubmissionStatus,
    ) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        if let Ok(submission) = tables.submission_mut(submission_id) {
            submission.status = status;
        }
        Ok(())
    }

    async fn delete_submission(&self, submission_id: Uuid) -> PortResult<()> {
        self.tables.write().await.submissions.remove(&submission_id);
        Ok(())
    }
}
