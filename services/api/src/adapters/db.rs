//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use inspection_core::domain::{
    Equipment, NewSubmission, Role, Submission, SubmissionFields, SubmissionStatus,
    SubmissionWithOwner, User, UserCredentials,
};
use inspection_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const SUBMISSION_COLUMNS: &str = "t.id, t.user_id, t.service_type, t.company_name, t.details, \
     t.document_path, t.equipment_kind, t.equipment_brand, t.equipment_model, \
     t.equipment_serial, t.equipment_capacity, t.inspection_location, t.status, t.created_at";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
}
impl UserRecord {
    fn to_domain(self) -> PortResult<UserCredentials> {
        Ok(UserCredentials {
            user: User {
                id: self.id,
                name: self.name,
                email: self.email,
                role: parse_role(&self.role)?,
            },
            password_hash: self.password_hash,
        })
    }
}

#[derive(FromRow)]
struct SubmissionRecord {
    id: Uuid,
    user_id: Uuid,
    service_type: String,
    company_name: String,
    details: String,
    document_path: Option<String>,
    equipment_kind: String,
    equipment_brand: String,
    equipment_model: String,
    equipment_serial: String,
    equipment_capacity: String,
    inspection_location: String,
    status: String,
    created_at: DateTime<Utc>,
}
impl SubmissionRecord {
    fn to_domain(self) -> PortResult<Submission> {
        let status = self.status.parse::<SubmissionStatus>().map_err(|s| {
            PortError::Unexpected(format!("Unknown status '{}' stored for {}", s, self.id))
        })?;
        Ok(Submission {
            id: self.id,
            user_id: self.user_id,
            fields: SubmissionFields {
                service_type: self.service_type,
                company_name: self.company_name,
                details: self.details,
                equipment: Equipment {
                    kind: self.equipment_kind,
                    brand: self.equipment_brand,
                    model: self.equipment_model,
                    serial: self.equipment_serial,
                    capacity: self.equipment_capacity,
                },
                inspection_location: self.inspection_location,
            },
            document_path: self.document_path,
            status,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct SubmissionWithOwnerRecord {
    #[sqlx(flatten)]
    submission: SubmissionRecord,
    owner_name: String,
}

fn parse_role(role: &str) -> PortResult<Role> {
    role.parse::<Role>().map_err(PortError::Unexpected)
}

/// Maps driver errors, turning the two constraint violations we rely on into
/// their port-level meaning.
fn map_db_error(e: sqlx::Error, what: impl FnOnce() -> String) -> PortError {
    match &e {
        sqlx::Error::RowNotFound => PortError::NotFound(what()),
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some("23505") => PortError::Conflict(what()),
            Some("23503") => PortError::NotFound(what()),
            _ => PortError::Unexpected(e.to_string()),
        },
        _ => PortError::Unexpected(e.to_string()),
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, email, password_hash, role",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, || format!("User with email {}", email)))?;

        Ok(record.to_domain()?.user)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, password_hash, role FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, || format!("User with email {}", email)))?
        .to_domain()
    }

    async fn get_user_role(&self, user_id: Uuid) -> PortResult<Role> {
        let role: String = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, || format!("User {}", user_id)))?;
        parse_role(&role)
    }

    async fn create_submission(&self, submission: NewSubmission) -> PortResult<Submission> {
        let fields = &submission.fields;
        let sql = format!(
            "INSERT INTO test_submissions AS t \
             (user_id, service_type, company_name, details, document_path, equipment_kind, \
              equipment_brand, equipment_model, equipment_serial, equipment_capacity, \
              inspection_location, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'pending') \
             RETURNING {}",
            SUBMISSION_COLUMNS
        );
        sqlx::query_as::<_, SubmissionRecord>(&sql)
            .bind(submission.user_id)
            .bind(&fields.service_type)
            .bind(&fields.company_name)
            .bind(&fields.details)
            .bind(&submission.document_path)
            .bind(&fields.equipment.kind)
            .bind(&fields.equipment.brand)
            .bind(&fields.equipment.model)
            .bind(&fields.equipment.serial)
            .bind(&fields.equipment.capacity)
            .bind(&fields.inspection_location)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, || format!("User {}", submission.user_id)))?
            .to_domain()
    }

    async fn get_submission(&self, submission_id: Uuid) -> PortResult<Submission> {
        let sql = format!(
            "SELECT {} FROM test_submissions t WHERE t.id = $1",
            SUBMISSION_COLUMNS
        );
        sqlx::query_as::<_, SubmissionRecord>(&sql)
            .bind(submission_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, || format!("Submission {}", submission_id)))?
            .to_domain()
    }

    async fn list_submissions_by_user(&self, user_id: Uuid) -> PortResult<Vec<Submission>> {
        let sql = format!(
            "SELECT {} FROM test_submissions t WHERE t.user_id = $1 ORDER BY t.created_at DESC",
            SUBMISSION_COLUMNS
        );
        let records = sqlx::query_as::<_, SubmissionRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn list_all_submissions(&self) -> PortResult<Vec<SubmissionWithOwner>> {
        let sql = format!(
            "SELECT {}, u.name AS owner_name FROM test_submissions t \
             JOIN users u ON t.user_id = u.id ORDER BY t.created_at DESC",
            SUBMISSION_COLUMNS
        );
        let records = sqlx::query_as::<_, SubmissionWithOwnerRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        records
            .into_iter()
            .map(|r| {
                Ok(SubmissionWithOwner {
                    submission: r.submission.to_domain()?,
                    owner_name: r.owner_name,
                })
            })
            .collect()
    }

    async fn update_submission_fields(
        &self,
        submission_id: Uuid,
        fields: &SubmissionFields,
    ) -> PortResult<()> {
        sqlx::query(
            "UPDATE test_submissions SET service_type = $1, company_name = $2, details = $3, \
             equipment_kind = $4, equipment_brand = $5, equipment_model = $6, \
             equipment_serial = $7, equipment_capacity = $8, inspection_location = $9 \
             WHERE id = $10",
        )
        .bind(&fields.service_type)
        .bind(&fields.company_name)
        .bind(&fields.details)
        .bind(&fields.equipment.kind)
        .bind(&fields.equipment.brand)
        .bind(&fields.equipment.model)
        .bind(&fields.equipment.serial)
        .bind(&fields.equipment.capacity)
        .bind(&fields.inspection_location)
        .bind(submission_id)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn update_submission_status(
        &self,
        submission_id: Uuid,
        status: SubmissionStatus,
    ) -> PortResult<()> {
        sqlx::query("UPDATE test_submissions SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(submission_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn delete_submission(&self, submission_id: Uuid) -> PortResult<()> {
        sqlx::query("DELETE FROM test_submissions WHERE id = $1")
            .bind(submission_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
