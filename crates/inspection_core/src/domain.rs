//! crates/inspection_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Roles
//=========================================================================================

/// The two roles a user can hold. Every account starts as `User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    /// The expert role, allowed to review every submission and change its status.
    Ahli,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Ahli => "ahli",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "ahli" => Ok(Role::Ahli),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

//=========================================================================================
// Users
//=========================================================================================

// Represents a user - safe to hand to the web layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// The caller as recovered from a session token. `role` is the snapshot taken
/// when the token was minted and may be stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

//=========================================================================================
// Submissions
//=========================================================================================

/// Review status of a submission. Only these values are ever persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionStatus {
    Pending,
    ApprovedAdmin,
    Rejected,
    MenungguJadwal,
    Terjadwal,
    SelesaiLayak,
    SelesaiTidakLayak,
}

impl SubmissionStatus {
    pub const ALL: [SubmissionStatus; 7] = [
        SubmissionStatus::Pending,
        SubmissionStatus::ApprovedAdmin,
        SubmissionStatus::Rejected,
        SubmissionStatus::MenungguJadwal,
        SubmissionStatus::Terjadwal,
        SubmissionStatus::SelesaiLayak,
        SubmissionStatus::SelesaiTidakLayak,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::ApprovedAdmin => "approved_admin",
            SubmissionStatus::Rejected => "rejected",
            SubmissionStatus::MenungguJadwal => "menunggu_jadwal",
            SubmissionStatus::Terjadwal => "terjadwal",
            SubmissionStatus::SelesaiLayak => "selesai_layak",
            SubmissionStatus::SelesaiTidakLayak => "selesai_tidak_layak",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SubmissionStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Identification of the piece of equipment to be inspected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Equipment {
    pub kind: String,
    pub brand: String,
    pub model: String,
    pub serial: String,
    pub capacity: String,
}

/// The editable part of a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionFields {
    pub service_type: String,
    pub company_name: String,
    pub details: String,
    pub equipment: Equipment,
    pub inspection_location: String,
}

/// An equipment-inspection request and its review state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub fields: SubmissionFields,
    pub document_path: Option<String>,
    pub status: SubmissionStatus,
    pub created_at: DateTime<Utc>,
}

/// A submission joined with its owner's display name, as shown to experts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionWithOwner {
    pub submission: Submission,
    pub owner_name: String,
}

/// What the store needs to persist a fresh submission. Status is not part of it:
/// every new submission starts as `pending`.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub user_id: Uuid,
    pub fields: SubmissionFields,
    pub document_path: Option<String>,
}

/// A document uploaded alongside a submission.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A requested change to a submission's fields.
///
/// A field that is `None` or an empty string keeps its previous value. There is
/// no way to clear a field through an edit.
#[derive(Debug, Clone, Default)]
pub struct SubmissionEdit {
    pub service_type: Option<String>,
    pub company_name: Option<String>,
    pub details: Option<String>,
    pub equipment_kind: Option<String>,
    pub equipment_brand: Option<String>,
    pub equipment_model: Option<String>,
    pub equipment_serial: Option<String>,
    pub equipment_capacity: Option<String>,
    pub inspection_location: Option<String>,
}

impl SubmissionEdit {
    /// Produces the fields that result from applying this edit to `current`.
    pub fn merge_into(&self, current: &SubmissionFields) -> SubmissionFields {
        fn pick(new: &Option<String>, old: &str) -> String {
            match new.as_deref() {
                Some(value) if !value.is_empty() => value.to_string(),
                _ => old.to_string(),
            }
        }

        SubmissionFields {
            service_type: pick(&self.service_type, &current.service_type),
            company_name: pick(&self.company_name, &current.company_name),
            details: pick(&self.details, &current.details),
            equipment: Equipment {
                kind: pick(&self.equipment_kind, &current.equipment.kind),
                brand: pick(&self.equipment_brand, &current.equipment.brand),
                model: pick(&self.equipment_model, &current.equipment.model),
                serial: pick(&self.equipment_serial, &current.equipment.serial),
                capacity: pick(&self.equipment_capacity, &current.equipment.capacity),
            },
            inspection_location: pick(&self.inspection_location, &current.inspection_location),
        }
    }
}
