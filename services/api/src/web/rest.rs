//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the submission endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    auth::{LoginRequest, LoginResponse, RegisterRequest, UserSummary},
    error::{HttpError, MessageResponse},
    protocol::ServerMessage,
    state::AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    response::Json,
    Extension,
};
use chrono::{DateTime, Utc};
use inspection_core::{
    Identity, ServiceError, Submission, SubmissionEdit, SubmissionFields, SubmissionStatus,
    SubmissionWithOwner, UploadedDocument, ValidationError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::register_handler,
        crate::web::auth::login_handler,
        submit_handler,
        list_mine_handler,
        list_all_handler,
        edit_handler,
        update_status_handler,
        delete_handler,
    ),
    components(
        schemas(
            RegisterRequest, LoginRequest, LoginResponse, UserSummary, MessageResponse,
            SubmitResponse, SubmissionResponse, OwnedSubmissionResponse,
            EditSubmissionRequest, UpdateStatusRequest
        )
    ),
    tags(
        (name = "Inspection Submissions API", description = "Equipment-inspection requests and their expert review.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct SubmitResponse {
    pub message: String,
    pub id: Uuid,
}

#[derive(Serialize, ToSchema)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_type: String,
    pub company_name: String,
    pub details: String,
    pub document_path: Option<String>,
    pub equipment_type: String,
    pub equipment_brand: String,
    pub equipment_model: String,
    pub equipment_serial: String,
    pub equipment_capacity: String,
    pub inspection_location: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Submission> for SubmissionResponse {
    fn from(s: Submission) -> Self {
        let f = s.fields;
        Self {
            id: s.id,
            user_id: s.user_id,
            service_type: f.service_type,
            company_name: f.company_name,
            details: f.details,
            document_path: s.document_path,
            equipment_type: f.equipment.kind,
            equipment_brand: f.equipment.brand,
            equipment_model: f.equipment.model,
            equipment_serial: f.equipment.serial,
            equipment_capacity: f.equipment.capacity,
            inspection_location: f.inspection_location,
            status: s.status.to_string(),
            created_at: s.created_at,
        }
    }
}

/// A submission as listed for experts, with the owner's name alongside.
#[derive(Serialize, ToSchema)]
pub struct OwnedSubmissionResponse {
    #[serde(flatten)]
    pub submission: SubmissionResponse,
    pub user_name: String,
}

impl From<SubmissionWithOwner> for OwnedSubmissionResponse {
    fn from(s: SubmissionWithOwner) -> Self {
        Self {
            submission: s.submission.into(),
            user_name: s.owner_name,
        }
    }
}

/// Fields left out or sent as empty strings keep their current value.
#[derive(Deserialize, Default, ToSchema)]
pub struct EditSubmissionRequest {
    pub service_type: Option<String>,
    pub company_name: Option<String>,
    pub details: Option<String>,
    pub equipment_type: Option<String>,
    pub equipment_brand: Option<String>,
    pub equipment_model: Option<String>,
    pub equipment_serial: Option<String>,
    pub equipment_capacity: Option<String>,
    pub inspection_location: Option<String>,
}

impl From<EditSubmissionRequest> for SubmissionEdit {
    fn from(r: EditSubmissionRequest) -> Self {
        Self {
            service_type: r.service_type,
            company_name: r.company_name,
            details: r.details,
            equipment_kind: r.equipment_type,
            equipment_brand: r.equipment_brand,
            equipment_model: r.equipment_model,
            equipment_serial: r.equipment_serial,
            equipment_capacity: r.equipment_capacity,
            inspection_location: r.inspection_location,
        }
    }
}

#[derive(Deserialize, Default, ToSchema)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
}

//=========================================================================================
// Multipart Parsing
//=========================================================================================

/// Name of the multipart part that carries the optional document.
const DOCUMENT_FIELD: &str = "document";

async fn read_submission_form(
    mut multipart: Multipart,
) -> Result<(SubmissionFields, Option<UploadedDocument>), HttpError> {
    let mut fields = SubmissionFields::default();
    let mut document = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Malformed multipart body: {}", e);
        HttpError::from(ValidationError::MissingField("multipart body"))
    })? {
        let name = field.name().unwrap_or_default().to_string();
        if name == DOCUMENT_FIELD {
            let file_name = field.file_name().unwrap_or("document").to_string();
            let bytes = field.bytes().await.map_err(|e| {
                debug!("Failed to read upload part: {}", e);
                HttpError::from(ValidationError::MalformedBody)
            })?;
            document = Some(UploadedDocument {
                file_name,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field.text().await.map_err(|e| {
            debug!("Failed to read form field '{}': {}", name, e);
            HttpError::from(ValidationError::MalformedBody)
        })?;
        let slot = match name.as_str() {
            "service_type" => &mut fields.service_type,
            "company_name" => &mut fields.company_name,
            "details" => &mut fields.details,
            "equipment_type" => &mut fields.equipment.kind,
            "equipment_brand" => &mut fields.equipment.brand,
            "equipment_model" => &mut fields.equipment.model,
            "equipment_serial" => &mut fields.equipment.serial,
            "equipment_capacity" => &mut fields.equipment.capacity,
            "inspection_location" => &mut fields.inspection_location,
            other => {
                debug!("Ignoring unknown form field '{}'", other);
                continue;
            }
        };
        *slot = value;
    }

    Ok((fields, document))
}

//=========================================================================================
// Request Input
//=========================================================================================

/// An id that is not a UUID names no submission.
fn parse_submission_id(raw: &str) -> Result<Uuid, HttpError> {
    raw.parse()
        .map_err(|_| HttpError(ServiceError::NotFound(format!("Submission {}", raw))))
}

/// A request without a JSON content type is read as an empty object.
fn json_body<T: Default>(body: Result<Json<T>, JsonRejection>) -> Result<T, HttpError> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => {
            debug!("Rejected request body: {}", rejection);
            Err(ValidationError::MalformedBody.into())
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// File a new inspection request.
///
/// Accepts multipart/form-data with the submission's text fields and an
/// optional `document` file part. The new submission starts as `pending`.
#[utoipa::path(
    post,
    path = "/api/test/submissions",
    request_body(content_type = "multipart/form-data", description = "Submission fields and an optional document."),
    responses(
        (status = 200, description = "Submission created", body = SubmitResponse),
        (status = 401, description = "No credential", body = MessageResponse),
        (status = 403, description = "Invalid credential", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    ),
    security(("bearer" = []))
)]
pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    multipart: Multipart,
) -> Result<Json<SubmitResponse>, HttpError> {
    let (fields, document) = read_submission_form(multipart).await?;
    let id = state
        .submissions
        .submit(caller.user_id, fields, document)
        .await?;
    Ok(Json(SubmitResponse {
        message: "Submission sent".to_string(),
        id,
    }))
}

/// The caller's own submissions, newest first.
#[utoipa::path(
    get,
    path = "/api/test/submissions/mine",
    responses(
        (status = 200, description = "Own submissions", body = [SubmissionResponse]),
        (status = 401, description = "No credential", body = MessageResponse),
        (status = 403, description = "Invalid credential", body = MessageResponse)
    ),
    security(("bearer" = []))
)]
pub async fn list_mine_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<Vec<SubmissionResponse>>, HttpError> {
    let submissions = state.submissions.list_own(caller.user_id).await?;
    Ok(Json(submissions.into_iter().map(Into::into).collect()))
}

/// Every submission with its owner's name. Experts only.
#[utoipa::path(
    get,
    path = "/api/test/submissions/all",
    responses(
        (status = 200, description = "All submissions", body = [OwnedSubmissionResponse]),
        (status = 403, description = "Caller is not an expert", body = MessageResponse)
    ),
    security(("bearer" = []))
)]
pub async fn list_all_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
) -> Result<Json<Vec<OwnedSubmissionResponse>>, HttpError> {
    let submissions = state.submissions.list_all(&caller).await?;
    Ok(Json(submissions.into_iter().map(Into::into).collect()))
}

/// Edit a submission's fields. Owner or expert.
#[utoipa::path(
    patch,
    path = "/api/test/submissions/{id}",
    request_body = EditSubmissionRequest,
    params(("id" = Uuid, Path, description = "Submission id")),
    responses(
        (status = 200, description = "Submission updated", body = MessageResponse),
        (status = 400, description = "Malformed body", body = MessageResponse),
        (status = 403, description = "Neither owner nor expert", body = MessageResponse),
        (status = 404, description = "No such submission", body = MessageResponse)
    ),
    security(("bearer" = []))
)]
pub async fn edit_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
    body: Result<Json<EditSubmissionRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, HttpError> {
    let req = json_body(body)?;
    let id = parse_submission_id(&id)?;
    state.submissions.edit(&caller, id, req.into()).await?;
    Ok(Json(MessageResponse::new("Submission updated")))
}

/// Change a submission's status. Experts only. Notifies the owner if online.
#[utoipa::path(
    patch,
    path = "/api/test/submissions/{id}/status",
    request_body = UpdateStatusRequest,
    params(("id" = Uuid, Path, description = "Submission id")),
    responses(
        (status = 200, description = "Status changed", body = MessageResponse),
        (status = 400, description = "Status not allowed or malformed body", body = MessageResponse),
        (status = 403, description = "Caller is not an expert", body = MessageResponse),
        (status = 404, description = "No such submission", body = MessageResponse)
    ),
    security(("bearer" = []))
)]
pub async fn update_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, HttpError> {
    let req = json_body(body)?;
    let id = match parse_submission_id(&id) {
        Ok(id) => id,
        Err(not_found) => {
            // The status value is judged before the target, as for well-formed ids.
            req.status
                .parse::<SubmissionStatus>()
                .map_err(ValidationError::BadStatus)?;
            return Err(not_found);
        }
    };
    let submission = state
        .submissions
        .update_status(&caller, id, &req.status)
        .await?;

    let owner = submission.user_id.to_string();
    if let Some(connection) = state.presence.lookup(&owner).await {
        let delivered = connection.send(ServerMessage::StatusChanged {
            submission_id: submission.id,
            status: submission.status.to_string(),
        });
        if !delivered {
            warn!(user_id = %owner, "Owner's presence connection is already closed");
        }
    }

    Ok(Json(MessageResponse::new(format!(
        "Status changed to {}",
        submission.status
    ))))
}

/// Permanently delete a submission. Owner or expert.
#[utoipa::path(
    delete,
    path = "/api/test/submissions/{id}",
    params(("id" = Uuid, Path, description = "Submission id")),
    responses(
        (status = 200, description = "Submission deleted", body = MessageResponse),
        (status = 403, description = "Neither owner nor expert", body = MessageResponse),
        (status = 404, description = "No such submission", body = MessageResponse)
    ),
    security(("bearer" = []))
)]
pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, HttpError> {
    let id = parse_submission_id(&id)?;
    state.submissions.delete(&caller, id).await?;
    Ok(Json(MessageResponse::new("Submission deleted")))
}
