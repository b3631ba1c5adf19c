use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tracing::debug;

use super::domain::{AssetPayload, AuthContext, OwnerInfo};
use super::uploader::AssetUploader;
use super::workflow::{PropertyField, SubmissionWorkflow, SubmitOutcome, WorkflowError};
use crate::listings::{Listing, ListingRepository, PersistError};
use crate::router::ApiState;

/// Header carrying the authenticated caller's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// One complete submission: both workflow steps plus the optional image.
#[derive(Debug, Deserialize)]
pub struct ListingSubmissionRequest {
    pub owner: OwnerInfo,
    pub property: PropertySubmission,
    #[serde(default)]
    pub image: Option<ImageSubmission>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PropertySubmission {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: String,
    #[serde(deserialize_with = "deserialize_price")]
    pub price: String,
    pub gender_preference: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageSubmission {
    pub file_name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageSubmission {
    fn into_payload(self) -> AssetPayload {
        let content_type = match self.content_type.as_deref().map(str::parse::<mime::Mime>) {
            Some(Ok(parsed)) => parsed,
            Some(Err(_)) => {
                debug!(
                    file_name = %self.file_name,
                    "unparseable content type; storing as octet-stream"
                );
                mime::APPLICATION_OCTET_STREAM
            }
            None => mime::APPLICATION_OCTET_STREAM,
        };
        AssetPayload::new(self.file_name, content_type, self.bytes)
    }
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(raw) => Ok(raw),
        Value::Number(number) => Ok(number.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "price must be a string or number, got {other}"
        ))),
    }
}

impl WorkflowError {
    pub(crate) fn status_code(&self) -> StatusCode {
        match self {
            WorkflowError::Validation(_) | WorkflowError::Persist(PersistError::Constraint(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            WorkflowError::Authentication => StatusCode::UNAUTHORIZED,
            WorkflowError::InvalidState { .. } => StatusCode::CONFLICT,
            WorkflowError::Upload(_) | WorkflowError::Persist(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

pub(crate) async fn submit_handler<R, U>(
    State(state): State<ApiState<R, U>>,
    headers: HeaderMap,
    Json(request): Json<ListingSubmissionRequest>,
) -> Response
where
    R: ListingRepository + 'static,
    U: AssetUploader + 'static,
{
    let auth = AuthContext::from_user_id(
        headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok()),
    );
    // One workflow per request; duplicate-submit gating is scoped to that workflow.
    let workflow = SubmissionWorkflow::new(state.repository, state.uploader);

    match run_submission(&workflow, request, &auth).await {
        Ok(listing) => (StatusCode::CREATED, Json(listing)).into_response(),
        Err(err) => {
            let payload = json!({
                "error": err.to_string(),
                "stage": workflow.stage(),
            });
            (err.status_code(), Json(payload)).into_response()
        }
    }
}

async fn run_submission<R, U>(
    workflow: &SubmissionWorkflow<R, U>,
    request: ListingSubmissionRequest,
    auth: &AuthContext,
) -> Result<Listing, WorkflowError>
where
    R: ListingRepository + 'static,
    U: AssetUploader + 'static,
{
    let ListingSubmissionRequest {
        owner,
        property,
        image,
    } = request;

    workflow.set_owner(owner)?;
    workflow.advance()?;

    let fields = [
        (PropertyField::Title, property.title),
        (PropertyField::Description, property.description),
        (PropertyField::Category, property.category),
        (PropertyField::Location, property.location),
        (PropertyField::Price, property.price),
        (PropertyField::GenderPreference, property.gender_preference),
    ];
    for (field, value) in fields {
        workflow.set_property_field(field, &value)?;
    }
    if let Some(image) = image {
        workflow.attach_image(image.into_payload())?;
    }

    match workflow.submit(auth).await? {
        SubmitOutcome::Committed(listing) => Ok(listing),
        SubmitOutcome::Ignored => Err(WorkflowError::InvalidState {
            stage: workflow.stage(),
            action: "submit",
        }),
    }
}
