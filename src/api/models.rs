use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::errors::TallyError;

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub member_ids: Vec<String>,
    #[serde(default)]
    pub simplify_debts: bool,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalancesQuery {
    pub group_id: Option<String>,
}

fn default_limit() -> usize {
    50
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivitiesQuery {
    pub group_id: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

// Error response struct
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// Newtype wrapper for TallyError to implement IntoResponse
pub struct ApiError(pub TallyError);

impl From<TallyError> for ApiError {
    fn from(err: TallyError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            TallyError::MissingField(_) | TallyError::InvalidAmount => StatusCode::BAD_REQUEST,
            TallyError::UserNotFound(_)
            | TallyError::GroupNotFound(_)
            | TallyError::ExpenseNotFound(_)
            | TallyError::SettlementNotFound(_) => StatusCode::NOT_FOUND,
            TallyError::EmailAlreadyRegistered(_) => StatusCode::CONFLICT,
            TallyError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            TallyError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            TallyError::StorageError(_)
            | TallyError::LoggingError(_)
            | TallyError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
