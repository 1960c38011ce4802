use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::middleware::auth::CurrentOperator;
use crate::middleware::guard::RequireWriteAccess;
use crate::modules::operators::model::{MessageResponse, Operator};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{
    ChangePasswordDto, LoginRequest, LoginResponse, RequestResetDto, ResetPasswordDto,
    VerifyResponse,
};
use super::service::AuthService;

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing or malformed input", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login(&state.db, dto, &state.jwt_config).await?;
    Ok(Json(response))
}

/// Verify the bearer token and return fresh operator data
#[utoipa::path(
    get,
    path = "/api/auth/verify",
    responses(
        (status = 200, description = "Token valid", body = VerifyResponse),
        (status = 401, description = "Invalid token or operator no longer active", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state, current))]
pub async fn verify_token(
    State(state): State<AppState>,
    current: CurrentOperator,
) -> Result<Json<VerifyResponse>, AppError> {
    let operator = AuthService::find_operator(&state.db, current.id)
        .await?
        .ok_or_else(|| AppError::unauthorized("Operator not authorized"))?;

    Ok(Json(VerifyResponse {
        message: "Token valid".to_string(),
        operator,
    }))
}

/// Change the authenticated operator's password
#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Missing input or no password set", body = ErrorResponse),
        (status = 401, description = "Current password is not valid", body = ErrorResponse),
        (status = 404, description = "Operator not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state, current, dto))]
pub async fn change_password(
    State(state): State<AppState>,
    _write: RequireWriteAccess,
    current: CurrentOperator,
    ValidatedJson(dto): ValidatedJson<ChangePasswordDto>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::change_password(&state.db, current.id, dto).await?;
    Ok(Json(MessageResponse {
        message: "Password changed successfully".to_string(),
    }))
}

/// Get the current operator's profile
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current operator", body = Operator),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Operator not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Authentication"
)]
#[instrument(skip(state, current))]
pub async fn get_current_operator(
    State(state): State<AppState>,
    current: CurrentOperator,
) -> Result<Json<Operator>, AppError> {
    let operator = AuthService::find_operator(&state.db, current.id)
        .await?
        .ok_or_else(|| AppError::not_found("Operator not found"))?;

    Ok(Json(operator))
}

/// Request a password-reset email
#[utoipa::path(
    post,
    path = "/api/auth/request-reset",
    request_body = RequestResetDto,
    responses(
        (status = 200, description = "Same response whether or not the email exists", body = MessageResponse),
        (status = 400, description = "Missing or malformed email", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn request_reset(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RequestResetDto>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::request_reset(&state.db, &state.email_config, dto).await?;
    Ok(Json(MessageResponse {
        message: "If an account exists with that email, a password reset link has been sent."
            .to_string(),
    }))
}

/// Check whether a reset token is still valid
#[utoipa::path(
    get,
    path = "/api/auth/validate-reset-token/{token}",
    params(("token" = String, Path, description = "Reset token to check")),
    responses(
        (status = 200, description = "Token is valid", body = MessageResponse),
        (status = 400, description = "Token not found, used, or expired", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, token))]
pub async fn validate_reset_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if AuthService::validate_reset_token(&state.db, &token).await? {
        Ok(Json(MessageResponse {
            message: "Token is valid".to_string(),
        }))
    } else {
        Err(AppError::bad_request("Invalid or expired token"))
    }
}

/// Reset the password using a token from the reset email
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordDto,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Invalid or expired token", body = ErrorResponse),
        (status = 404, description = "Owning operator missing or not active", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<ResetPasswordDto>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::reset_password(&state.db, &state.email_config, dto).await?;
    Ok(Json(MessageResponse {
        message: "Password has been reset successfully. You can now log in with your new password."
            .to_string(),
    }))
}
