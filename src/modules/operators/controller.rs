use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::instrument;

use crate::middleware::guard::{RequireAdminProfile, RequireRootProfile, RequireWriteAccess};
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{
    CreateOperatorDto, FilterOperatorsRequest, FilterOperatorsResponse, MessageResponse, Operator,
    UpdateOperatorDto,
};
use super::service::OperatorService;

/// List all operators
#[utoipa::path(
    get,
    path = "/api/operators",
    responses(
        (status = 200, description = "All operators, password stripped", body = Vec<Operator>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Operators"
)]
#[instrument(skip(state))]
pub async fn get_all_operators(
    State(state): State<AppState>,
) -> Result<Json<Vec<Operator>>, AppError> {
    let operators = OperatorService::get_all(&state.db).await?;
    Ok(Json(operators))
}

/// Get one operator by id
#[utoipa::path(
    get,
    path = "/api/operators/{id}",
    params(("id" = i32, Path, description = "Operator id")),
    responses(
        (status = 200, description = "Operator", body = Operator),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Operator not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Operators"
)]
#[instrument(skip(state))]
pub async fn get_operator(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Operator>, AppError> {
    let operator = OperatorService::get(&state.db, id).await?;
    Ok(Json(operator))
}

/// Filter operators with pagination and sorting
#[utoipa::path(
    post,
    path = "/api/operators/filter",
    request_body = FilterOperatorsRequest,
    responses(
        (status = 200, description = "Page of matching operators", body = FilterOperatorsResponse),
        (status = 400, description = "Malformed body or invalid sort field", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Operators"
)]
#[instrument(skip(state, req))]
pub async fn filter_operators(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<FilterOperatorsRequest>,
) -> Result<Json<FilterOperatorsResponse>, AppError> {
    let page = OperatorService::filter(&state.db, req).await?;
    Ok(Json(page))
}

/// Create a new operator (root/admin only)
#[utoipa::path(
    post,
    path = "/api/operators",
    request_body = CreateOperatorDto,
    responses(
        (status = 201, description = "Operator created", body = Operator),
        (status = 400, description = "Validation error or email already in use", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Profile not authorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Operators"
)]
#[instrument(skip(state, dto))]
pub async fn create_operator(
    State(state): State<AppState>,
    _write: RequireWriteAccess,
    _admin: RequireAdminProfile,
    ValidatedJson(dto): ValidatedJson<CreateOperatorDto>,
) -> Result<(StatusCode, Json<Operator>), AppError> {
    let operator = OperatorService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(operator)))
}

/// Update an existing operator (root/admin only)
#[utoipa::path(
    put,
    path = "/api/operators/{id}",
    params(("id" = i32, Path, description = "Operator id")),
    request_body = UpdateOperatorDto,
    responses(
        (status = 200, description = "Operator updated", body = Operator),
        (status = 400, description = "Validation error or email already in use", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Profile not authorized", body = ErrorResponse),
        (status = 404, description = "Operator not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Operators"
)]
#[instrument(skip(state, dto))]
pub async fn update_operator(
    State(state): State<AppState>,
    _write: RequireWriteAccess,
    _admin: RequireAdminProfile,
    Path(id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdateOperatorDto>,
) -> Result<Json<Operator>, AppError> {
    let operator = OperatorService::update(&state.db, id, dto).await?;
    Ok(Json(operator))
}

/// Soft-delete an operator (root only)
#[utoipa::path(
    delete,
    path = "/api/operators/{id}",
    params(("id" = i32, Path, description = "Operator id")),
    responses(
        (status = 200, description = "Operator soft-deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Profile not authorized", body = ErrorResponse),
        (status = 404, description = "Operator not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Operators"
)]
#[instrument(skip(state))]
pub async fn delete_operator(
    State(state): State<AppState>,
    _write: RequireWriteAccess,
    _root: RequireRootProfile,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    OperatorService::delete(&state.db, id).await?;
    Ok(Json(MessageResponse {
        message: "Operator deleted successfully".to_string(),
    }))
}
