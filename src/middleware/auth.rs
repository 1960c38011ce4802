//! Authentication middleware and extractor.
//!
//! Verifying the JWT is not enough on its own: the account may have been
//! deactivated or soft-deleted after the token was issued. Authentication
//! therefore re-checks the operator row and requires `status = active`
//! before populating the request identity.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::modules::operators::model::{OperatorRole, OperatorStatus};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;

/// Request-scoped identity of the authenticated operator.
#[derive(Debug, Clone)]
pub struct CurrentOperator {
    pub id: i32,
    pub email: Option<String>,
    pub status: OperatorStatus,
    pub role: OperatorRole,
    pub level: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct IdentityRow {
    id: i32,
    email: Option<String>,
    status: OperatorStatus,
    role: OperatorRole,
    level: i32,
}

impl CurrentOperator {
    /// Full authentication: bearer extraction, JWT verification, and the
    /// database status re-check.
    async fn authenticate_parts(parts: &Parts, state: &AppState) -> Result<Self, AppError> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        let claims = verify_token(token, &state.jwt_config)?;
        let operator_id = claims.operator_id()?;

        let row = sqlx::query_as::<_, IdentityRow>(
            "SELECT id, email, status, role, level FROM operators WHERE id = $1",
        )
        .bind(operator_id)
        .fetch_optional(&state.db)
        .await?
        .filter(|row| row.status == OperatorStatus::Active)
        .ok_or_else(|| AppError::unauthorized("Operator not authorized"))?;

        Ok(CurrentOperator {
            id: row.id,
            email: row.email,
            status: row.status,
            role: row.role,
            level: row.level,
        })
    }
}

impl FromRequestParts<AppState> for CurrentOperator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // The authenticate layer caches the identity in request extensions
        // so guards and handlers don't repeat the database round trip.
        if let Some(current) = parts.extensions.get::<CurrentOperator>() {
            return Ok(current.clone());
        }

        Self::authenticate_parts(parts, state).await
    }
}

/// Layer that authenticates the request and stores the identity in
/// request extensions. Must run before any guard extractor.
pub async fn authenticate(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();
    let current = CurrentOperator::from_request_parts(&mut parts, &state).await?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(current);

    Ok(next.run(req).await)
}
