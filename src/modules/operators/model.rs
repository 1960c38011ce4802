//! Operator data models and DTOs.
//!
//! The [`Operator`] entity deliberately has no `password` field: queries
//! that need the stored hash use a service-local row type, so the hash can
//! never leak into an API response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Account status. `Deleted` is a soft-delete marker; rows are never
/// physically removed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "operator_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OperatorStatus {
    Active,
    Inactive,
    Deleted,
}

/// Authorization profile. `Root` bypasses level checks, `Guest` is
/// globally read-only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "operator_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OperatorRole {
    Root,
    Admin,
    Operator,
    Guest,
}

/// Bounds for the `level` authorization attribute.
pub const MIN_LEVEL: i32 = 8;
pub const MAX_LEVEL: i32 = 64;

/// An operator (staff) account as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    pub id: i32,
    pub uuid: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub status: OperatorStatus,
    pub role: OperatorRole,
    pub level: i32,
    pub notes: String,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

fn default_level() -> Option<i32> {
    Some(MIN_LEVEL)
}

/// DTO for creating a new operator. Only root/admin profiles may call
/// the create endpoint.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOperatorDto {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    /// Optional: accounts may be created without a password ("set a
    /// password first" state).
    #[validate(length(min = 8))]
    pub password: Option<String>,
    pub status: Option<OperatorStatus>,
    pub role: Option<OperatorRole>,
    #[serde(default = "default_level")]
    #[validate(range(min = 8, max = 64))]
    pub level: Option<i32>,
    pub notes: Option<String>,
}

/// DTO for updating an existing operator. All fields optional; absent
/// fields are left unchanged.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOperatorDto {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8))]
    pub password: Option<String>,
    pub status: Option<OperatorStatus>,
    pub role: Option<OperatorRole>,
    #[validate(range(min = 8, max = 64))]
    pub level: Option<i32>,
    pub notes: Option<String>,
}

/// Sort specification for the filter endpoint.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SortSpec {
    pub field: String,
    /// "ASC" or "DESC" (case-insensitive); defaults to ascending.
    pub direction: Option<String>,
}

/// Filter criteria. Name and email are substring matches, status is exact.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct OperatorQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<OperatorStatus>,
}

fn default_page_size() -> i64 {
    10
}

/// Request body for `POST /api/operators/filter`. Paging inputs are
/// clamped rather than rejected, so no field carries validation rules;
/// the derive keeps the body on the same rejection path as the other
/// endpoints.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterOperatorsRequest {
    #[serde(default)]
    pub page_index: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub sort: Option<SortSpec>,
    pub query: Option<OperatorQuery>,
}

impl FilterOperatorsRequest {
    pub fn page_size(&self) -> i64 {
        self.page_size.clamp(1, 100)
    }

    pub fn page_index(&self) -> i64 {
        self.page_index.max(0)
    }

    pub fn offset(&self) -> i64 {
        self.page_index() * self.page_size()
    }
}

/// Paginated response for the filter endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilterOperatorsResponse {
    pub items: Vec<Operator>,
    pub total_items: i64,
    pub total_pages: i64,
    pub page_index: i64,
}

/// Plain `{message}` response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
