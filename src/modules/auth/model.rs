use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::modules::operators::model::Operator;

/// A one-time password-reset token row.
///
/// Lifecycle: `Issued -> Used` (explicit flag) or `Issued -> Expired`
/// (derived from `expires_at`); both are terminal. Rows are never deleted,
/// only flagged, so consumed tokens stay behind as an audit trail.
#[derive(Debug, Clone, FromRow)]
pub struct ResetToken {
    pub id: i32,
    pub token: String,
    pub operator_id: i32,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl ResetToken {
    /// A token is valid iff it has not been consumed and has not expired.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.used && now <= self.expires_at
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub operator: Operator,
    pub token: String,
}

/// Response for `GET /api/auth/verify`.
#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub message: String,
    pub operator: Operator,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordDto {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RequestResetDto {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordDto {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(used: bool, expires_at: DateTime<Utc>) -> ResetToken {
        ResetToken {
            id: 1,
            token: "sometoken".to_string(),
            operator_id: 7,
            expires_at,
            used,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_fresh_token_is_valid() {
        let now = Utc::now();
        assert!(token(false, now + Duration::hours(1)).is_valid(now));
    }

    #[test]
    fn test_used_token_is_invalid() {
        let now = Utc::now();
        assert!(!token(true, now + Duration::hours(1)).is_valid(now));
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        // One second past expiry is invalid, one second before is valid.
        assert!(!token(false, now - Duration::seconds(1)).is_valid(now));
        assert!(token(false, now + Duration::seconds(1)).is_valid(now));
    }

    #[test]
    fn test_expiry_exact_instant_is_valid() {
        let now = Utc::now();
        assert!(token(false, now).is_valid(now));
    }

    #[test]
    fn test_used_and_expired_is_invalid() {
        let now = Utc::now();
        assert!(!token(true, now - Duration::hours(2)).is_valid(now));
    }

    #[test]
    fn test_change_password_dto_camel_case() {
        let dto: ChangePasswordDto = serde_json::from_str(
            r#"{"currentPassword":"oldpass","newPassword":"newpassword1"}"#,
        )
        .unwrap();
        assert_eq!(dto.current_password, "oldpass");
        assert_eq!(dto.new_password, "newpassword1");
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn test_reset_password_dto_requires_long_password() {
        let dto: ResetPasswordDto =
            serde_json::from_str(r#"{"token":"abc","newPassword":"short"}"#).unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_login_request_requires_valid_email() {
        let dto: LoginRequest =
            serde_json::from_str(r#"{"email":"not-an-email","password":"x"}"#).unwrap();
        assert!(dto.validate().is_err());
    }
}
