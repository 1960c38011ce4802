use chrono::{Duration, Utc};
use rand::{Rng, distributions::Alphanumeric};
use sqlx::PgPool;
use tracing::{error, info, instrument, warn};

use crate::config::email::EmailConfig;
use crate::config::jwt::JwtConfig;
use crate::modules::operators::model::{Operator, OperatorStatus};
use crate::modules::operators::service::OPERATOR_COLUMNS;
use crate::utils::email::EmailService;
use crate::utils::errors::AppError;
use crate::utils::jwt::create_access_token;
use crate::utils::password::{hash_password, verify_password};

use super::model::{
    ChangePasswordDto, LoginRequest, LoginResponse, RequestResetDto, ResetPasswordDto, ResetToken,
};

/// Uniform message for every login failure cause, so responses don't leak
/// which accounts exist.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

const INVALID_OR_EXPIRED_TOKEN: &str = "Invalid or expired token";

/// Length of the random reset token string.
const RESET_TOKEN_LEN: usize = 64;

/// Generates a cryptographically random, unguessable reset token.
pub fn generate_reset_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    id: i32,
    password: Option<String>,
    status: OperatorStatus,
}

/// Credential check shared by the login path. Unknown email, inactive
/// account, missing password, and hash mismatch all collapse into one
/// 401 so responses don't distinguish the causes.
fn verify_login(row: Option<CredentialRow>, password: &str) -> Result<i32, AppError> {
    let row = row.ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

    if row.status != OperatorStatus::Active {
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    let stored_hash = row
        .password
        .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

    if !verify_password(password, &stored_hash)? {
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    Ok(row.id)
}

/// Token admission rule shared by validation and consumption: a missing,
/// used, or expired token is one and the same 400.
fn usable_token(
    row: Option<ResetToken>,
    now: chrono::DateTime<Utc>,
) -> Result<ResetToken, AppError> {
    row.filter(|t| t.is_valid(now))
        .ok_or_else(|| AppError::bad_request(INVALID_OR_EXPIRED_TOKEN))
}

/// Decides whether a reset request actually issues a token. Every branch
/// produces the same client response; only the side effects differ, so
/// callers cannot probe which addresses exist.
fn reset_target(operator: Option<Operator>) -> Option<Operator> {
    let operator = operator?;

    if operator.status != OperatorStatus::Active {
        info!(operator_id = operator.id, "Password reset requested for non-active account");
        return None;
    }

    if operator.email.is_none() {
        // Matched by email, so this indicates an inconsistent record.
        warn!(operator_id = operator.id, "Operator matched reset request but has no email");
        return None;
    }

    if operator.name.is_empty() {
        warn!(operator_id = operator.id, "Operator has no display name for reset email");
    }

    Some(operator)
}

pub struct AuthService;

impl AuthService {
    /// Verifies credentials and issues a token. Unknown email, inactive
    /// account, missing password, and hash mismatch all fail with the same
    /// 401 message.
    #[instrument(skip(db, dto, jwt_config))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, password, status FROM operators WHERE email = $1",
        )
        .bind(&dto.email)
        .fetch_optional(db)
        .await?;

        let operator_id = verify_login(row, &dto.password)?;

        let sql = format!(
            "UPDATE operators SET last_login = $2 WHERE id = $1 RETURNING {}",
            OPERATOR_COLUMNS
        );
        let operator = sqlx::query_as::<_, Operator>(&sql)
            .bind(operator_id)
            .bind(Utc::now())
            .fetch_one(db)
            .await?;

        let token = create_access_token(
            operator.id,
            operator.email.as_deref(),
            operator.role,
            operator.level,
            jwt_config,
        )?;

        info!(operator_id = operator.id, "Operator logged in");

        Ok(LoginResponse {
            message: "Login successful".to_string(),
            operator,
            token,
        })
    }

    pub async fn find_operator(db: &PgPool, id: i32) -> Result<Option<Operator>, AppError> {
        let sql = format!("SELECT {} FROM operators WHERE id = $1", OPERATOR_COLUMNS);
        let operator = sqlx::query_as::<_, Operator>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await?;

        Ok(operator)
    }

    /// Changes the password of the authenticated operator after verifying
    /// the current one.
    #[instrument(skip(db, dto))]
    pub async fn change_password(
        db: &PgPool,
        operator_id: i32,
        dto: ChangePasswordDto,
    ) -> Result<(), AppError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, password, status FROM operators WHERE id = $1",
        )
        .bind(operator_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Operator not found"))?;

        let stored_hash = row
            .password
            .ok_or_else(|| AppError::bad_request("Set a password first"))?;

        if !verify_password(&dto.current_password, &stored_hash)? {
            return Err(AppError::unauthorized("Current password is not valid"));
        }

        let new_hash = hash_password(&dto.new_password)?;

        sqlx::query("UPDATE operators SET password = $2, last_modified = $3 WHERE id = $1")
            .bind(operator_id)
            .bind(&new_hash)
            .bind(Utc::now())
            .execute(db)
            .await?;

        info!(operator_id, "Password changed");

        Ok(())
    }

    /// Starts the reset flow for an email address.
    ///
    /// Always succeeds from the caller's point of view: whether the email
    /// matches an active account or nothing at all, the response is the
    /// same (account-enumeration defense). Prior tokens for the same
    /// operator stay live; each request issues a fresh row.
    #[instrument(skip(db, email_config, dto))]
    pub async fn request_reset(
        db: &PgPool,
        email_config: &EmailConfig,
        dto: RequestResetDto,
    ) -> Result<(), AppError> {
        let sql = format!("SELECT {} FROM operators WHERE email = $1", OPERATOR_COLUMNS);
        let operator = sqlx::query_as::<_, Operator>(&sql)
            .bind(&dto.email)
            .fetch_optional(db)
            .await?;

        let Some(operator) = reset_target(operator) else {
            info!("Password reset request not actionable, responding as usual");
            return Ok(());
        };

        // reset_target guarantees the email is present.
        let Some(to_email) = operator.email.clone() else {
            return Ok(());
        };

        let token = generate_reset_token();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO reset_tokens (token, operator_id, expires_at, used, created_at)
             VALUES ($1, $2, $3, FALSE, $4)",
        )
        .bind(&token)
        .bind(operator.id)
        .bind(now + Duration::hours(1))
        .bind(now)
        .execute(db)
        .await?;

        info!(operator_id = operator.id, "Reset token issued");

        // Send failures must not change the response, or they would leak
        // which addresses exist.
        let mailer = EmailService::new(email_config.clone());
        if let Err(e) = mailer
            .send_password_reset_email(&to_email, &operator.name, &token)
            .await
        {
            error!(operator_id = operator.id, error = ?e, "Failed to send password reset email");
        }

        Ok(())
    }

    /// Read-only token check, used by clients to decide whether to show
    /// the reset form.
    pub async fn validate_reset_token(db: &PgPool, token: &str) -> Result<bool, AppError> {
        let row = sqlx::query_as::<_, ResetToken>(
            "SELECT id, token, operator_id, expires_at, used, created_at
             FROM reset_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(db)
        .await?;

        Ok(usable_token(row, Utc::now()).is_ok())
    }

    /// Consumes a reset token and stores the new password.
    ///
    /// Token consumption and the password write happen in one database
    /// transaction; the consumption update is guarded on `used = FALSE` so
    /// two concurrent submissions of the same token cannot both succeed.
    #[instrument(skip(db, email_config, dto))]
    pub async fn reset_password(
        db: &PgPool,
        email_config: &EmailConfig,
        dto: ResetPasswordDto,
    ) -> Result<(), AppError> {
        let row = sqlx::query_as::<_, ResetToken>(
            "SELECT id, token, operator_id, expires_at, used, created_at
             FROM reset_tokens WHERE token = $1",
        )
        .bind(&dto.token)
        .fetch_optional(db)
        .await?;
        let reset_token = usable_token(row, Utc::now())?;

        let operator = Self::find_operator(db, reset_token.operator_id)
            .await?
            .filter(|op| op.status == OperatorStatus::Active)
            .ok_or_else(|| AppError::not_found("Operator not found"))?;

        let new_hash = hash_password(&dto.new_password)?;

        let mut tx = db.begin().await?;

        let consumed = sqlx::query(
            "UPDATE reset_tokens SET used = TRUE WHERE id = $1 AND used = FALSE",
        )
        .bind(reset_token.id)
        .execute(&mut *tx)
        .await?;

        if consumed.rows_affected() == 0 {
            // Lost the race against a concurrent submission of the same token.
            return Err(AppError::bad_request(INVALID_OR_EXPIRED_TOKEN));
        }

        sqlx::query("UPDATE operators SET password = $2, last_modified = $3 WHERE id = $1")
            .bind(operator.id)
            .bind(&new_hash)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(operator_id = operator.id, "Password reset completed");

        if let Some(to_email) = &operator.email {
            let mailer = EmailService::new(email_config.clone());
            if let Err(e) = mailer
                .send_password_reset_confirmation_email(to_email, &operator.name)
                .await
            {
                error!(operator_id = operator.id, error = ?e, "Failed to send reset confirmation email");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::operators::model::OperatorRole;
    use chrono::Duration;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn unauthorized_message(err: AppError) -> String {
        match err {
            AppError::Unauthorized(msg) => msg,
            other => panic!("expected 401, got {:?}", other),
        }
    }

    fn credential_row(password: Option<&str>, status: OperatorStatus) -> CredentialRow {
        CredentialRow {
            id: 1,
            password: password.map(|p| hash_password(p).unwrap()),
            status,
        }
    }

    fn operator(status: OperatorStatus, email: Option<&str>) -> Operator {
        Operator {
            id: 1,
            uuid: Uuid::new_v4(),
            name: "Mario Rossi".to_string(),
            email: email.map(str::to_string),
            status,
            role: OperatorRole::Operator,
            level: 16,
            notes: String::new(),
            last_login: None,
            created_at: Utc::now(),
            last_modified: Utc::now(),
        }
    }

    fn reset_token_row(used: bool, expires_at: chrono::DateTime<Utc>) -> ResetToken {
        ResetToken {
            id: 1,
            token: "sometoken".to_string(),
            operator_id: 1,
            expires_at,
            used,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_generate_reset_token_length_and_charset() {
        let token = generate_reset_token();
        assert_eq!(token.len(), RESET_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_reset_token_unique() {
        let tokens: HashSet<String> = (0..32).map(|_| generate_reset_token()).collect();
        assert_eq!(tokens.len(), 32);
    }

    #[test]
    fn test_login_failure_causes_share_one_message() {
        let unknown = unauthorized_message(verify_login(None, "whatever").unwrap_err());
        let wrong_password = unauthorized_message(
            verify_login(
                Some(credential_row(Some("rightpassword"), OperatorStatus::Active)),
                "wrongpassword",
            )
            .unwrap_err(),
        );
        let inactive = unauthorized_message(
            verify_login(
                Some(credential_row(Some("rightpassword"), OperatorStatus::Inactive)),
                "rightpassword",
            )
            .unwrap_err(),
        );
        let no_password = unauthorized_message(
            verify_login(Some(credential_row(None, OperatorStatus::Active)), "anything")
                .unwrap_err(),
        );

        assert_eq!(unknown, wrong_password);
        assert_eq!(unknown, inactive);
        assert_eq!(unknown, no_password);
    }

    #[test]
    fn test_verify_login_success_returns_id() {
        let id = verify_login(
            Some(credential_row(Some("rightpassword"), OperatorStatus::Active)),
            "rightpassword",
        )
        .unwrap();
        assert_eq!(id, 1);
    }

    #[test]
    fn test_consumed_token_fails_second_submission() {
        let now = Utc::now();
        let fresh = reset_token_row(false, now + Duration::hours(1));

        let admitted = usable_token(Some(fresh), now).unwrap();
        assert!(!admitted.used);

        // The successful reset flips the flag; the same token then fails
        // re-admission with the invalid-or-expired error.
        let consumed = ResetToken {
            used: true,
            ..admitted
        };
        let err = usable_token(Some(consumed), now).unwrap_err();
        match err {
            AppError::BadRequest(msg) => assert_eq!(msg, INVALID_OR_EXPIRED_TOKEN),
            other => panic!("expected 400, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_and_expired_tokens_share_the_consumed_error() {
        let now = Utc::now();

        let missing = usable_token(None, now).unwrap_err();
        let expired =
            usable_token(Some(reset_token_row(false, now - Duration::hours(2))), now).unwrap_err();

        assert!(matches!(missing, AppError::BadRequest(ref m) if m == INVALID_OR_EXPIRED_TOKEN));
        assert!(matches!(expired, AppError::BadRequest(ref m) if m == INVALID_OR_EXPIRED_TOKEN));
    }

    #[test]
    fn test_reset_target_uniform_outcomes() {
        // Unknown email, inactive account, and a record without an email
        // all skip issuance; the caller's response is the same either way.
        assert!(reset_target(None).is_none());
        assert!(reset_target(Some(operator(OperatorStatus::Inactive, Some("a@example.com")))).is_none());
        assert!(reset_target(Some(operator(OperatorStatus::Deleted, Some("a@example.com")))).is_none());
        assert!(reset_target(Some(operator(OperatorStatus::Active, None))).is_none());

        let target = reset_target(Some(operator(OperatorStatus::Active, Some("a@example.com"))));
        assert_eq!(target.unwrap().email.as_deref(), Some("a@example.com"));
    }
}
