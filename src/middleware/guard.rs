//! Authorization guards.
//!
//! Pure check functions back argument-less extractors that compose in the
//! handler signature, after the authenticate layer has populated the
//! request identity. Any failing check short-circuits with 403 and the
//! handler never runs.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::middleware::auth::CurrentOperator;
use crate::modules::operators::model::OperatorRole;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Fails unless the operator's role is in the allowed set.
pub fn check_profile(
    current: &CurrentOperator,
    allowed_roles: &[OperatorRole],
) -> Result<(), AppError> {
    if !allowed_roles.contains(&current.role) {
        return Err(AppError::forbidden(
            "Access denied: profile not authorized",
        ));
    }
    Ok(())
}

/// Fails unless the operator is root (always bypasses) or has at least
/// the required level.
pub fn check_level(current: &CurrentOperator, min_level: i32) -> Result<(), AppError> {
    if current.role == OperatorRole::Root {
        return Ok(());
    }

    if current.level < min_level {
        return Err(AppError::forbidden(format!(
            "Access denied: level {} required, current level {}",
            min_level, current.level
        )));
    }

    Ok(())
}

/// Fails for guest operators; guests are globally read-only.
pub fn check_write_access(current: &CurrentOperator) -> Result<(), AppError> {
    if current.role == OperatorRole::Guest {
        return Err(AppError::forbidden(
            "Access denied: guest operators can only read data",
        ));
    }
    Ok(())
}

macro_rules! profile_guard {
    ($(#[$doc:meta])* $name:ident, [$($role:ident),+]) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name;

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let current = CurrentOperator::from_request_parts(parts, state).await?;
                check_profile(&current, &[$(OperatorRole::$role),+])?;
                Ok($name)
            }
        }
    };
}

profile_guard!(
    /// Guard extractor for root/admin-only routes.
    RequireAdminProfile,
    [Root, Admin]
);

profile_guard!(
    /// Guard extractor for root-only routes.
    RequireRootProfile,
    [Root]
);

/// Guard extractor enforcing a minimum level in the handler signature,
/// e.g. `_level: RequireLevel<16>`. Root bypasses the threshold.
#[derive(Debug, Clone)]
pub struct RequireLevel<const MIN: i32>;

impl<const MIN: i32> FromRequestParts<AppState> for RequireLevel<MIN> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = CurrentOperator::from_request_parts(parts, state).await?;
        check_level(&current, MIN)?;
        Ok(RequireLevel)
    }
}

/// Guard extractor that rejects guest operators on write endpoints.
#[derive(Debug, Clone)]
pub struct RequireWriteAccess;

impl FromRequestParts<AppState> for RequireWriteAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = CurrentOperator::from_request_parts(parts, state).await?;
        check_write_access(&current)?;
        Ok(RequireWriteAccess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cors::CorsConfig;
    use crate::config::email::EmailConfig;
    use crate::config::jwt::JwtConfig;
    use crate::modules::operators::model::OperatorStatus;

    fn operator_with(role: OperatorRole, level: i32) -> CurrentOperator {
        CurrentOperator {
            id: 1,
            email: Some("test@example.com".to_string()),
            status: OperatorStatus::Active,
            role,
            level,
        }
    }

    /// State with a lazy pool; extractor tests never touch the database
    /// because the identity is already cached in request extensions.
    fn test_state() -> AppState {
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        AppState {
            db,
            jwt_config: JwtConfig::from_env(),
            email_config: EmailConfig::from_env(),
            cors_config: CorsConfig::from_env(),
        }
    }

    fn parts_with(current: CurrentOperator) -> Parts {
        let mut req = axum::http::Request::builder().body(()).unwrap();
        req.extensions_mut().insert(current);
        req.into_parts().0
    }

    #[test]
    fn test_check_profile_allowed() {
        let current = operator_with(OperatorRole::Admin, 16);
        assert!(check_profile(&current, &[OperatorRole::Root, OperatorRole::Admin]).is_ok());
    }

    #[test]
    fn test_check_profile_denied() {
        let current = operator_with(OperatorRole::Operator, 64);
        assert!(check_profile(&current, &[OperatorRole::Root, OperatorRole::Admin]).is_err());
    }

    #[test]
    fn test_check_level_root_bypasses() {
        let current = operator_with(OperatorRole::Root, 8);
        assert!(check_level(&current, 64).is_ok());
    }

    #[test]
    fn test_check_level_below_minimum() {
        let current = operator_with(OperatorRole::Operator, 8);
        assert!(check_level(&current, 16).is_err());
    }

    #[test]
    fn test_check_level_at_minimum() {
        let current = operator_with(OperatorRole::Operator, 16);
        assert!(check_level(&current, 16).is_ok());
    }

    #[test]
    fn test_check_write_access_guest_denied() {
        // Guests are read-only regardless of level.
        let current = operator_with(OperatorRole::Guest, 64);
        assert!(check_write_access(&current).is_err());
    }

    #[test]
    fn test_check_write_access_operator_allowed() {
        let current = operator_with(OperatorRole::Operator, 8);
        assert!(check_write_access(&current).is_ok());
    }

    #[tokio::test]
    async fn test_require_level_extractor_enforces_threshold() {
        let state = test_state();

        let mut parts = parts_with(operator_with(OperatorRole::Operator, 16));
        assert!(
            RequireLevel::<16>::from_request_parts(&mut parts, &state)
                .await
                .is_ok()
        );
        assert!(
            RequireLevel::<32>::from_request_parts(&mut parts, &state)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_require_level_extractor_root_bypass() {
        let state = test_state();

        let mut parts = parts_with(operator_with(OperatorRole::Root, 8));
        assert!(
            RequireLevel::<64>::from_request_parts(&mut parts, &state)
                .await
                .is_ok()
        );
    }
}
