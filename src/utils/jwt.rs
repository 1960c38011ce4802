//! JWT issuance and verification.
//!
//! Tokens carry the operator's identity and authorization attributes
//! (`role`, `level`) so guards can run without re-parsing the account,
//! while the authentication middleware still re-checks account status
//! against the database to defeat stale tokens.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use crate::config::jwt::JwtConfig;
use crate::modules::operators::model::OperatorRole;
use crate::utils::errors::AppError;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Operator id, stringified.
    pub sub: String,
    pub email: Option<String>,
    pub role: OperatorRole,
    pub level: i32,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn operator_id(&self) -> Result<i32, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::unauthorized("Invalid operator id in token"))
    }
}

/// Why a token failed verification. Each variant maps to a distinct
/// user-facing 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    InvalidSignature,
    Malformed,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::unauthorized("Token expired"),
            TokenError::InvalidSignature => AppError::unauthorized("Invalid token signature"),
            TokenError::Malformed => AppError::unauthorized("Malformed token"),
        }
    }
}

pub fn create_access_token(
    operator_id: i32,
    email: Option<&str>,
    role: OperatorRole,
    level: i32,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.expiration as usize;

    let claims = Claims {
        sub: operator_id.to_string(),
        email: email.map(str::to_string),
        role,
        level,
        iat: now,
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, TokenError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    })
}
