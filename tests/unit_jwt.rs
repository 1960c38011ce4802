use edg_backend::config::jwt::JwtConfig;
use edg_backend::modules::operators::model::OperatorRole;
use edg_backend::utils::jwt::{Claims, TokenError, create_access_token, verify_token};

fn get_test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        expiration: 86400,
    }
}

#[test]
fn test_create_access_token_success() {
    let jwt_config = get_test_jwt_config();

    let result = create_access_token(42, Some("op@example.com"), OperatorRole::Operator, 16, &jwt_config);

    assert!(result.is_ok());
    let token = result.unwrap();
    assert!(!token.is_empty());
}

#[test]
fn test_create_access_token_all_roles() {
    let jwt_config = get_test_jwt_config();

    let roles = vec![
        OperatorRole::Root,
        OperatorRole::Admin,
        OperatorRole::Operator,
        OperatorRole::Guest,
    ];

    for role in roles {
        let result = create_access_token(1, Some("op@example.com"), role, 8, &jwt_config);
        assert!(result.is_ok());
    }
}

#[test]
fn test_verify_token_round_trip() {
    let jwt_config = get_test_jwt_config();

    let token =
        create_access_token(42, Some("op@example.com"), OperatorRole::Admin, 32, &jwt_config)
            .unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert_eq!(claims.sub, "42");
    assert_eq!(claims.operator_id().unwrap(), 42);
    assert_eq!(claims.email.as_deref(), Some("op@example.com"));
    assert_eq!(claims.role, OperatorRole::Admin);
    assert_eq!(claims.level, 32);
    assert_eq!(claims.exp - claims.iat, 86400);
}

#[test]
fn test_verify_token_without_email() {
    let jwt_config = get_test_jwt_config();

    let token = create_access_token(7, None, OperatorRole::Guest, 8, &jwt_config).unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert_eq!(claims.email, None);
}

#[test]
fn test_verify_token_malformed() {
    let jwt_config = get_test_jwt_config();

    let result = verify_token("invalid.token.here", &jwt_config);

    assert_eq!(result.unwrap_err(), TokenError::Malformed);
}

#[test]
fn test_verify_token_empty() {
    let jwt_config = get_test_jwt_config();

    let result = verify_token("", &jwt_config);

    assert!(result.is_err());
}

#[test]
fn test_verify_token_wrong_secret() {
    let jwt_config = get_test_jwt_config();
    let token =
        create_access_token(1, Some("op@example.com"), OperatorRole::Operator, 8, &jwt_config)
            .unwrap();

    let wrong_jwt_config = JwtConfig {
        secret: "different_secret_key".to_string(),
        expiration: 86400,
    };

    let result = verify_token(&token, &wrong_jwt_config);

    assert_eq!(result.unwrap_err(), TokenError::InvalidSignature);
}

#[test]
fn test_verify_token_tampered_payload() {
    let jwt_config = get_test_jwt_config();
    let token =
        create_access_token(1, Some("op@example.com"), OperatorRole::Guest, 8, &jwt_config)
            .unwrap();

    // Swap the payload segment for one signed with another key
    let elevated = create_access_token(
        1,
        Some("op@example.com"),
        OperatorRole::Root,
        64,
        &JwtConfig {
            secret: "attacker_secret".to_string(),
            expiration: 86400,
        },
    )
    .unwrap();

    let parts: Vec<&str> = token.split('.').collect();
    let forged_parts: Vec<&str> = elevated.split('.').collect();
    let forged = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

    let result = verify_token(&forged, &jwt_config);

    assert_eq!(result.unwrap_err(), TokenError::InvalidSignature);
}

#[test]
fn test_verify_token_expired() {
    let jwt_config = get_test_jwt_config();

    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: "1".to_string(),
        email: None,
        role: OperatorRole::Operator,
        level: 8,
        iat: now - 7200,
        exp: now - 3600,
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .unwrap();

    let result = verify_token(&token, &jwt_config);

    assert_eq!(result.unwrap_err(), TokenError::Expired);
}
