use artisan_quote_backend::config::JwtConfig;
use artisan_quote_backend::util::jwt::{Claims, JwtError, JwtTokenUtils, JwtTokenUtilsImpl};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};

fn create_test_jwt_utils() -> JwtTokenUtilsImpl {
    JwtTokenUtilsImpl::new(JwtConfig::default())
}

// Signs claims the way the identity provider would
fn provider_token(sub: &str, issued_ago: Duration, lifetime: Duration) -> String {
    let config = JwtConfig::default();
    let iat = Utc::now() - issued_ago;
    let claims = Claims {
        sub: sub.to_string(),
        email: Some("artisan@example.com".to_string()),
        iat: iat.timestamp(),
        exp: (iat + lifetime).timestamp(),
        iss: config.jwt_issuer.clone(),
        aud: config.jwt_audience.clone(),
        jti: "provider-jti".to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .unwrap()
}

#[test]
fn test_provider_token_is_accepted() {
    let jwt = create_test_jwt_utils();
    let token = provider_token("artisan-42", Duration::minutes(1), Duration::minutes(15));
    let claims = jwt.validate_access_token(&token).unwrap();
    assert_eq!(claims.sub, "artisan-42");
    assert_eq!(claims.jti, "provider-jti");
}

#[test]
fn test_expired_token_is_rejected() {
    let jwt = create_test_jwt_utils();
    let token = provider_token("artisan-42", Duration::hours(2), Duration::hours(1));
    assert!(matches!(jwt.validate_access_token(&token), Err(JwtError::TokenExpired)));
}

#[test]
fn test_tampered_token_is_rejected() {
    let jwt = create_test_jwt_utils();
    let token = jwt.generate_access_token("artisan-42", None).unwrap();
    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    parts[2] = parts[2].chars().rev().collect();
    let tampered = parts.join(".");
    assert!(jwt.validate_access_token(&tampered).is_err());
}

#[test]
fn test_foreign_issuer_is_rejected() {
    let mut config = JwtConfig::default();
    config.jwt_issuer = Some("someone-else".to_string());
    let foreign = JwtTokenUtilsImpl::new(config);
    let token = foreign.generate_access_token("artisan-42", None).unwrap();
    assert!(create_test_jwt_utils().validate_access_token(&token).is_err());
}

#[test]
fn test_generated_tokens_are_unique() {
    let jwt = create_test_jwt_utils();
    let first = jwt.generate_access_token("artisan-42", None).unwrap();
    let second = jwt.generate_access_token("artisan-42", None).unwrap();
    assert_ne!(first, second);
    assert_ne!(
        jwt.validate_access_token(&first).unwrap().jti,
        jwt.validate_access_token(&second).unwrap().jti
    );
}
