use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    auth::claims::Claims,
    errors::{AppError, AppResult},
};

/// Verifies bearer tokens issued by the identity provider (HS256, shared secret).
#[derive(Clone)]
pub struct JwtService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(secret: &SecretString) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();

        Self {
            decoding_key: DecodingKey::from_secret(secret_bytes),
            validation: Validation::default(),
        }
    }

    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                let message = match e.kind() {
                    ErrorKind::ExpiredSignature => Some("Token has expired"),
                    ErrorKind::InvalidSignature => Some("Token signature is invalid"),
                    _ => None,
                };
                match message {
                    Some(message) => AppError::Unauthorized(message.to_string()),
                    None => e.into(),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::domain::UserRole;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("token should encode")
    }

    #[test]
    fn test_jwt_validate_roundtrip_claims() {
        let config = Config::test_config();
        let jwt_service = JwtService::new(&config.jwt_secret);

        let claims = Claims::new("user-1", "john@example.com", UserRole::Instructor, 1);
        let token = sign(&claims, config.jwt_secret.expose_secret());

        let parsed = jwt_service.validate_token(&token).expect("token should validate");
        assert_eq!(parsed.sub, "user-1");
        assert_eq!(parsed.role, UserRole::Instructor);
    }

    #[test]
    fn test_jwt_invalid_token() {
        let config = Config::test_config();
        let jwt_service = JwtService::new(&config.jwt_secret);

        let result = jwt_service.validate_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_jwt_wrong_secret() {
        let config = Config::test_config();
        let jwt_service = JwtService::new(&config.jwt_secret);

        let claims = Claims::new("user-1", "john@example.com", UserRole::Student, 1);
        let token = sign(&claims, "some_other_secret");

        match jwt_service.validate_token(&token) {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("signature")),
            other => panic!("Expected Unauthorized error, got {:?}", other.map(|c| c.sub)),
        }
    }

    #[test]
    fn test_jwt_expired_token() {
        let config = Config::test_config();
        let jwt_service = JwtService::new(&config.jwt_secret);

        let claims = Claims::new("user-1", "john@example.com", UserRole::Student, -2);
        let token = sign(&claims, config.jwt_secret.expose_secret());

        match jwt_service.validate_token(&token) {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("expired")),
            other => panic!("Expected Unauthorized error, got {:?}", other.map(|c| c.sub)),
        }
    }
}
