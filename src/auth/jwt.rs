use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::SessionClaims;

pub fn validate_jwt(token: &str, secret: &str) -> Result<SessionClaims, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let token_data = decode::<SessionClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| format!("JWT validation failed: {}", e))?;

    if token_data.claims.sub.trim().is_empty() {
        return Err("JWT has an empty subject".to_string());
    }

    Ok(token_data.claims)
}

/// Sign `claims` with the shared HS256 secret
pub fn issue_jwt(claims: &SessionClaims, secret: &str) -> Result<String, String> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("Failed to sign JWT: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_for_testing_purposes";

    fn claims(exp: i64) -> SessionClaims {
        SessionClaims {
            sub: "customer-1".to_string(),
            name: Some("Ada".to_string()),
            email: None,
            exp,
        }
    }

    #[test]
    fn test_issue_and_validate_token() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = issue_jwt(&claims(exp), SECRET).unwrap();

        assert_eq!(validate_jwt(&token, SECRET).unwrap(), claims(exp));
    }

    #[test]
    fn test_token_with_wrong_secret() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let token = issue_jwt(&claims(exp), SECRET).unwrap();

        assert!(validate_jwt(&token, "wrong_secret_key").is_err());
    }

    #[test]
    fn test_expired_token() {
        let exp = chrono::Utc::now().timestamp() - 3600;
        let token = issue_jwt(&claims(exp), SECRET).unwrap();

        assert!(validate_jwt(&token, SECRET).is_err());
    }

    #[test]
    fn test_invalid_token_format() {
        assert!(validate_jwt("invalid_token", SECRET).is_err());
    }
}
