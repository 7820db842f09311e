use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Token claims as issued by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

/// Mint a token the way the identity provider does. The service itself
/// only verifies tokens; this exists for local tooling and tests.
pub fn generate_token(sub: &str, secret: &str, ttl: usize) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        exp: now() + ttl,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_token_verifies_with_the_same_secret() {
        let token = generate_token("payroll-admin", "secret", 60);
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "payroll-admin");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_token("payroll-admin", "secret", 60);
        assert!(verify_token(&token, "other-secret").is_err());
    }
}
