//! JWT verification for bearer tokens issued by the external user service.

use crate::error::{GatewayError, GatewayResult};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use parley_config::AuthConfig;
use serde::{Deserialize, Serialize};

/// Claims carried by tokens from the user service. The user id is the only
/// payload field this backend reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub aud: String,
    pub exp: usize,
}

/// Verifies HS256 tokens against the shared secret. This backend never
/// issues tokens; login lives in the external user service.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&config.jwt_audience]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Validate a token and return the authenticated user id.
    pub fn verify(&self, token: &str) -> GatewayResult<String> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|err| GatewayError::AuthenticationFailed(format!("Invalid token: {err}")))?;

        Ok(token_data.claims.user_id)
    }
}

/// Authenticated caller, inserted into request extensions by the auth
/// middleware.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);
