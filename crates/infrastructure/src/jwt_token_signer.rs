//! HS256 JWT implementation of the token signing port.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;
use warden_application::TokenSigner;
use warden_core::{AppError, AppResult, TokenRejection};
use warden_domain::TokenClaims;

/// Minimum accepted secret length in bytes.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Signs and verifies tokens with a shared secret.
///
/// Verification covers the signature, `exp`, `nbf`, issuer and audience with
/// no clock leeway.
#[derive(Clone)]
pub struct JwtTokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenSigner {
    /// Creates a signer for the given secret, issuer and audience.
    pub fn new(secret: &str, issuer: &str, audience: &str) -> AppResult<Self> {
        if secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::Validation(format!(
                "JWT secret must be at least {MIN_JWT_SECRET_LENGTH} characters"
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }
}

impl TokenSigner for JwtTokenSigner {
    fn sign(&self, claims: &TokenClaims) -> AppResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|error| AppError::Internal(format!("failed to sign token: {error}")))
    }

    fn verify(&self, token: &str) -> Result<TokenClaims, TokenRejection> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|error| {
                debug!(kind = ?error.kind(), "jwt verification failed");
                map_jwt_error(error)
            })
    }
}

fn map_jwt_error(error: jsonwebtoken::errors::Error) -> TokenRejection {
    match error.kind() {
        ErrorKind::InvalidSignature => TokenRejection::InvalidSignature,
        ErrorKind::ExpiredSignature | ErrorKind::ImmatureSignature => TokenRejection::Expired,
        ErrorKind::InvalidIssuer => TokenRejection::WrongIssuer,
        ErrorKind::InvalidAudience => TokenRejection::WrongAudience,
        _ => TokenRejection::Malformed(error.to_string()),
    }
}
