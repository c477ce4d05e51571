use thiserror::Error;

/// Reason a presented token was rejected.
///
/// The first group covers malformed or forged tokens and is never worth
/// retrying. `InvalidSecurityStamp` and `InvalidTokenKey` mean the token was
/// genuine but has since been revoked, so the client must re-authenticate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenRejection {
    /// Token could not be decoded.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// Signature did not verify against the configured key.
    #[error("invalid token signature")]
    InvalidSignature,

    /// Token is past its `exp` claim or before its `nbf` claim.
    #[error("token has expired")]
    Expired,

    /// Issuer claim does not match the configured issuer.
    #[error("wrong token issuer")]
    WrongIssuer,

    /// Audience claim does not match the configured audience.
    #[error("wrong token audience")]
    WrongAudience,

    /// Token type discriminator does not match the expected kind.
    #[error("wrong token type: expected '{expected}', got '{actual}'")]
    WrongTokenType {
        /// Kind the caller asked for.
        expected: String,
        /// Kind found in the token.
        actual: String,
    },

    /// A claim required for validation is absent or unparsable.
    #[error("missing token claim '{0}'")]
    MissingClaim(&'static str),

    /// Embedded security stamp no longer matches the user's current stamp.
    #[error("invalid security stamp")]
    InvalidSecurityStamp,

    /// Token validity key has no live token record.
    #[error("invalid token key")]
    InvalidTokenKey,
}

impl TokenRejection {
    /// Returns whether the token was well-formed but has been revoked.
    #[must_use]
    pub fn is_revocation(&self) -> bool {
        matches!(self, Self::InvalidSecurityStamp | Self::InvalidTokenKey)
    }
}
