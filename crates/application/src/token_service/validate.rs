use super::*;

impl TokenService {
    /// Validates a presented token of the expected kind.
    ///
    /// Signature, type, issuer and audience are checked first. The security
    /// stamp and the validity key must then both still be current.
    pub async fn validate_token(
        &self,
        token: &str,
        expected_kind: TokenKind,
    ) -> AppResult<ValidatedToken> {
        let claims = self.signer.verify(token)?;
        self.check_claims(&claims, expected_kind)?;

        let user_id = claims.user_id()?;
        self.check_security_stamp(user_id, &claims).await?;
        self.check_token_key(user_id, &claims).await?;

        Ok(ValidatedToken { user_id, claims })
    }

    fn check_claims(
        &self,
        claims: &TokenClaims,
        expected_kind: TokenKind,
    ) -> Result<(), TokenRejection> {
        let actual = claims
            .token_type
            .as_deref()
            .ok_or(TokenRejection::MissingClaim("token_type"))?;
        if actual != expected_kind.as_str() {
            return Err(TokenRejection::WrongTokenType {
                expected: expected_kind.as_str().to_owned(),
                actual: actual.to_owned(),
            });
        }

        if claims.iss != self.settings.issuer {
            return Err(TokenRejection::WrongIssuer);
        }

        if claims.aud != self.settings.audience {
            return Err(TokenRejection::WrongAudience);
        }

        Ok(())
    }

    async fn check_security_stamp(&self, user_id: UserId, claims: &TokenClaims) -> AppResult<()> {
        let claimed = claims.security_stamp()?;

        if let Some(cached) = self.cache.security_stamp(user_id).await
            && cached.security_stamp == claimed
        {
            return Ok(());
        }

        match self.stamp_repository.find_security_stamp(user_id).await? {
            Some(current) if current == claimed => {
                self.cache
                    .set_security_stamp(&SecurityStampCacheItem {
                        user_id,
                        security_stamp: current,
                    })
                    .await;
                Ok(())
            }
            _ => {
                debug!(%user_id, "security stamp no longer current");
                Err(TokenRejection::InvalidSecurityStamp.into())
            }
        }
    }

    async fn check_token_key(&self, user_id: UserId, claims: &TokenClaims) -> AppResult<()> {
        let token_key = claims.token_key()?;

        if self.cache.has_token_validity(user_id, token_key).await {
            return Ok(());
        }

        if self
            .token_repository
            .is_token_live(user_id, token_key, Utc::now())
            .await?
        {
            self.cache
                .set_token_validity(&TokenValidityCacheItem { user_id, token_key })
                .await;
            return Ok(());
        }

        debug!(%user_id, %token_key, "token key has no live record");
        Err(TokenRejection::InvalidTokenKey.into())
    }
}
