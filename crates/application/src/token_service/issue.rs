use super::*;

impl TokenService {
    /// Issues one token.
    ///
    /// `refresh_token_key` is embedded only in access tokens so that signing
    /// out can revoke the refresh token issued alongside.
    pub async fn issue_token(
        &self,
        subject: TokenSubject,
        kind: TokenKind,
        refresh_token_key: Option<TokenKey>,
    ) -> AppResult<IssuedToken> {
        let token_key = TokenKey::generate();
        let lifetime = self.settings.lifetime(kind);
        let issued_at = Utc::now();
        let expires_at = issued_at + lifetime;

        let claims = TokenClaims {
            sub: subject.user_id.to_string(),
            iss: self.settings.issuer.clone(),
            aud: self.settings.audience.clone(),
            iat: issued_at.timestamp(),
            nbf: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
            security_stamp: Some(subject.security_stamp.to_string()),
            token_validity_key: Some(token_key.to_string()),
            token_type: Some(kind.as_str().to_owned()),
            refresh_token_validity_key: match kind {
                TokenKind::Access => refresh_token_key.map(|key| key.to_string()),
                TokenKind::Refresh => None,
            },
        };
        let token = self.signer.sign(&claims)?;

        self.token_repository
            .create_token(&UserTokenRecord {
                user_id: subject.user_id,
                token_key,
                expires_at,
            })
            .await?;
        self.cache
            .set_token_validity(&TokenValidityCacheItem {
                user_id: subject.user_id,
                token_key,
            })
            .await;

        debug!(user_id = %subject.user_id, kind = kind.as_str(), %token_key, "token issued");
        Ok(IssuedToken {
            token,
            token_key,
            expires_in_seconds: lifetime.num_seconds(),
        })
    }

    /// Issues a refresh token and an access token linked to it.
    pub async fn issue_token_pair(&self, subject: TokenSubject) -> AppResult<TokenPair> {
        let refresh = self
            .issue_token(subject, TokenKind::Refresh, None)
            .await?;
        let access = self
            .issue_token(subject, TokenKind::Access, Some(refresh.token_key))
            .await?;

        Ok(TokenPair { access, refresh })
    }

    /// Exchanges a valid refresh token for a new access token.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> AppResult<IssuedToken> {
        let validated = self
            .validate_token(refresh_token, TokenKind::Refresh)
            .await?;
        let refresh_key = validated.claims.token_key()?;

        let security_stamp = self
            .stamp_repository
            .find_security_stamp(validated.user_id)
            .await?
            .ok_or(AppError::InvalidToken(TokenRejection::InvalidSecurityStamp))?;

        self.issue_token(
            TokenSubject {
                user_id: validated.user_id,
                security_stamp,
            },
            TokenKind::Access,
            Some(refresh_key),
        )
        .await
    }
}
