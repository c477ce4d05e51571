use super::*;

impl TokenService {
    /// Revokes the token described by `claims` and the refresh token linked to it.
    ///
    /// Every record and cache entry is attempted even when an earlier step
    /// fails. The first store failure is returned afterwards.
    pub async fn revoke_tokens(&self, user_id: UserId, claims: &TokenClaims) -> AppResult<()> {
        let access_key = claims.token_key()?;
        let keys = std::iter::once(access_key).chain(claims.refresh_token_key());

        let mut first_failure = None;
        for token_key in keys {
            if let Err(error) = self.revoke_token_key(user_id, token_key).await {
                first_failure.get_or_insert(error);
            }
        }

        match first_failure {
            Some(error) => Err(error),
            None => {
                info!(%user_id, "tokens revoked");
                Ok(())
            }
        }
    }

    async fn revoke_token_key(&self, user_id: UserId, token_key: TokenKey) -> AppResult<()> {
        let deleted = self.token_repository.delete_token(user_id, token_key).await;
        self.cache.remove_token_validity(user_id, token_key).await;

        match deleted {
            Ok(true) => Ok(()),
            Ok(false) => {
                debug!(%user_id, %token_key, "token record already gone");
                Ok(())
            }
            Err(error) => {
                warn!(%user_id, %token_key, %error, "failed to delete token record");
                Err(error)
            }
        }
    }
}
