use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    auth::{password, token::TokenSigner},
    errors::AppResult,
    models::domain::User,
    repositories::UserRepository,
};

/// An existing token is reused while it has more than this left to live.
const RENEWAL_GUARD_SECONDS: i64 = 60;

/// Password checks and the lifecycle of the token stored on each user.
///
/// Authentication failures come back as `None`; `Err` only carries store
/// or hashing faults.
#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserRepository>,
    signer: TokenSigner,
    token_ttl: Duration,
}

impl CredentialStore {
    /// `token_ttl` comes from [`crate::config::Config::token_ttl`], which keeps it positive.
    pub fn new(users: Arc<dyn UserRepository>, signer: TokenSigner, token_ttl: Duration) -> Self {
        Self {
            users,
            signer,
            token_ttl,
        }
    }

    pub async fn verify_password(&self, username: &str, password: &str) -> AppResult<Option<User>> {
        let Some(user) = self.users.find_by_username(username).await? else {
            return Ok(None);
        };

        if password::verify_password(password, &user.password_hash).await? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    pub async fn issue_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();

        if let (Some(token), Some(expiration)) = (&user.token, user.token_expiration) {
            if expiration > now + Duration::seconds(RENEWAL_GUARD_SECONDS) {
                return Ok(token.clone());
            }
        }

        let token = self.signer.sign(&user.username, now, self.token_ttl)?;

        self.users
            .set_token(&user.id, &token, now + self.token_ttl)
            .await?;

        log::debug!("Issued a new token for '{}'", user.username);
        Ok(token)
    }

    pub async fn validate_token(&self, token: &str) -> AppResult<Option<User>> {
        if token.is_empty() {
            return Ok(None);
        }

        let Some(user) = self.users.find_by_token(token).await? else {
            return Ok(None);
        };

        if user.token_expired_at(Utc::now()) {
            return Ok(None);
        }

        match self.signer.verify(token) {
            Some(claims) if claims.sub == user.username => Ok(Some(user)),
            _ => Ok(None),
        }
    }

    /// Leaves the token in place but makes it expired.
    pub async fn revoke_token(&self, user: &User) -> AppResult<()> {
        self.users
            .set_token_expiration(&user.id, Utc::now() - Duration::seconds(1))
            .await?;

        log::debug!("Revoked token for '{}'", user.username);
        Ok(())
    }
}
