use bcrypt::{hash, verify};

use crate::errors::AppResult;

/// Hashes `password` with bcrypt off the async executor.
pub async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_string();
    let hashed = tokio::task::spawn_blocking(move || hash(password, cost)).await??;
    Ok(hashed)
}

/// Slow, salted comparison. A stored hash that bcrypt cannot parse never matches.
pub async fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();

    let outcome = tokio::task::spawn_blocking(move || verify(password, &password_hash)).await?;
    match outcome {
        Ok(matches) => Ok(matches),
        Err(e) => {
            log::warn!("Stored password hash could not be parsed: {}", e);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hashed = hash_password("secret", 4).await.unwrap();

        assert_ne!(hashed, "secret");
        assert!(verify_password("secret", &hashed).await.unwrap());
        assert!(!verify_password("Secret", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_is_a_mismatch() {
        assert!(!verify_password("secret", "not-a-bcrypt-hash").await.unwrap());
    }
}
