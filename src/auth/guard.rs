use std::future::Future;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{User, UserRole},
};

/// Exact role match; no role implies another.
pub fn require_role(user: &User, expected: UserRole) -> AppResult<()> {
    if user.role != expected {
        log::warn!(
            "'{}' ({}) denied access to a {} operation",
            user.username,
            user.role,
            expected
        );
        return Err(AppError::Forbidden(format!(
            "Only {} accounts can perform this action",
            expected
        )));
    }
    Ok(())
}

/// Runs `operation` only when `user` holds `expected`.
pub async fn with_role<T, F, Fut>(user: &User, expected: UserRole, operation: F) -> AppResult<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    require_role(user, expected)?;
    operation().await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn user(role: UserRole) -> User {
        User::new(role, "name", "username", "hash".to_string())
    }

    #[test]
    fn test_require_role_is_flat() {
        assert!(require_role(&user(UserRole::Teacher), UserRole::Teacher).is_ok());
        assert!(matches!(
            require_role(&user(UserRole::Administrator), UserRole::Teacher),
            Err(AppError::Forbidden(_))
        ));
        assert!(require_role(&user(UserRole::Student), UserRole::Administrator).is_err());
    }

    #[tokio::test]
    async fn test_with_role_skips_operation_on_mismatch() {
        let calls = AtomicUsize::new(0);

        let denied = with_role(&user(UserRole::Teacher), UserRole::Administrator, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;
        assert!(matches!(denied, Err(AppError::Forbidden(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let allowed = with_role(&user(UserRole::Administrator), UserRole::Administrator, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(7)
        })
        .await;
        assert_eq!(allowed.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
