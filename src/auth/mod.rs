pub mod credentials;
pub mod extractors;
pub mod guard;
pub mod password;
pub mod token;

pub use credentials::CredentialStore;
pub use extractors::{PasswordAuth, TokenAuth};
pub use guard::{require_role, with_role};
pub use password::{hash_password, verify_password};
pub use token::{TokenClaims, TokenSigner};
