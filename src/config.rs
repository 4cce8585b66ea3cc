use std::{env, path::PathBuf};

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};

use crate::errors::{AppError, AppResult};

const DEFAULT_SECRET_KEY: &str = "dev_secret_key_change_in_production";
const DEFAULT_ADMIN_PASSWORD: &str = "admin";
const MAX_TOKEN_TTL_SECONDS: i64 = 365 * 24 * 60 * 60;
const BYTES_PER_MB: usize = 1024 * 1024;

/// Which backend holds users, courses, homeworks and solutions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataStoreKind {
    Mongo,
    Memory,
}

impl DataStoreKind {
    fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "memory" | "in-memory" => DataStoreKind::Memory,
            _ => DataStoreKind::Mongo,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub run_mode: String,
    pub data_store: DataStoreKind,
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub secret_key: SecretString,
    pub token_ttl_seconds: i64,
    pub password_hash_cost: u32,
    pub upload_folder: PathBuf,
    pub max_file_size_mb: usize,
    pub admin_name: String,
    pub admin_username: String,
    pub admin_password: SecretString,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            run_mode: env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()),
            data_store: DataStoreKind::parse(
                &env::var("DATA_STORE").unwrap_or_else(|_| "mongo".to_string()),
            ),
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "homework-local".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            secret_key: SecretString::from(
                env::var("SECRET_KEY").unwrap_or_else(|_| DEFAULT_SECRET_KEY.to_string()),
            ),
            token_ttl_seconds: env::var("TOKEN_TTL_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3600),
            password_hash_cost: env::var("PASSWORD_HASH_COST")
                .ok()
                .and_then(|c| c.parse().ok())
                .unwrap_or(bcrypt::DEFAULT_COST),
            upload_folder: PathBuf::from(
                env::var("UPLOAD_FOLDER").unwrap_or_else(|_| "uploads".to_string()),
            ),
            max_file_size_mb: env::var("MAX_FILE_SIZE_MB")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or(16),
            admin_name: env::var("ADMIN_NAME").unwrap_or_else(|_| "admin".to_string()),
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password: SecretString::from(
                env::var("ADMIN_PASSWORD").unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string()),
            ),
        }
    }

    pub fn is_production(&self) -> bool {
        self.run_mode == "production"
    }

    /// Lifetime of freshly issued tokens; between one second and one year.
    pub fn token_ttl(&self) -> AppResult<Duration> {
        if !(1..=MAX_TOKEN_TTL_SECONDS).contains(&self.token_ttl_seconds) {
            return Err(AppError::InternalError(format!(
                "TOKEN_TTL_SECONDS must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_SECONDS, self.token_ttl_seconds
            )));
        }

        Duration::try_seconds(self.token_ttl_seconds).ok_or_else(|| {
            AppError::InternalError(format!(
                "TOKEN_TTL_SECONDS {} is out of range",
                self.token_ttl_seconds
            ))
        })
    }

    pub fn max_upload_bytes(&self) -> AppResult<usize> {
        if self.max_file_size_mb == 0 {
            return Err(AppError::InternalError(
                "MAX_FILE_SIZE_MB must be positive".to_string(),
            ));
        }

        self.max_file_size_mb
            .checked_mul(BYTES_PER_MB)
            .ok_or_else(|| {
                AppError::InternalError(format!(
                    "MAX_FILE_SIZE_MB {} is too large",
                    self.max_file_size_mb
                ))
            })
    }

    /// Checks run in every mode before the server is built.
    pub fn validate(&self) -> AppResult<()> {
        self.token_ttl()?;
        self.max_upload_bytes()?;

        if !(4..=31).contains(&self.password_hash_cost) {
            return Err(AppError::InternalError(format!(
                "PASSWORD_HASH_COST must be between 4 and 31, got {}",
                self.password_hash_cost
            )));
        }

        Ok(())
    }

    /// Rejects configurations that still carry development secrets.
    pub fn validate_for_production(&self) -> AppResult<()> {
        let secret_key = self.secret_key.expose_secret();

        if secret_key == DEFAULT_SECRET_KEY {
            return Err(AppError::InternalError(
                "SECRET_KEY is using the default value; set it to a secure random string"
                    .to_string(),
            ));
        }

        if secret_key.len() < 32 {
            return Err(AppError::InternalError(format!(
                "SECRET_KEY is too short ({}); it must be at least 32 characters",
                secret_key.len()
            )));
        }

        if self.admin_password.expose_secret() == DEFAULT_ADMIN_PASSWORD {
            return Err(AppError::InternalError(
                "ADMIN_PASSWORD is using the default value".to_string(),
            ));
        }

        Ok(())
    }

    /// Fixed in-memory configuration with a cheap bcrypt cost.
    pub fn test_config() -> Self {
        Self {
            run_mode: "testing".to_string(),
            data_store: DataStoreKind::Memory,
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "homework-test".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 5000,
            secret_key: SecretString::from("test_secret_key".to_string()),
            token_ttl_seconds: 3600,
            password_hash_cost: 4,
            upload_folder: env::temp_dir().join("homework-server-test-uploads"),
            max_file_size_mb: 1,
            admin_name: "admin".to_string(),
            admin_username: "admin".to_string(),
            admin_password: SecretString::from("admin".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_with_defaults() {
        let config = Config::from_env();

        assert!(!config.mongo_conn_string.is_empty());
        assert!(!config.mongo_db_name.is_empty());
        assert!(config.token_ttl_seconds > 0);
    }

    #[test]
    fn test_test_config() {
        let config = Config::test_config();

        assert_eq!(config.data_store, DataStoreKind::Memory);
        assert_eq!(config.token_ttl_seconds, 3600);
        assert_eq!(config.max_upload_bytes().unwrap(), 1024 * 1024);
        assert_eq!(config.token_ttl().unwrap(), Duration::seconds(3600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unusable_token_ttl() {
        let mut config = Config::test_config();

        for ttl in [0, -10, MAX_TOKEN_TTL_SECONDS + 1, i64::MAX] {
            config.token_ttl_seconds = ttl;
            assert!(config.token_ttl().is_err(), "ttl {} accepted", ttl);
            assert!(config.validate().is_err());
        }

        config.token_ttl_seconds = MAX_TOKEN_TTL_SECONDS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unusable_upload_limit() {
        let mut config = Config::test_config();

        config.max_file_size_mb = 0;
        assert!(config.max_upload_bytes().is_err());

        config.max_file_size_mb = usize::MAX;
        assert!(config.max_upload_bytes().is_err());
        assert!(config.validate().is_err());

        config.max_file_size_mb = 16;
        assert_eq!(config.max_upload_bytes().unwrap(), 16 * 1024 * 1024);
    }

    #[test]
    fn test_validate_rejects_bad_hash_cost() {
        let mut config = Config::test_config();
        config.password_hash_cost = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_data_store_kind_parse() {
        assert_eq!(DataStoreKind::parse("memory"), DataStoreKind::Memory);
        assert_eq!(DataStoreKind::parse(" Memory "), DataStoreKind::Memory);
        assert_eq!(DataStoreKind::parse("mongo"), DataStoreKind::Mongo);
        assert_eq!(DataStoreKind::parse("anything"), DataStoreKind::Mongo);
    }

    #[test]
    fn test_validate_for_production_rejects_defaults() {
        let mut config = Config::test_config();
        config.secret_key = SecretString::from(DEFAULT_SECRET_KEY.to_string());
        assert!(config.validate_for_production().is_err());

        config.secret_key = SecretString::from("short".to_string());
        assert!(config.validate_for_production().is_err());

        config.secret_key = SecretString::from("a".repeat(40));
        assert!(config.validate_for_production().is_err());

        config.admin_password = SecretString::from("a-real-password".to_string());
        assert!(config.validate_for_production().is_ok());
    }
}
