use std::sync::Arc;

use crate::{
    auth::{CredentialStore, TokenSigner},
    config::{Config, DataStoreKind},
    db::Database,
    errors::AppResult,
    repositories::Repositories,
    services::{AccountService, CourseService, HomeworkService, SolutionService},
    storage::SolutionStorage,
};

#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialStore,
    pub accounts: Arc<AccountService>,
    pub courses: Arc<CourseService>,
    pub homeworks: Arc<HomeworkService>,
    pub solutions: Arc<SolutionService>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Connects the configured backend and wires every service onto it.
    pub async fn new(config: Config) -> AppResult<Self> {
        let repositories = match config.data_store {
            DataStoreKind::Mongo => {
                let db = Database::connect(&config).await?;
                Repositories::mongo(&db)
            }
            DataStoreKind::Memory => {
                log::warn!("Using the in-memory data store; nothing will be persisted");
                Repositories::in_memory()
            }
        };
        repositories.ensure_indexes().await?;

        Self::from_repositories(config, repositories)
    }

    /// Fails if `config` does not pass [`Config::validate`].
    pub fn from_repositories(config: Config, repos: Repositories) -> AppResult<Self> {
        config.validate()?;

        let storage = SolutionStorage::new(config.upload_folder.clone());
        let signer = TokenSigner::new(&config.secret_key);

        Ok(Self {
            credentials: CredentialStore::new(
                repos.users.clone(),
                signer,
                config.token_ttl()?,
            ),
            accounts: Arc::new(AccountService::new(
                repos.users.clone(),
                repos.courses.clone(),
                repos.homeworks.clone(),
                config.password_hash_cost,
            )),
            courses: Arc::new(CourseService::new(
                repos.courses.clone(),
                repos.homeworks.clone(),
                repos.solutions.clone(),
                repos.users.clone(),
                storage.clone(),
            )),
            homeworks: Arc::new(HomeworkService::new(
                repos.homeworks.clone(),
                repos.courses.clone(),
                repos.users.clone(),
                repos.solutions.clone(),
                storage.clone(),
            )),
            solutions: Arc::new(SolutionService::new(
                repos.solutions,
                repos.homeworks,
                repos.courses,
                storage,
            )),
            config: Arc::new(config),
        })
    }
}
