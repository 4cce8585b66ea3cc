use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::User,
    repositories::{filters::UserFilter, mongo_limit},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> AppResult<User>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn find_by_token(&self, token: &str) -> AppResult<Option<User>>;
    async fn update(&self, user: User) -> AppResult<User>;
    /// Stores a freshly issued token; no other field is touched.
    async fn set_token(&self, id: &str, token: &str, expiration: DateTime<Utc>) -> AppResult<()>;
    async fn set_token_expiration(&self, id: &str, expiration: DateTime<Utc>) -> AppResult<()>;
    /// Returns whether a user with `id` existed.
    async fn delete(&self, id: &str) -> AppResult<bool>;
    async fn count(&self, filter: UserFilter) -> AppResult<u64>;
    /// Users matching `filter`, ordered by name.
    async fn list(&self, filter: UserFilter, skip: u64, take: u64) -> AppResult<Vec<User>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("users");
        Self { collection }
    }

    async fn set_fields(&self, id: &str, fields: Document) -> AppResult<()> {
        let result = self
            .collection
            .update_one(doc! { "id": id }, doc! { "$set": fields })
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("User with id '{}' not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        self.collection.insert_one(&user).await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "id": id }).await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "username": username })
            .await?;
        Ok(user)
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "token": token }).await?;
        Ok(user)
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let options = ReplaceOptions::builder().upsert(false).build();

        let result = self
            .collection
            .replace_one(doc! { "id": &user.id }, &user)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "User with id '{}' not found",
                user.id
            )));
        }

        Ok(user)
    }

    async fn set_token(&self, id: &str, token: &str, expiration: DateTime<Utc>) -> AppResult<()> {
        self.set_fields(
            id,
            doc! { "token": token, "token_expiration": expiration.timestamp_millis() },
        )
        .await
    }

    async fn set_token_expiration(&self, id: &str, expiration: DateTime<Utc>) -> AppResult<()> {
        self.set_fields(id, doc! { "token_expiration": expiration.timestamp_millis() })
            .await
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count(&self, filter: UserFilter) -> AppResult<u64> {
        let total = self
            .collection
            .count_documents(filter.to_document())
            .await?;
        Ok(total)
    }

    async fn list(&self, filter: UserFilter, skip: u64, take: u64) -> AppResult<Vec<User>> {
        let users = self
            .collection
            .find(filter.to_document())
            .sort(doc! { "name": 1, "id": 1 })
            .skip(skip)
            .limit(mongo_limit(take))
            .await?
            .try_collect()
            .await?;
        Ok(users)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for users collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let username_index = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("username_unique".to_string())
                    .build(),
            )
            .build();

        // users without a token carry null, which must not collide
        let token_index = IndexModel::builder()
            .keys(doc! { "token": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("token_unique".to_string())
                    .partial_filter_expression(doc! { "token": { "$type": "string" } })
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(username_index).await?;
        self.collection.create_index(token_index).await?;

        log::info!("Successfully created indexes for users collection");
        Ok(())
    }
}
