use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::Homework,
    repositories::{filters::HomeworkFilter, mongo_limit},
};

#[async_trait]
pub trait HomeworkRepository: Send + Sync {
    async fn create(&self, homework: Homework) -> AppResult<Homework>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Homework>>;
    async fn update(&self, homework: Homework) -> AppResult<Homework>;
    async fn delete(&self, id: &str) -> AppResult<bool>;
    /// Deletes every homework of `course_id` and returns their ids.
    async fn delete_by_course(&self, course_id: &str) -> AppResult<Vec<String>>;
    async fn count(&self, filter: HomeworkFilter) -> AppResult<u64>;
    /// Homeworks matching `filter`, ordered by name.
    async fn list(&self, filter: HomeworkFilter, skip: u64, take: u64)
        -> AppResult<Vec<Homework>>;
    async fn remove_student(&self, student_id: &str) -> AppResult<()>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoHomeworkRepository {
    collection: Collection<Homework>,
}

impl MongoHomeworkRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("homeworks");
        Self { collection }
    }
}

#[async_trait]
impl HomeworkRepository for MongoHomeworkRepository {
    async fn create(&self, homework: Homework) -> AppResult<Homework> {
        self.collection.insert_one(&homework).await?;
        Ok(homework)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Homework>> {
        let homework = self.collection.find_one(doc! { "id": id }).await?;
        Ok(homework)
    }

    async fn update(&self, homework: Homework) -> AppResult<Homework> {
        let result = self
            .collection
            .replace_one(doc! { "id": &homework.id }, &homework)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Homework with id '{}' not found",
                homework.id
            )));
        }

        Ok(homework)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_by_course(&self, course_id: &str) -> AppResult<Vec<String>> {
        let filter = doc! { "course_id": course_id };
        let homeworks: Vec<Homework> = self
            .collection
            .find(filter.clone())
            .await?
            .try_collect()
            .await?;

        self.collection.delete_many(filter).await?;
        Ok(homeworks.into_iter().map(|homework| homework.id).collect())
    }

    async fn count(&self, filter: HomeworkFilter) -> AppResult<u64> {
        let total = self
            .collection
            .count_documents(filter.to_document())
            .await?;
        Ok(total)
    }

    async fn list(
        &self,
        filter: HomeworkFilter,
        skip: u64,
        take: u64,
    ) -> AppResult<Vec<Homework>> {
        let homeworks = self
            .collection
            .find(filter.to_document())
            .sort(doc! { "name": 1 })
            .skip(skip)
            .limit(mongo_limit(take))
            .await?
            .try_collect()
            .await?;
        Ok(homeworks)
    }

    async fn remove_student(&self, student_id: &str) -> AppResult<()> {
        self.collection
            .update_many(
                doc! { "student_ids": student_id },
                doc! { "$pull": { "student_ids": student_id } },
            )
            .await?;
        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for homeworks collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let name_index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("name_unique".to_string())
                    .build(),
            )
            .build();

        let course_index = IndexModel::builder()
            .keys(doc! { "course_id": 1 })
            .options(IndexOptions::builder().name("course_id".to_string()).build())
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(name_index).await?;
        self.collection.create_index(course_index).await?;

        log::info!("Successfully created indexes for homeworks collection");
        Ok(())
    }
}
