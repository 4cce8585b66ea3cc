use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::IndexOptions, Collection, IndexModel};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::Solution,
    repositories::{filters::SolutionFilter, mongo_limit},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SolutionRepository: Send + Sync {
    async fn create(&self, solution: Solution) -> AppResult<Solution>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Solution>>;
    async fn update(&self, solution: Solution) -> AppResult<Solution>;
    /// Deletes every solution of `homework_id`, returning the stored file paths.
    async fn delete_by_homework(&self, homework_id: &str) -> AppResult<Vec<String>>;
    async fn count(&self, filter: SolutionFilter) -> AppResult<u64>;
    /// Solutions matching `filter`, newest first.
    async fn list(&self, filter: SolutionFilter, skip: u64, take: u64)
        -> AppResult<Vec<Solution>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoSolutionRepository {
    collection: Collection<Solution>,
}

impl MongoSolutionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("solutions");
        Self { collection }
    }
}

#[async_trait]
impl SolutionRepository for MongoSolutionRepository {
    async fn create(&self, solution: Solution) -> AppResult<Solution> {
        self.collection.insert_one(&solution).await?;
        Ok(solution)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Solution>> {
        let solution = self.collection.find_one(doc! { "id": id }).await?;
        Ok(solution)
    }

    async fn update(&self, solution: Solution) -> AppResult<Solution> {
        let result = self
            .collection
            .replace_one(doc! { "id": &solution.id }, &solution)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Solution with id '{}' not found",
                solution.id
            )));
        }

        Ok(solution)
    }

    async fn delete_by_homework(&self, homework_id: &str) -> AppResult<Vec<String>> {
        let filter = doc! { "homework_id": homework_id };
        let solutions: Vec<Solution> = self
            .collection
            .find(filter.clone())
            .await?
            .try_collect()
            .await?;

        self.collection.delete_many(filter).await?;
        Ok(solutions.into_iter().map(|solution| solution.file_path).collect())
    }

    async fn count(&self, filter: SolutionFilter) -> AppResult<u64> {
        let total = self
            .collection
            .count_documents(filter.to_document())
            .await?;
        Ok(total)
    }

    async fn list(
        &self,
        filter: SolutionFilter,
        skip: u64,
        take: u64,
    ) -> AppResult<Vec<Solution>> {
        let solutions = self
            .collection
            .find(filter.to_document())
            .sort(doc! { "submitted_at": -1 })
            .skip(skip)
            .limit(mongo_limit(take))
            .await?
            .try_collect()
            .await?;
        Ok(solutions)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for solutions collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let homework_student_index = IndexModel::builder()
            .keys(doc! { "homework_id": 1, "student_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("homework_student".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(homework_student_index).await?;

        log::info!("Successfully created indexes for solutions collection");
        Ok(())
    }
}
