use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Bson},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::Course,
    repositories::{filters::CourseFilter, mongo_limit},
};

#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create(&self, course: Course) -> AppResult<Course>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Course>>;
    async fn update(&self, course: Course) -> AppResult<Course>;
    async fn delete(&self, id: &str) -> AppResult<bool>;
    async fn count(&self, filter: CourseFilter) -> AppResult<u64>;
    /// Courses matching `filter`, ordered by name.
    async fn list(&self, filter: CourseFilter, skip: u64, take: u64) -> AppResult<Vec<Course>>;
    /// Drops `student_id` from every course roster.
    async fn remove_student(&self, student_id: &str) -> AppResult<()>;
    /// Leaves every course taught by `teacher_id` without a teacher.
    async fn clear_teacher(&self, teacher_id: &str) -> AppResult<()>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoCourseRepository {
    collection: Collection<Course>,
}

impl MongoCourseRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("courses");
        Self { collection }
    }
}

#[async_trait]
impl CourseRepository for MongoCourseRepository {
    async fn create(&self, course: Course) -> AppResult<Course> {
        self.collection.insert_one(&course).await?;
        Ok(course)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Course>> {
        let course = self.collection.find_one(doc! { "id": id }).await?;
        Ok(course)
    }

    async fn update(&self, course: Course) -> AppResult<Course> {
        let result = self
            .collection
            .replace_one(doc! { "id": &course.id }, &course)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!(
                "Course with id '{}' not found",
                course.id
            )));
        }

        Ok(course)
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count(&self, filter: CourseFilter) -> AppResult<u64> {
        let total = self
            .collection
            .count_documents(filter.to_document())
            .await?;
        Ok(total)
    }

    async fn list(&self, filter: CourseFilter, skip: u64, take: u64) -> AppResult<Vec<Course>> {
        let courses = self
            .collection
            .find(filter.to_document())
            .sort(doc! { "name": 1 })
            .skip(skip)
            .limit(mongo_limit(take))
            .await?
            .try_collect()
            .await?;
        Ok(courses)
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

    async fn clear_teacher(&self, teacher_id: &str) -> AppResult<()> {
        self.collection
            .update_many(
                doc! { "teacher_id": teacher_id },
                doc! { "$set": { "teacher_id": Bson::Null } },
            )
            .await?;
        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for courses collection");

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

        let student_index = IndexModel::builder()
            .keys(doc! { "student_ids": 1 })
            .options(
                IndexOptions::builder()
                    .name("student_ids".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(name_index).await?;
        self.collection.create_index(student_index).await?;

        log::info!("Successfully created indexes for courses collection");
        Ok(())
    }
}
