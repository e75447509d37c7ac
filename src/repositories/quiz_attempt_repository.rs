use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_document},
    options::{IndexOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::{is_duplicate_key, Database},
    errors::{AppError, AppResult},
    models::domain::{AttemptStatus, QuizAttempt},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizAttemptRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>>;

    /// The in-progress attempt for this participant and quiz, if any.
    async fn find_open(&self, user_id: &str, quiz_id: &str) -> AppResult<Option<QuizAttempt>>;

    /// Inserts a new attempt. Fails with `Conflict` when the participant
    /// already has an open attempt for the same quiz.
    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt>;

    /// Atomically returns the open attempt for the candidate's participant and
    /// quiz, inserting the candidate when there is none. The flag is true when
    /// the candidate was inserted.
    async fn find_or_create_open(&self, candidate: QuizAttempt) -> AppResult<(QuizAttempt, bool)>;

    /// Replaces the attempt only while its stored status is still `expected`.
    /// Fails with `Conflict` otherwise.
    async fn conditional_update(
        &self,
        id: &str,
        expected: AttemptStatus,
        attempt: QuizAttempt,
    ) -> AppResult<QuizAttempt>;

    async fn list_by_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<QuizAttempt>, i64)>;

    /// Every attempt for a quiz, highest score first.
    async fn list_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizAttempt>>;
}

pub struct MongoQuizAttemptRepository {
    collection: Collection<QuizAttempt>,
}

impl MongoQuizAttemptRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("quiz_attempts");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quiz_attempts collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        // At most one in-progress attempt per participant and quiz.
        let open_attempt_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "quiz_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .partial_filter_expression(doc! {
                        "status": AttemptStatus::InProgress.as_str()
                    })
                    .name("open_attempt_unique".to_string())
                    .build(),
            )
            .build();

        let quiz_score_index = IndexModel::builder()
            .keys(doc! { "quiz_id": 1, "total_score": -1 })
            .options(
                IndexOptions::builder()
                    .name("quiz_score".to_string())
                    .build(),
            )
            .build();

        let user_id_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "submitted_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("user_submitted".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(open_attempt_index).await?;
        self.collection.create_index(quiz_score_index).await?;
        self.collection.create_index(user_id_index).await?;

        log::info!("Successfully created indexes for quiz_attempts collection");
        Ok(())
    }
}

#[async_trait]
impl QuizAttemptRepository for MongoQuizAttemptRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        let attempt = self.collection.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn find_open(&self, user_id: &str, quiz_id: &str) -> AppResult<Option<QuizAttempt>> {
        let attempt = self
            .collection
            .find_one(doc! {
                "user_id": user_id,
                "quiz_id": quiz_id,
                "status": AttemptStatus::InProgress.as_str()
            })
            .await?;
        Ok(attempt)
    }

    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        match self.collection.insert_one(&attempt).await {
            Ok(_) => Ok(attempt),
            Err(e) if is_duplicate_key(&e) => Err(AppError::Conflict(format!(
                "User '{}' already has an open attempt on quiz '{}'",
                attempt.user_id, attempt.quiz_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_or_create_open(&self, candidate: QuizAttempt) -> AppResult<(QuizAttempt, bool)> {
        let filter = doc! {
            "user_id": &candidate.user_id,
            "quiz_id": &candidate.quiz_id,
            "status": AttemptStatus::InProgress.as_str()
        };

        // The filter's equality fields are copied into the upserted document.
        let mut on_insert = to_document(&candidate)?;
        for key in ["user_id", "quiz_id", "status"] {
            on_insert.remove(key);
        }

        let upserted = self
            .collection
            .find_one_and_update(filter.clone(), doc! { "$setOnInsert": on_insert })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await;

        match upserted {
            Ok(Some(stored)) => {
                let created = stored.id == candidate.id;
                Ok((stored, created))
            }
            Ok(None) => Err(AppError::InternalError(
                "Upsert of open attempt returned no document".to_string(),
            )),
            // Two upserts raced on the partial unique index; the winner's
            // attempt is the open one.
            Err(e) if is_duplicate_key(&e) => {
                let existing = self.collection.find_one(filter).await?;
                existing.map(|a| (a, false)).ok_or_else(|| {
                    AppError::Conflict(format!(
                        "Concurrent start for quiz '{}' did not settle",
                        candidate.quiz_id
                    ))
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn conditional_update(
        &self,
        id: &str,
        expected: AttemptStatus,
        attempt: QuizAttempt,
    ) -> AppResult<QuizAttempt> {
        let stored = self
            .collection
            .find_one_and_replace(doc! { "id": id, "status": expected.as_str() }, &attempt)
            .return_document(ReturnDocument::After)
            .await?;

        stored.ok_or_else(|| {
            AppError::Conflict(format!(
                "Attempt '{}' is no longer {}",
                id,
                expected.as_str()
            ))
        })
    }

    async fn list_by_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<QuizAttempt>, i64)> {
        let filter = doc! { "user_id": user_id };

        let total = self.collection.count_documents(filter.clone()).await?;

        let attempts = self
            .collection
            .find(filter)
            .skip(offset as u64)
            .limit(limit)
            .sort(doc! { "submitted_at": -1, "started_at": -1 })
            .await?
            .try_collect()
            .await?;

        Ok((attempts, total as i64))
    }

    async fn list_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizAttempt>> {
        let attempts = self
            .collection
            .find(doc! { "quiz_id": quiz_id })
            .sort(doc! { "total_score": -1, "submitted_at": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(attempts)
    }
}
