use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{
        MongoQuizAttemptRepository, MongoQuizRepository, MongoUserRepository,
        QuizAttemptRepository, QuizRepository, UserRepository,
    },
    services::{
        attempt_engine::{AttemptEngine, EnginePolicy},
        result_service::ResultService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub attempt_engine: Arc<AttemptEngine>,
    pub result_service: Arc<ResultService>,
    pub config: Arc<Config>,
    /// Absent when the state is assembled from in-memory collaborators.
    pub db: Option<Database>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let quiz_repository = Arc::new(MongoQuizRepository::new(&db));
        quiz_repository.ensure_indexes().await?;

        let attempt_repository = Arc::new(MongoQuizAttemptRepository::new(&db));
        attempt_repository.ensure_indexes().await?;

        let user_repository = Arc::new(MongoUserRepository::new(&db));
        user_repository.ensure_indexes().await?;

        let mut state = Self::from_parts(
            quiz_repository,
            attempt_repository,
            user_repository,
            config,
        );
        state.db = Some(db);
        Ok(state)
    }

    pub fn from_parts(
        quizzes: Arc<dyn QuizRepository>,
        attempts: Arc<dyn QuizAttemptRepository>,
        users: Arc<dyn UserRepository>,
        config: Config,
    ) -> Self {
        let attempt_engine = Arc::new(AttemptEngine::new(
            quizzes.clone(),
            attempts.clone(),
            EnginePolicy::from_config(&config),
        ));
        let result_service = Arc::new(ResultService::new(quizzes, attempts, users));

        Self {
            attempt_engine,
            result_service,
            config: Arc::new(config),
            db: None,
        }
    }

    pub async fn health_check(&self) -> AppResult<()> {
        match &self.db {
            Some(db) => db.health_check().await,
            None => Ok(()),
        }
    }
}
