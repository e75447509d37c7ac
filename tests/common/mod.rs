#![allow(dead_code)]

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use quizhall_server::{
    errors::{AppError, AppResult},
    models::domain::{
        AttemptStatus, QuestionKind, Quiz, QuizAttempt, QuizQuestion, User,
    },
    repositories::{QuizAttemptRepository, QuizRepository, UserRepository},
};

#[derive(Default)]
pub struct InMemoryQuizRepository {
    quizzes: Arc<RwLock<HashMap<String, Quiz>>>,
}

impl InMemoryQuizRepository {
    pub fn with(quizzes: Vec<Quiz>) -> Self {
        let map = quizzes.into_iter().map(|q| (q.id.clone(), q)).collect();
        Self {
            quizzes: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        let quizzes = self.quizzes.read().await;
        Ok(quizzes.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<Quiz>> {
        let quizzes = self.quizzes.read().await;
        Ok(ids.iter().filter_map(|id| quizzes.get(id).cloned()).collect())
    }
}

#[derive(Default)]
pub struct InMemoryQuizAttemptRepository {
    attempts: Arc<RwLock<HashMap<String, QuizAttempt>>>,
}

impl InMemoryQuizAttemptRepository {
    pub async fn len(&self) -> usize {
        self.attempts.read().await.len()
    }

    pub async fn insert(&self, attempt: QuizAttempt) {
        self.attempts
            .write()
            .await
            .insert(attempt.id.clone(), attempt);
    }
}

fn is_open_for(attempt: &QuizAttempt, user_id: &str, quiz_id: &str) -> bool {
    attempt.user_id == user_id && attempt.quiz_id == quiz_id && attempt.status.is_open()
}

fn page<T: Clone>(items: &[T], offset: i64, limit: i64) -> Vec<T> {
    let start = offset.max(0) as usize;
    let end = (start + limit.max(0) as usize).min(items.len());
    if start >= items.len() {
        vec![]
    } else {
        items[start..end].to_vec()
    }
}

#[async_trait]
impl QuizAttemptRepository for InMemoryQuizAttemptRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<QuizAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(attempts.get(id).cloned())
    }

    async fn find_open(&self, user_id: &str, quiz_id: &str) -> AppResult<Option<QuizAttempt>> {
        let attempts = self.attempts.read().await;
        Ok(attempts
            .values()
            .find(|a| is_open_for(a, user_id, quiz_id))
            .cloned())
    }

    async fn create(&self, attempt: QuizAttempt) -> AppResult<QuizAttempt> {
        let mut attempts = self.attempts.write().await;
        let clash = attempts.contains_key(&attempt.id)
            || (attempt.status.is_open()
                && attempts
                    .values()
                    .any(|a| is_open_for(a, &attempt.user_id, &attempt.quiz_id)));
        if clash {
            return Err(AppError::Conflict(format!(
                "User '{}' already has an open attempt on quiz '{}'",
                attempt.user_id, attempt.quiz_id
            )));
        }
        attempts.insert(attempt.id.clone(), attempt.clone());
        Ok(attempt)
    }

    async fn find_or_create_open(&self, candidate: QuizAttempt) -> AppResult<(QuizAttempt, bool)> {
        let mut attempts = self.attempts.write().await;
        if let Some(open) = attempts
            .values()
            .find(|a| is_open_for(a, &candidate.user_id, &candidate.quiz_id))
        {
            return Ok((open.clone(), false));
        }
        attempts.insert(candidate.id.clone(), candidate.clone());
        Ok((candidate, true))
    }

    async fn conditional_update(
        &self,
        id: &str,
        expected: AttemptStatus,
        attempt: QuizAttempt,
    ) -> AppResult<QuizAttempt> {
        let mut attempts = self.attempts.write().await;
        if !attempts.get(id).is_some_and(|a| a.status == expected) {
            return Err(AppError::Conflict(format!(
                "Attempt '{}' is no longer {}",
                id,
                expected.as_str()
            )));
        }
        attempts.insert(id.to_string(), attempt.clone());
        Ok(attempt)
    }

    async fn list_by_user(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<QuizAttempt>, i64)> {
        let attempts = self.attempts.read().await;
        let mut items: Vec<_> = attempts
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            b.submitted_at
                .cmp(&a.submitted_at)
                .then(b.started_at.cmp(&a.started_at))
        });

        let total = items.len() as i64;
        Ok((page(&items, offset, limit), total))
    }

    async fn list_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<QuizAttempt>> {
        let attempts = self.attempts.read().await;
        let mut items: Vec<_> = attempts
            .values()
            .filter(|a| a.quiz_id == quiz_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            b.total_score
                .cmp(&a.total_score)
                .then(a.submitted_at.cmp(&b.submitted_at))
        });
        Ok(items)
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn with(users: Vec<User>) -> Self {
        let map = users.into_iter().map(|u| (u.id.clone(), u)).collect();
        Self {
            users: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }
}

pub fn multiple_choice(id: &str, correct: &str, points: u32) -> QuizQuestion {
    QuizQuestion::new(
        id,
        &format!("Question {}", id),
        QuestionKind::MultipleChoice {
            options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            correct_answer: correct.to_string(),
        },
        points,
    )
}

/// Two multiple-choice questions worth 1 and 2 points; answers "A" then "B".
pub fn two_question_quiz(id: &str) -> Quiz {
    let mut quiz = Quiz::new(
        "Two questions",
        "instructor-1",
        vec![multiple_choice("q1", "A", 1), multiple_choice("q2", "B", 2)],
    );
    quiz.id = id.to_string();
    quiz.is_published = true;
    quiz
}

pub fn user(id: &str, first_name: &str, last_name: &str) -> User {
    let mut user = User::new(
        first_name,
        last_name,
        &format!("{}@example.com", first_name.to_lowercase()),
    );
    user.id = id.to_string();
    user
}
