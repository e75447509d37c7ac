use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    auth::{require_owner_or_admin, Claims},
    errors::{AppError, AppResult},
    models::domain::{Quiz, QuizAttempt, User},
    models::dto::response::{
        AttemptDetailResponse, PaginatedResponse, Participant, QuizResultRow, UserResultRow,
    },
    repositories::{QuizAttemptRepository, QuizRepository, UserRepository},
    services::attempt_engine::percentage,
};

const CSV_HEADER: &str = "Name,Email,Registration Number,Score,Percentage";

pub struct ResultsExport {
    pub filename: String,
    pub csv: String,
}

/// Read side of attempts: personal history, per-quiz rankings and exports.
pub struct ResultService {
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
    users: Arc<dyn UserRepository>,
}

impl ResultService {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        attempts: Arc<dyn QuizAttemptRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            quizzes,
            attempts,
            users,
        }
    }

    pub async fn my_results(
        &self,
        user_id: &str,
        offset: i64,
        limit: i64,
    ) -> AppResult<PaginatedResponse<UserResultRow>> {
        let (attempts, total) = self.attempts.list_by_user(user_id, offset, limit).await?;

        let quiz_ids = distinct(attempts.iter().map(|a| a.quiz_id.clone()));
        let titles: HashMap<String, String> = self
            .quizzes
            .find_by_ids(&quiz_ids)
            .await?
            .into_iter()
            .map(|q| (q.id, q.title))
            .collect();

        let items = attempts
            .into_iter()
            .map(|attempt| UserResultRow {
                quiz_title: titles.get(&attempt.quiz_id).cloned(),
                attempt,
            })
            .collect();

        Ok(PaginatedResponse {
            items,
            total,
            offset,
            limit,
        })
    }

    pub async fn result_details(
        &self,
        attempt_id: &str,
        claims: &Claims,
    ) -> AppResult<AttemptDetailResponse> {
        let attempt = self
            .attempts
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Result with id '{}' not found", attempt_id)))?;

        require_owner_or_admin(claims, &attempt.user_id)?;

        let quiz = self.load_quiz(&attempt.quiz_id).await?;
        Ok(AttemptDetailResponse {
            quiz_title: quiz.title.clone(),
            total_points: quiz.total_points(),
            attempt,
        })
    }

    /// Every attempt of a quiz, highest score first, with participant details.
    pub async fn quiz_results(&self, quiz_id: &str) -> AppResult<Vec<QuizResultRow>> {
        let quiz = self.load_quiz(quiz_id).await?;
        let attempts = self.attempts.list_by_quiz(&quiz.id).await?;
        let users = self.participants(&attempts).await?;

        Ok(attempts
            .into_iter()
            .map(|attempt| QuizResultRow {
                participant: users.get(&attempt.user_id).map(Participant::from),
                attempt,
            })
            .collect())
    }

    /// Scored attempts of a quiz as CSV, one row per attempt.
    pub async fn export_results(&self, quiz_id: &str) -> AppResult<ResultsExport> {
        let quiz = self.load_quiz(quiz_id).await?;
        let attempts: Vec<QuizAttempt> = self
            .attempts
            .list_by_quiz(&quiz.id)
            .await?
            .into_iter()
            .filter(|a| !a.status.is_open())
            .collect();

        let users = self.participants(&attempts).await?;

        log::info!(
            "Exporting {} results for quiz {}",
            attempts.len(),
            quiz.id
        );

        Ok(ResultsExport {
            filename: export_filename(&quiz),
            csv: render_csv(&quiz, &attempts, &users),
        })
    }

    async fn participants(&self, attempts: &[QuizAttempt]) -> AppResult<HashMap<String, User>> {
        let user_ids = distinct(attempts.iter().map(|a| a.user_id.clone()));
        Ok(self
            .users
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect())
    }

    async fn load_quiz(&self, quiz_id: &str) -> AppResult<Quiz> {
        self.quizzes
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", quiz_id)))
    }
}

fn distinct(ids: impl Iterator<Item = String>) -> Vec<String> {
    let mut ids: Vec<String> = ids.collect();
    ids.sort();
    ids.dedup();
    ids
}

fn render_csv(quiz: &Quiz, attempts: &[QuizAttempt], users: &HashMap<String, User>) -> String {
    let total_points = quiz.total_points();
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');

    for attempt in attempts {
        let user = users.get(&attempt.user_id);
        let pct = attempt
            .percentage
            .unwrap_or_else(|| percentage(attempt.total_score, total_points));

        let row = [
            csv_field(&user.map(User::full_name).unwrap_or_default()),
            csv_field(user.map(|u| u.email.as_str()).unwrap_or_default()),
            csv_field(
                user.and_then(|u| u.registration_number.as_deref())
                    .unwrap_or_default(),
            ),
            attempt.total_score.to_string(),
            format!("{:.2}%", pct),
        ];
        csv.push_str(&row.join(","));
        csv.push('\n');
    }

    csv
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn export_filename(quiz: &Quiz) -> String {
    let slug: String = quiz
        .title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("results-{}.csv", slug.trim_matches('-'))
}
