use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{
        AnswerRecord, AttemptStatus, ClientInfo, Quiz, QuizAttempt, QuizQuestion, ScoredSubmission,
    },
    models::dto::request::AnswerInput,
    repositories::{QuizAttemptRepository, QuizRepository},
};

/// What to do with an answer whose question is not part of the quiz.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnknownQuestionPolicy {
    /// Leave the answer out of scoring and of the stored answers.
    #[default]
    Drop,
    /// Fail the whole submission with a validation error.
    Reject,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnginePolicy {
    pub require_published: bool,
    pub unknown_questions: UnknownQuestionPolicy,
}

impl Default for EnginePolicy {
    fn default() -> Self {
        Self {
            require_published: true,
            unknown_questions: UnknownQuestionPolicy::Drop,
        }
    }
}

impl EnginePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            require_published: config.require_published_quiz,
            unknown_questions: if config.reject_unknown_questions {
                UnknownQuestionPolicy::Reject
            } else {
                UnknownQuestionPolicy::Drop
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StartedAttempt {
    pub attempt: QuizAttempt,
    /// False when an open attempt was resumed.
    pub created: bool,
}

/// Share of `total_points` earned, in percent, rounded to two decimals.
/// A quiz worth nothing scores 0%.
pub fn percentage(total_score: u64, total_points: u64) -> f64 {
    if total_points == 0 {
        return 0.0;
    }
    let raw = 100.0 * total_score as f64 / total_points as f64;
    ((raw * 100.0).round() / 100.0).clamp(0.0, 100.0)
}

/// Lifecycle of a single quiz attempt: start, resume, submit and score.
pub struct AttemptEngine {
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn QuizAttemptRepository>,
    policy: EnginePolicy,
}

impl AttemptEngine {
    pub fn new(
        quizzes: Arc<dyn QuizRepository>,
        attempts: Arc<dyn QuizAttemptRepository>,
        policy: EnginePolicy,
    ) -> Self {
        Self {
            quizzes,
            attempts,
            policy,
        }
    }

    pub async fn start(&self, participant_id: &str, quiz_id: &str) -> AppResult<StartedAttempt> {
        self.start_with_client(participant_id, quiz_id, ClientInfo::default())
            .await
    }

    /// Returns the participant's open attempt for the quiz, or opens one.
    pub async fn start_with_client(
        &self,
        participant_id: &str,
        quiz_id: &str,
        client: ClientInfo,
    ) -> AppResult<StartedAttempt> {
        let quiz = self.load_quiz(quiz_id).await?;

        if self.policy.require_published && !quiz.is_published {
            return Err(AppError::Forbidden(format!(
                "Quiz '{}' is not open for attempts",
                quiz.id
            )));
        }

        if let Some(existing) = self.attempts.find_open(participant_id, &quiz.id).await? {
            log::debug!(
                "Resuming attempt {} for user {} on quiz {}",
                existing.id,
                participant_id,
                quiz.id
            );
            return Ok(StartedAttempt {
                attempt: existing,
                created: false,
            });
        }

        let candidate = QuizAttempt::start(participant_id, &quiz.id, client);
        let (attempt, created) = self.attempts.find_or_create_open(candidate).await?;

        if created {
            log::info!(
                "User {} started attempt {} on quiz {}",
                participant_id,
                attempt.id,
                quiz.id
            );
        }

        Ok(StartedAttempt { attempt, created })
    }

    /// Scores the answers and moves the attempt to `submitted` in one write.
    pub async fn submit(
        &self,
        attempt_id: &str,
        participant_id: &str,
        answers: &[AnswerInput],
    ) -> AppResult<QuizAttempt> {
        let attempt = self
            .attempts
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attempt with id '{}' not found", attempt_id)))?;

        if !attempt.is_owned_by(participant_id) {
            log::warn!(
                "User {} tried to submit attempt {} owned by {}",
                participant_id,
                attempt.id,
                attempt.user_id
            );
            return Err(AppError::Forbidden(
                "You can only submit your own attempts".to_string(),
            ));
        }

        if !attempt.status.can_transition_to(AttemptStatus::Submitted) {
            return Err(AppError::Conflict(format!(
                "Attempt '{}' has already been {}",
                attempt.id,
                attempt.status.as_str()
            )));
        }

        let quiz = self.load_quiz(&attempt.quiz_id).await?;
        let scored = Self::grade(&quiz, answers, self.policy.unknown_questions)?;
        let updated = attempt.submitted(scored, Utc::now());

        let stored = self
            .attempts
            .conditional_update(&attempt.id, AttemptStatus::InProgress, updated)
            .await?;

        log::info!(
            "User {} submitted attempt {}: {}/{} ({}%)",
            participant_id,
            stored.id,
            stored.total_score,
            quiz.total_points(),
            stored.percentage.unwrap_or_default()
        );

        Ok(stored)
    }

    /// Grades answers in submission order. Each resolved answer earns the
    /// question's full points or nothing.
    pub fn grade(
        quiz: &Quiz,
        answers: &[AnswerInput],
        unknown_questions: UnknownQuestionPolicy,
    ) -> AppResult<ScoredSubmission> {
        let question_map: HashMap<&str, &QuizQuestion> = quiz
            .questions
            .iter()
            .map(|q| (q.id.as_str(), q))
            .collect();

        let mut answered: HashSet<&str> = HashSet::new();
        let mut total_score: u64 = 0;
        let mut records = Vec::with_capacity(answers.len());

        for answer in answers {
            let Some(question) = question_map.get(answer.question_id.as_str()) else {
                match unknown_questions {
                    UnknownQuestionPolicy::Drop => {
                        log::warn!(
                            "Dropping answer for unknown question {} on quiz {}",
                            answer.question_id,
                            quiz.id
                        );
                        continue;
                    }
                    UnknownQuestionPolicy::Reject => {
                        return Err(AppError::ValidationError(format!(
                            "Question '{}' is not part of quiz '{}'",
                            answer.question_id, quiz.id
                        )));
                    }
                }
            };

            if !answered.insert(answer.question_id.as_str()) {
                return Err(AppError::ValidationError(format!(
                    "Question '{}' was answered more than once",
                    answer.question_id
                )));
            }

            let (is_correct, points_awarded) = question.points_for(&answer.selected_answer);
            total_score += u64::from(points_awarded);

            records.push(AnswerRecord {
                question_id: question.id.clone(),
                selected_answer: answer.selected_answer.clone(),
                is_correct,
                points_awarded,
                time_taken_secs: answer.time_taken_secs,
            });
        }

        Ok(ScoredSubmission {
            answers: records,
            total_score,
            percentage: percentage(total_score, quiz.total_points()),
        })
    }

    async fn load_quiz(&self, quiz_id: &str) -> AppResult<Quiz> {
        self.quizzes
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", quiz_id)))
    }
}
