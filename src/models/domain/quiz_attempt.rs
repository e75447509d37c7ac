use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::quiz_question::AnswerValue;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttemptStatus {
    InProgress,
    Submitted,
    Graded,
    Flagged,
}

impl AttemptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptStatus::InProgress => "in-progress",
            AttemptStatus::Submitted => "submitted",
            AttemptStatus::Graded => "graded",
            AttemptStatus::Flagged => "flagged",
        }
    }

    /// Only an in-progress attempt accepts a submission.
    pub fn is_open(&self) -> bool {
        matches!(self, AttemptStatus::InProgress)
    }

    pub fn can_transition_to(&self, next: AttemptStatus) -> bool {
        matches!(
            (self, next),
            (AttemptStatus::InProgress, AttemptStatus::Submitted)
                | (AttemptStatus::Submitted, AttemptStatus::Graded)
                | (AttemptStatus::Submitted, AttemptStatus::Flagged)
        )
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_info: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct QuizAttempt {
    pub id: String,
    pub user_id: String,
    pub quiz_id: String,
    pub status: AttemptStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub answers: Vec<AnswerRecord>,
    #[serde(default)]
    pub total_score: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    #[serde(flatten)]
    pub client: ClientInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnswerRecord {
    pub question_id: String,
    pub selected_answer: AnswerValue,
    pub is_correct: bool,
    pub points_awarded: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_taken_secs: Option<u32>,
}

/// The outcome of grading one submission, ready to be folded into an attempt.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredSubmission {
    pub answers: Vec<AnswerRecord>,
    pub total_score: u64,
    pub percentage: f64,
}

impl QuizAttempt {
    pub fn start(user_id: &str, quiz_id: &str, client: ClientInfo) -> Self {
        let now = Utc::now();
        QuizAttempt {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            quiz_id: quiz_id.to_string(),
            status: AttemptStatus::InProgress,
            started_at: now,
            submitted_at: None,
            answers: Vec::new(),
            total_score: 0,
            percentage: None,
            client,
            created_at: Some(now),
            modified_at: Some(now),
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Builds the submitted state without touching `self`, so a failed write
    /// leaves the caller's copy as it was.
    pub fn submitted(&self, scored: ScoredSubmission, at: DateTime<Utc>) -> QuizAttempt {
        QuizAttempt {
            status: AttemptStatus::Submitted,
            submitted_at: Some(at),
            answers: scored.answers,
            total_score: scored.total_score,
            percentage: Some(scored.percentage),
            modified_at: Some(at),
            ..self.clone()
        }
    }
}
