use serde::Serialize;

use crate::models::domain::{QuizAttempt, User};

#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttemptDetailResponse {
    pub quiz_title: String,
    pub total_points: u64,
    #[serde(flatten)]
    pub attempt: QuizAttempt,
}

/// One entry of a participant's own history, with the quiz title attached.
#[derive(Debug, Clone, Serialize)]
pub struct UserResultRow {
    /// `None` when the quiz has since been removed.
    pub quiz_title: Option<String>,
    #[serde(flatten)]
    pub attempt: QuizAttempt,
}

#[derive(Debug, Clone, Serialize)]
pub struct Participant {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&User> for Participant {
    fn from(user: &User) -> Self {
        Participant {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

/// One entry of a quiz ranking, with the participant's name and email.
#[derive(Debug, Clone, Serialize)]
pub struct QuizResultRow {
    pub participant: Option<Participant>,
    #[serde(flatten)]
    pub attempt: QuizAttempt,
}
