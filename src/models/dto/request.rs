use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::AnswerValue;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct AnswerInput {
    #[validate(length(min = 1, max = 64))]
    pub question_id: String,

    pub selected_answer: AnswerValue,

    #[validate(range(max = 86_400))]
    #[serde(default)]
    pub time_taken_secs: Option<u32>,
}

impl AnswerInput {
    pub fn new(question_id: &str, selected_answer: AnswerValue) -> Self {
        AnswerInput {
            question_id: question_id.to_string(),
            selected_answer,
            time_taken_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    #[validate(length(max = 500))]
    #[validate(nested)]
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: Some(0),
            limit: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}
