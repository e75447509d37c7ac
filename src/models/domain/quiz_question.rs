use serde::{Deserialize, Serialize};

fn default_points() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizQuestion {
    pub id: String,
    pub question_text: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
    #[serde(default = "default_points")]
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// The question type together with the shape of its correct answer.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "question_type", rename_all = "kebab-case")]
pub enum QuestionKind {
    MultipleChoice {
        options: Vec<String>,
        correct_answer: String,
    },
    TrueFalse {
        correct_answer: bool,
    },
    ShortAnswer {
        correct_answer: String,
    },
}

/// A participant's selected answer. Booleans answer true/false questions,
/// text answers everything else.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Text(String),
}

impl QuizQuestion {
    pub fn new(id: &str, question_text: &str, kind: QuestionKind, points: u32) -> Self {
        QuizQuestion {
            id: id.to_string(),
            question_text: question_text.to_string(),
            kind,
            points,
            explanation: None,
        }
    }

    /// Exact, type-sensitive comparison against the correct answer.
    /// A boolean never matches a text answer and vice versa.
    pub fn is_correct(&self, answer: &AnswerValue) -> bool {
        match (&self.kind, answer) {
            (QuestionKind::MultipleChoice { correct_answer, .. }, AnswerValue::Text(given))
            | (QuestionKind::ShortAnswer { correct_answer }, AnswerValue::Text(given)) => {
                given == correct_answer
            }
            (QuestionKind::TrueFalse { correct_answer }, AnswerValue::Bool(given)) => {
                given == correct_answer
            }
            _ => false,
        }
    }

    pub fn points_for(&self, answer: &AnswerValue) -> (bool, u32) {
        if self.is_correct(answer) {
            (true, self.points)
        } else {
            (false, 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multiple_choice(correct: &str) -> QuizQuestion {
        QuizQuestion::new(
            "q-1",
            "Pick one",
            QuestionKind::MultipleChoice {
                options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
                correct_answer: correct.to_string(),
            },
            2,
        )
    }

    #[test]
    fn multiple_choice_awards_all_or_nothing() {
        let question = multiple_choice("B");

        assert_eq!(question.points_for(&AnswerValue::Text("B".into())), (true, 2));
        assert_eq!(question.points_for(&AnswerValue::Text("A".into())), (false, 0));
    }

    #[test]
    fn text_comparison_is_exact() {
        let question = QuizQuestion::new(
            "q-2",
            "Capital of France",
            QuestionKind::ShortAnswer {
                correct_answer: "Paris".to_string(),
            },
            1,
        );

        assert!(question.is_correct(&AnswerValue::Text("Paris".into())));
        assert!(!question.is_correct(&AnswerValue::Text("paris".into())));
        assert!(!question.is_correct(&AnswerValue::Text("Paris ".into())));
    }

    #[test]
    fn true_false_never_matches_text() {
        let question = QuizQuestion::new(
            "q-3",
            "The sky is blue",
            QuestionKind::TrueFalse {
                correct_answer: true,
            },
            1,
        );

        assert!(question.is_correct(&AnswerValue::Bool(true)));
        assert!(!question.is_correct(&AnswerValue::Bool(false)));
        assert!(!question.is_correct(&AnswerValue::Text("true".into())));
    }

    #[test]
    fn text_question_never_matches_bool() {
        let question = multiple_choice("true");
        assert!(!question.is_correct(&AnswerValue::Bool(true)));
    }

    #[test]
    fn question_document_uses_type_tag_and_default_points() {
        let json = r#"{
            "id": "q-9",
            "question_text": "2 + 2 = 4",
            "question_type": "true-false",
            "correct_answer": true
        }"#;

        let question: QuizQuestion = serde_json::from_str(json).expect("question should parse");

        assert_eq!(question.points, 1);
        assert_eq!(
            question.kind,
            QuestionKind::TrueFalse {
                correct_answer: true
            }
        );
    }

    #[test]
    fn question_document_rejects_mismatched_answer_shape() {
        let json = r#"{
            "id": "q-10",
            "question_text": "Is it?",
            "question_type": "true-false",
            "correct_answer": "yes"
        }"#;

        assert!(serde_json::from_str::<QuizQuestion>(json).is_err());
    }

    #[test]
    fn answer_value_parses_both_shapes() {
        let b: AnswerValue = serde_json::from_str("false").expect("bool answer");
        let t: AnswerValue = serde_json::from_str("\"B\"").expect("text answer");

        assert_eq!(b, AnswerValue::Bool(false));
        assert_eq!(t, AnswerValue::Text("B".to_string()));
    }
}
