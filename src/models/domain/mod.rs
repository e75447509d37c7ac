pub mod quiz;
pub mod quiz_attempt;
pub mod quiz_question;
pub mod user;
pub use quiz::Quiz;
pub use quiz_attempt::{AnswerRecord, AttemptStatus, ClientInfo, QuizAttempt, ScoredSubmission};
pub use quiz_question::{AnswerValue, QuestionKind, QuizQuestion};
pub use user::{User, UserRole};
