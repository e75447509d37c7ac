pub mod attempt_engine;
pub mod result_service;

pub use attempt_engine::{AttemptEngine, EnginePolicy, StartedAttempt, UnknownQuestionPolicy};
pub use result_service::ResultService;
