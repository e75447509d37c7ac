pub mod attempt_handler;
pub mod health_handler;
pub mod result_handler;

use actix_web::web;

use crate::{auth::AuthMiddleware, errors::AppError};

pub use attempt_handler::{start_attempt, submit_attempt};
pub use health_handler::{health_check, health_check_live, health_check_ready};
pub use result_handler::{export_results, my_results, quiz_results, result_details};

/// Registers every route. Everything under `/api` requires a bearer token.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .service(health_check)
    .service(health_check_live)
    .service(health_check_ready)
    .service(
        web::scope("/api")
            .wrap(AuthMiddleware)
            .service(start_attempt)
            .service(submit_attempt)
            .service(my_results)
            .service(quiz_results)
            .service(export_results)
            .service(result_details),
    );
}
