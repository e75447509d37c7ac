use std::sync::Arc;

use actix_web::{http::header::USER_AGENT, post, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::AuthenticatedUser,
    errors::AppError,
    middleware::get_request_id,
    models::domain::ClientInfo,
    models::dto::request::SubmitAttemptRequest,
};

/// Forwarded headers are client controlled, so only the socket peer is recorded.
fn client_info(req: &HttpRequest) -> ClientInfo {
    ClientInfo {
        ip_address: req.peer_addr().map(|addr| addr.ip().to_string()),
        device_info: req
            .headers()
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    }
}

/// Opens an attempt, or hands back the one already in progress.
#[post("/quizzes/{quiz_id}/attempts")]
pub async fn start_attempt(
    state: web::Data<Arc<AppState>>,
    quiz_id: web::Path<String>,
    req: HttpRequest,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let started = state
        .attempt_engine
        .start_with_client(auth.user_id(), &quiz_id, client_info(&req))
        .await?;

    if started.created {
        Ok(HttpResponse::Created().json(started.attempt))
    } else {
        Ok(HttpResponse::Ok().json(started.attempt))
    }
}

#[post("/attempts/{attempt_id}/submit")]
pub async fn submit_attempt(
    state: web::Data<Arc<AppState>>,
    attempt_id: web::Path<String>,
    request: web::Json<SubmitAttemptRequest>,
    req: HttpRequest,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    request.validate()?;

    log::debug!(
        "[{}] submit of attempt {} with {} answers",
        get_request_id(&req).unwrap_or_default(),
        attempt_id,
        request.answers.len()
    );

    let attempt = state
        .attempt_engine
        .submit(&attempt_id, auth.user_id(), &request.answers)
        .await?;
    Ok(HttpResponse::Ok().json(attempt))
}
