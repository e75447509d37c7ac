use std::sync::Arc;

use actix_web::{
    get,
    http::header::{ContentDisposition, DispositionParam, DispositionType, CONTENT_TYPE},
    web, HttpResponse,
};
use validator::Validate;

use crate::{
    app_state::AppState,
    auth::{require_staff, AuthenticatedUser},
    errors::AppError,
    models::dto::request::PaginationParams,
};

#[get("/results/mine")]
pub async fn my_results(
    state: web::Data<Arc<AppState>>,
    query: web::Query<PaginationParams>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let pagination = query.into_inner();
    pagination.validate()?;

    let response = state
        .result_service
        .my_results(auth.user_id(), pagination.offset(), pagination.limit())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/results/quiz/{quiz_id}")]
pub async fn quiz_results(
    state: web::Data<Arc<AppState>>,
    quiz_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_staff(&auth.0)?;

    let results = state.result_service.quiz_results(&quiz_id).await?;
    Ok(HttpResponse::Ok().json(results))
}

#[get("/results/export/{quiz_id}")]
pub async fn export_results(
    state: web::Data<Arc<AppState>>,
    quiz_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    require_staff(&auth.0)?;

    let export = state.result_service.export_results(&quiz_id).await?;
    Ok(HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, "text/csv; charset=utf-8"))
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(export.filename)],
        })
        .body(export.csv))
}

#[get("/results/{attempt_id}")]
pub async fn result_details(
    state: web::Data<Arc<AppState>>,
    attempt_id: web::Path<String>,
    auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let detail = state
        .result_service
        .result_details(&attempt_id, &auth.0)
        .await?;
    Ok(HttpResponse::Ok().json(detail))
}
