use super::reducers::StatSort;
use super::usecase::AnalyticsUseCase;
use crate::error::ApiError;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use shared::Result;

#[derive(Debug, Default, Deserialize)]
pub struct SortQuery {
    pub sort: Option<StatSort>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PatternQuery {
    pub top_k: Option<usize>,
}

/// Logs a failed query once and turns the result into a response.
fn respond<T: Serialize>(operation: &str, result: Result<T>) -> std::result::Result<HttpResponse, ApiError> {
    match result {
        Ok(body) => Ok(HttpResponse::Ok().json(body)),
        Err(e) => {
            log::error!("Failed to compute {}: {}", operation, e);
            Err(ApiError::from(e))
        }
    }
}

pub async fn get_data(usecase: web::Data<AnalyticsUseCase>) -> std::result::Result<HttpResponse, ApiError> {
    respond("data", usecase.data().await)
}

pub async fn get_stats(usecase: web::Data<AnalyticsUseCase>) -> std::result::Result<HttpResponse, ApiError> {
    respond("stats", usecase.overview_stats().await)
}

pub async fn get_category_stats(
    usecase: web::Data<AnalyticsUseCase>,
    query: web::Query<SortQuery>,
) -> std::result::Result<HttpResponse, ApiError> {
    let sort = query.into_inner().sort.unwrap_or_default();
    respond("category_stats", usecase.category_stats(sort).await)
}

pub async fn get_category_stat(
    usecase: web::Data<AnalyticsUseCase>,
    path: web::Path<String>,
) -> std::result::Result<HttpResponse, ApiError> {
    respond("category_stats", usecase.category_stat(path.into_inner()).await)
}

pub async fn get_level_stats(usecase: web::Data<AnalyticsUseCase>) -> std::result::Result<HttpResponse, ApiError> {
    respond("level_stats", usecase.level_stats().await)
}

pub async fn get_level_stat(
    usecase: web::Data<AnalyticsUseCase>,
    path: web::Path<String>,
) -> std::result::Result<HttpResponse, ApiError> {
    let raw = path.into_inner();
    let level = match raw.parse::<u32>() {
        Ok(level) if level >= 1 => level,
        _ => {
            log::warn!("Rejected level '{}'", raw);
            return Err(ApiError::bad_request("level must be a positive integer"));
        }
    };
    respond("level_stats", usecase.level_stat(level).await)
}

pub async fn get_joker_stats(
    usecase: web::Data<AnalyticsUseCase>,
    query: web::Query<SortQuery>,
) -> std::result::Result<HttpResponse, ApiError> {
    let sort = query.into_inner().sort.unwrap_or_default();
    respond("joker_stats", usecase.joker_stats(sort).await)
}

pub async fn get_contestant_performance(
    usecase: web::Data<AnalyticsUseCase>,
) -> std::result::Result<HttpResponse, ApiError> {
    respond("contestant_performance", usecase.contestant_performance().await)
}

pub async fn get_answer_choice_stats(
    usecase: web::Data<AnalyticsUseCase>,
) -> std::result::Result<HttpResponse, ApiError> {
    respond("answer_choice_stats", usecase.answer_choice_stats().await)
}

pub async fn get_elimination_analysis(
    usecase: web::Data<AnalyticsUseCase>,
) -> std::result::Result<HttpResponse, ApiError> {
    respond("elimination_analysis", usecase.elimination_analysis().await)
}

pub async fn get_topic_preparation_guide(
    usecase: web::Data<AnalyticsUseCase>,
) -> std::result::Result<HttpResponse, ApiError> {
    respond("topic_preparation_guide", usecase.topic_preparation_guide().await)
}

pub async fn get_detailed_answer_analysis(
    usecase: web::Data<AnalyticsUseCase>,
) -> std::result::Result<HttpResponse, ApiError> {
    respond("detailed_answer_analysis", usecase.detailed_answer_analysis().await)
}

pub async fn get_pattern_analysis(
    usecase: web::Data<AnalyticsUseCase>,
    query: web::Query<PatternQuery>,
) -> std::result::Result<HttpResponse, ApiError> {
    let top_k = query.into_inner().top_k;
    if top_k == Some(0) {
        log::warn!("Rejected top_k=0");
        return Err(ApiError::bad_request("top_k must be at least 1"));
    }
    respond("pattern_analysis", usecase.pattern_analysis(top_k).await)
}

pub async fn get_report(usecase: web::Data<AnalyticsUseCase>) -> std::result::Result<HttpResponse, ApiError> {
    respond("report", usecase.report().await)
}

/// Registers the read-only analytics API under `/api`.
pub fn configure_routes(cfg: &mut web::ServiceConfig, usecase: web::Data<AnalyticsUseCase>) {
    log::debug!("Registering analytics routes:");
    log::debug!("  GET /api/data");
    log::debug!("  GET /api/stats");
    log::debug!("  GET /api/category_stats[/{{category}}]");
    log::debug!("  GET /api/level_stats[/{{level}}]");
    log::debug!("  GET /api/joker_stats");
    log::debug!("  GET /api/contestant_performance");
    log::debug!("  GET /api/answer_choice_stats");
    log::debug!("  GET /api/elimination_analysis");
    log::debug!("  GET /api/topic_preparation_guide");
    log::debug!("  GET /api/detailed_answer_analysis");
    log::debug!("  GET /api/pattern_analysis");
    log::debug!("  GET /api/report");

    cfg.service(
        web::scope("/api")
            .app_data(usecase)
            .route("/data", web::get().to(get_data))
            .route("/stats", web::get().to(get_stats))
            .route("/category_stats", web::get().to(get_category_stats))
            .route("/category_stats/{category}", web::get().to(get_category_stat))
            .route("/level_stats", web::get().to(get_level_stats))
            .route("/level_stats/{level}", web::get().to(get_level_stat))
            .route("/joker_stats", web::get().to(get_joker_stats))
            .route("/contestant_performance", web::get().to(get_contestant_performance))
            .route("/answer_choice_stats", web::get().to(get_answer_choice_stats))
            .route("/elimination_analysis", web::get().to(get_elimination_analysis))
            .route("/topic_preparation_guide", web::get().to(get_topic_preparation_guide))
            .route("/detailed_answer_analysis", web::get().to(get_detailed_answer_analysis))
            .route("/pattern_analysis", web::get().to(get_pattern_analysis))
            .route("/report", web::get().to(get_report)),
    );
}
