use actix_web::get;
use utoipa::OpenApi;
use crate::error::ApiError;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::health::health_check,
        crate::health::detailed_health_check,
    ),
    components(schemas(
        crate::health::HealthResponse,
        crate::health::DetailedHealthResponse,
        crate::health::AttemptLogHealth,
        ApiError,
    )),
    tags(
        (name = "health", description = "Liveness and attempt-log checks"),
    ),
    info(
        title = "Quiz Show Analytics API",
        description = "Read-only statistics over the contestant attempt log: accuracy by category and level, answer-choice bias, choice transitions, sequential patterns and performance clusters.\n\nAll analytics endpoints live under `/api` and answer `GET` requests with JSON.",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Development server"),
    )
)]
pub struct ApiDoc;

#[get("/api-docs/openapi.json")]
pub async fn openapi_json() -> actix_web::HttpResponse {
    actix_web::HttpResponse::Ok().json(ApiDoc::openapi())
}
