use actix_web::{web, App, HttpServer};
use backend::analytics::{AnalyticsEngine, AnalyticsUseCase, CsvAttemptRepository};
use log::error;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load configuration from environment variables
    let config = match backend::config::Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };

    if backend::metrics::Metrics::global().is_none() {
        log::warn!("Prometheus metrics unavailable; /metrics will be empty");
    }

    let repo = CsvAttemptRepository::new(config.data.attempt_log_path.clone());
    if !repo.path().exists() {
        log::warn!(
            "Attempt log {} does not exist yet; analytics requests will fail until it does",
            repo.path().display()
        );
    }

    let usecase = web::Data::new(AnalyticsUseCase::new(
        Arc::new(repo),
        AnalyticsEngine::with_config(config.analytics.clone()),
    ));

    log::info!(
        "Starting server on {}:{} with {} workers",
        config.server.host,
        config.server.port,
        config.server.workers
    );

    HttpServer::new(move || {
        App::new()
            .wrap(backend::middleware::Logger)
            .wrap(backend::middleware::cors_middleware())
            .app_data(usecase.clone())
            .service(backend::health::health_check)
            .service(backend::health::detailed_health_check)
            .service(backend::metrics::metrics_handler)
            .service(backend::openapi::openapi_json)
            .configure(|cfg| {
                backend::analytics::controller::configure_routes(cfg, usecase.clone());
            })
    })
    .workers(config.server.workers)
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
