use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use actix_web::HttpMessage;
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use log::{error, info, warn};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::Instant;
use uuid::Uuid;

use crate::metrics::{record_http_request, Metrics};

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Counter-based ids under test, UUID v4 otherwise.
fn generate_request_id() -> String {
    let is_test = cfg!(test) || std::env::var("RUST_ENV")
        .unwrap_or_default()
        .eq_ignore_ascii_case("test");

    if is_test {
        format!("test-{}", REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed))
    } else {
        Uuid::new_v4().to_string()
    }
}

/// Access log plus HTTP metrics for every request.
///
/// The request id is stored in the request extensions and echoed in the
/// `x-request-id` response header.
pub struct Logger;

impl<S, B> Transform<S, ServiceRequest> for Logger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggerMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct LoggerMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let start_time = Instant::now();
        let method = req.method().clone();
        let uri = req.uri().clone();
        // Route pattern keeps the metric label set bounded.
        let endpoint = req
            .match_pattern()
            .unwrap_or_else(|| "unmatched".to_string());

        let request_id = generate_request_id();
        req.extensions_mut().insert(request_id.clone());

        let metrics = Metrics::global();
        if let Some(metrics) = metrics {
            metrics.http.requests_in_flight.inc();
        }

        Box::pin(async move {
            let result = svc.call(req).await;
            let duration = start_time.elapsed();
            if let Some(metrics) = metrics {
                metrics.http.requests_in_flight.dec();
            }
            let mut res = result?;

            if let Ok(header_value) = HeaderValue::try_from(request_id.as_str()) {
                res.headers_mut()
                    .insert(HeaderName::from_static("x-request-id"), header_value);
            }

            let status_code = res.status().as_u16();
            if let Some(metrics) = metrics {
                record_http_request(metrics, method.as_str(), &endpoint, status_code, duration);
            }

            if status_code >= 500 {
                error!(
                    "request_id={} {} {} {} {}ms",
                    request_id,
                    method,
                    uri,
                    status_code,
                    duration.as_millis()
                );
            } else if status_code >= 400 {
                warn!(
                    "request_id={} {} {} {} {}ms",
                    request_id,
                    method,
                    uri,
                    status_code,
                    duration.as_millis()
                );
            } else {
                info!(
                    "request_id={} {} {} {} {}ms",
                    request_id,
                    method,
                    uri,
                    status_code,
                    duration.as_millis()
                );
            }

            Ok(res)
        })
    }
}

/// Read-only CORS policy for the dashboard.
///
/// Extra origins come from the comma-separated `CORS_ALLOWED_ORIGINS`.
pub fn cors_middleware() -> actix_cors::Cors {
    let mut cors = actix_cors::Cors::default()
        .allowed_origin("http://localhost:5000")
        .allowed_origin("http://127.0.0.1:5000")
        .allowed_methods(vec!["GET", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::ACCEPT,
            actix_web::http::header::CONTENT_TYPE,
        ])
        .max_age(3600);

    let extra = std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();
    for origin in extra.split(',').map(str::trim).filter(|o| !o.is_empty()) {
        cors = cors.allowed_origin(origin);
    }

    cors
}
