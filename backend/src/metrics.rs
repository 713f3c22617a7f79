use actix_web::{get, HttpResponse};
use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Registry exposed at `/metrics`.
static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static METRICS: Lazy<Option<Metrics>> = Lazy::new(|| match Metrics::new(&REGISTRY) {
    Ok(metrics) => Some(metrics),
    Err(e) => {
        log::error!("Failed to initialize metrics: {}", e);
        None
    }
});

/// HTTP request metrics
pub struct HttpMetrics {
    /// Request duration histogram (in seconds)
    pub request_duration: HistogramVec,
    pub requests_total: IntCounterVec,
    pub requests_in_flight: IntGauge,
}

/// Analytics pass metrics
pub struct AnalyticsMetrics {
    /// Computation duration per operation (in seconds)
    pub computation_duration: HistogramVec,
    pub computations_total: IntCounterVec,
    /// Records in the most recently loaded attempt log
    pub log_records: IntGauge,
}

pub struct Metrics {
    pub http: HttpMetrics,
    pub analytics: AnalyticsMetrics,
}

impl Metrics {
    /// Creates every metric and registers it with `registry`.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .namespace("quiz")
            .subsystem("http"),
            &["method", "endpoint", "status_code"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        let requests_total = IntCounterVec::new(
            Opts::new("requests_total", "Total number of HTTP requests")
                .namespace("quiz")
                .subsystem("http"),
            &["method", "endpoint", "status_code"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let requests_in_flight = IntGauge::with_opts(
            Opts::new(
                "requests_in_flight",
                "Number of HTTP requests currently being processed",
            )
            .namespace("quiz")
            .subsystem("http"),
        )?;
        registry.register(Box::new(requests_in_flight.clone()))?;

        let computation_duration = HistogramVec::new(
            HistogramOpts::new(
                "computation_duration_seconds",
                "Analytics computation duration in seconds",
            )
            .namespace("quiz")
            .subsystem("analytics"),
            &["operation"],
        )?;
        registry.register(Box::new(computation_duration.clone()))?;

        let computations_total = IntCounterVec::new(
            Opts::new("computations_total", "Total number of analytics computations")
                .namespace("quiz")
                .subsystem("analytics"),
            &["operation", "status"],
        )?;
        registry.register(Box::new(computations_total.clone()))?;

        let log_records = IntGauge::with_opts(
            Opts::new("log_records", "Records in the last loaded attempt log")
                .namespace("quiz")
                .subsystem("analytics"),
        )?;
        registry.register(Box::new(log_records.clone()))?;

        Ok(Metrics {
            http: HttpMetrics {
                request_duration,
                requests_total,
                requests_in_flight,
            },
            analytics: AnalyticsMetrics {
                computation_duration,
                computations_total,
                log_records,
            },
        })
    }

    /// Process-wide metrics, `None` if registration failed.
    pub fn global() -> Option<&'static Metrics> {
        METRICS.as_ref()
    }

    pub fn registry() -> &'static Registry {
        &REGISTRY
    }
}

/// Helper function to record HTTP request metrics
pub fn record_http_request(
    metrics: &Metrics,
    method: &str,
    endpoint: &str,
    status_code: u16,
    duration: Duration,
) {
    let status_str = status_code.to_string();

    metrics
        .http
        .request_duration
        .with_label_values(&[method, endpoint, &status_str])
        .observe(duration.as_secs_f64());

    metrics
        .http
        .requests_total
        .with_label_values(&[method, endpoint, &status_str])
        .inc();
}

/// Helper function to record one analytics computation
pub fn record_computation(metrics: &Metrics, operation: &str, success: bool, duration: Duration) {
    let status = if success { "ok" } else { "error" };

    metrics
        .analytics
        .computation_duration
        .with_label_values(&[operation])
        .observe(duration.as_secs_f64());

    metrics
        .analytics
        .computations_total
        .with_label_values(&[operation, status])
        .inc();
}

/// Prometheus text exposition of every registered metric.
#[get("/metrics")]
pub async fn metrics_handler() -> HttpResponse {
    // Touch the lazy so the families exist even before the first request.
    let _ = Metrics::global();

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    match encoder.encode(&REGISTRY.gather(), &mut buffer) {
        Ok(()) => HttpResponse::Ok()
            .content_type(encoder.format_type())
            .body(buffer),
        Err(e) => {
            log::error!("Failed to encode metrics: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
