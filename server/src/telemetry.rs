//! Logging, tracing export and per-request query counting.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::env;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};
use std::time::Duration;
use tracing::span::{Attributes, Id};
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::Context, EnvFilter, Layer};

const SERVICE_NAME: &str = "recipe-box-server";

/// Initialize telemetry with optional OpenTelemetry export.
/// If OTEL_EXPORTER_OTLP_ENDPOINT is set and reachable, traces and logs are
/// sent to the collector. Otherwise, only console logging is used.
pub fn init_telemetry() {
    // Filters are per layer so the query counter sees every db.query span
    // regardless of RUST_LOG.
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(EnvFilter::from_default_env());

    let Some(endpoint) = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok() else {
        tracing_subscriber::registry()
            .with(fmt_layer)
            .with(DbQueryCountingLayer)
            .init();

        tracing::debug!("OTEL_EXPORTER_OTLP_ENDPOINT not set, using console logging only");
        return;
    };

    if !is_reachable(&endpoint) {
        tracing_subscriber::registry()
            .with(fmt_layer)
            .with(DbQueryCountingLayer)
            .init();

        tracing::info!(
            "OpenTelemetry endpoint {} not reachable, using console logging only",
            endpoint
        );
        return;
    }

    let service_name = env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| SERVICE_NAME.to_string());

    match otel_providers(&endpoint, &service_name) {
        Ok((trace_provider, log_provider)) => {
            let tracer = trace_provider.tracer(SERVICE_NAME);
            opentelemetry::global::set_tracer_provider(trace_provider);

            tracing_subscriber::registry()
                .with(fmt_layer)
                .with(DbQueryCountingLayer)
                .with(
                    tracing_opentelemetry::layer()
                        .with_tracer(tracer)
                        .with_filter(EnvFilter::from_default_env()),
                )
                .with(
                    OpenTelemetryTracingBridge::new(&log_provider)
                        .with_filter(EnvFilter::from_default_env()),
                )
                .init();

            tracing::info!(
                "OpenTelemetry enabled, exporting traces and logs to {} as {}",
                endpoint,
                service_name
            );
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(fmt_layer)
                .with(DbQueryCountingLayer)
                .init();

            tracing::warn!(
                "Failed to set up OpenTelemetry export to {}: {}, using console logging only",
                endpoint,
                e
            );
        }
    }
}

/// Quick TCP check to see if the collector is up.
fn is_reachable(endpoint: &str) -> bool {
    let host_port = endpoint
        .trim_start_matches("http://")
        .trim_start_matches("https://");

    host_port
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| TcpStream::connect_timeout(&addr, Duration::from_millis(100)).is_ok())
        .unwrap_or(false)
}

fn otel_providers(
    endpoint: &str,
    service_name: &str,
) -> Result<(SdkTracerProvider, SdkLoggerProvider), Box<dyn std::error::Error + Send + Sync>> {
    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    let trace_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let trace_provider = SdkTracerProvider::builder()
        .with_batch_exporter(trace_exporter)
        .with_resource(resource.clone())
        .build();

    let log_exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let log_provider = SdkLoggerProvider::builder()
        .with_batch_exporter(log_exporter)
        .with_resource(resource)
        .build();

    Ok((trace_provider, log_provider))
}

/// Response header carrying the number of queries a request issued.
pub const QUERY_COUNT_HEADER: HeaderName = HeaderName::from_static("x-db-query-count");

tokio::task_local! {
    /// Queries issued so far by the request running on this task.
    static QUERY_COUNT: Arc<AtomicU32>;
}

/// Counts `db.query` spans against the request that opened them.
///
/// Store calls open their span on the request task before any blocking work
/// is handed off, so the task-local counter is in scope at creation time.
/// Spans opened outside a request are ignored.
pub struct DbQueryCountingLayer;

impl<S: Subscriber> Layer<S> for DbQueryCountingLayer {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        if attrs.metadata().name() != "db.query" {
            return;
        }
        let _ = QUERY_COUNT.try_with(|count| count.fetch_add(1, Ordering::Relaxed));
    }
}

/// Run the request with a fresh query counter. When `expose` is set the
/// final count is returned in [`QUERY_COUNT_HEADER`].
pub async fn count_queries(
    State(expose): State<bool>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let count = Arc::new(AtomicU32::new(0));
    let mut response = QUERY_COUNT.scope(count.clone(), next.run(request)).await;

    let queries = count.load(Ordering::Relaxed);
    tracing::debug!(queries, "database queries for request");
    if expose {
        response
            .headers_mut()
            .insert(QUERY_COUNT_HEADER, HeaderValue::from(queries));
    }

    response
}
