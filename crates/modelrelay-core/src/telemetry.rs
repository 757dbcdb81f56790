//! Telemetry — tracing initialization for ModelRelay embedders.
//!
//! Orchestration calls are instrumented with spans (request id, provider,
//! candidate count) and per-attempt events. Host applications that already
//! install their own subscriber can skip this entirely.

use opentelemetry::trace::TracerProvider;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::TelemetryConfig;

/// Install the ModelRelay tracing pipeline.
///
/// Log filtering comes from `RUST_LOG` when set, otherwise defaults to
/// info with debug-level detail for the relay crates. With
/// `otlp_enabled`, spans are additionally exported over OTLP.
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,modelrelay_core=debug,modelrelay_providers=debug"));

    if config.otlp_enabled {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&config.otlp_endpoint)
            .build()?;

        let resource = opentelemetry_sdk::Resource::new(vec![
            KeyValue::new("service.name", "modelrelay"),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ]);

        let provider = opentelemetry_sdk::trace::TracerProvider::builder()
            .with_simple_exporter(exporter)
            .with_resource(resource)
            .build();

        let tracer = provider.tracer("modelrelay");

        if config.json_logs {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_target(true))
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_target(true))
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .init();
        }
    } else if config.json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .init();
    }

    Ok(())
}
