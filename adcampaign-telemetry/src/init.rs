//! Telemetry initialization and configuration

use std::sync::Once;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Output format of the console log layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

fn env_filter() -> Result<EnvFilter, Box<dyn std::error::Error>> {
    Ok(EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?)
}

/// Initialize console logging.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Calling this more
/// than once is a no-op.
///
/// # Example
/// ```
/// use adcampaign_telemetry::init_telemetry;
/// init_telemetry("adcampaign-server").expect("Failed to initialize telemetry");
/// ```
pub fn init_telemetry(service_name: &str) -> Result<(), Box<dyn std::error::Error>> {
    init_telemetry_with_format(service_name, LogFormat::Pretty)
}

pub fn init_telemetry_with_format(
    service_name: &str,
    format: LogFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    install(service_name, format, None)
}

/// Initialize logging plus OpenTelemetry span export over OTLP/gRPC.
///
/// # Example
/// ```no_run
/// use adcampaign_telemetry::{LogFormat, init_with_otlp};
/// # #[tokio::main]
/// # async fn main() {
/// init_with_otlp("adcampaign", "http://localhost:4317", LogFormat::Json)
///     .expect("Failed to initialize telemetry");
/// # }
/// ```
pub fn init_with_otlp(
    service_name: &str,
    endpoint: &str,
    format: LogFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    use opentelemetry_otlp::WithExportConfig;

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(opentelemetry_otlp::new_exporter().tonic().with_endpoint(endpoint))
        .with_trace_config(opentelemetry_sdk::trace::config().with_resource(
            opentelemetry_sdk::Resource::new(vec![opentelemetry::KeyValue::new(
                "service.name",
                service_name.to_string(),
            )]),
        ))
        .install_batch(opentelemetry_sdk::runtime::Tokio)?;

    install(service_name, format, Some((endpoint, tracer)))
}

fn install(
    service_name: &str,
    format: LogFormat,
    otlp: Option<(&str, opentelemetry_sdk::trace::Tracer)>,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = env_filter()?;
    let endpoint = otlp.as_ref().map(|(endpoint, _)| endpoint.to_string());
    let otel_layer = otlp.map(|(_, tracer)| tracing_opentelemetry::OpenTelemetryLayer::new(tracer));

    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(otel_layer).with(filter);
        let result = match format {
            LogFormat::Pretty => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_line_number(true),
                )
                .try_init(),
            LogFormat::Json => {
                registry.with(tracing_subscriber::fmt::layer().json().with_target(true)).try_init()
            }
        };

        if result.is_ok() {
            tracing::info!(
                service.name = service_name,
                ?format,
                otlp.endpoint = endpoint.as_deref().unwrap_or("disabled"),
                "Telemetry initialized"
            );
        }
    });

    Ok(())
}

/// Flush pending spans. Call before exit when OTLP export is enabled.
pub fn shutdown_telemetry() {
    opentelemetry::global::shutdown_tracer_provider();
}
