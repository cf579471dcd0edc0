//! Tracing setup and request-scoped correlation ids.
//!
//! `init_tracing` wires the global subscriber once per process; repeated
//! calls (as in test binaries) are no-ops. The trace id assigned per request
//! travels through task-local storage so error responses can embed it
//! without threading it through every call.

use std::sync::Once;

use tokio::task_local;
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::AppConfig;

/// Trace context containing the request correlation ID.
#[derive(Debug, Clone)]
pub struct TraceContext {
    pub trace_id: String,
}

task_local! {
    static ACTIVE_TRACE_CONTEXT: TraceContext;
}

static INIT: Once = Once::new();

/// Output format for the fmt layer. Anything other than "pretty" in the
/// config falls back to JSON, the production default.
enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    fn from_config(value: &str) -> Self {
        match value {
            "pretty" => Self::Pretty,
            _ => Self::Json,
        }
    }
}

/// Initialize global tracing exactly once, bridging `log::` macros (sea-orm,
/// sqlx) into the tracing pipeline.
pub fn init_tracing(config: &AppConfig) {
    INIT.call_once(|| {
        // An error means another bridge or logger is already installed,
        // which is fine for test binaries.
        let _ = LogTracer::builder()
            .with_max_level(log::LevelFilter::Trace)
            .init();

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

        let fmt_layer = match LogFormat::from_config(&config.log_format) {
            LogFormat::Pretty => fmt::layer().pretty().boxed(),
            LogFormat::Json => fmt::layer().json().boxed(),
        };

        if let Err(err) = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
        {
            eprintln!(
                "Warning: tracing subscriber already set, keeping the existing one: {}",
                err
            );
        }
    });
}

/// Execute `future` with the given trace context active for the running task.
pub async fn with_trace_context<Fut, R>(context: TraceContext, future: Fut) -> R
where
    Fut: std::future::Future<Output = R>,
{
    ACTIVE_TRACE_CONTEXT.scope(context, future).await
}

/// Get the currently active trace ID, if one has been set for the running task.
pub fn current_trace_id() -> Option<String> {
    ACTIVE_TRACE_CONTEXT
        .try_with(|ctx| ctx.trace_id.clone())
        .ok()
}
