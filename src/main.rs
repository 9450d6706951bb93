use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use mock_interview::config::{FlowConfig, ServerConfig};
use mock_interview::events::EventBus;
use mock_interview::flow::{FlowService, flow_routes};
use mock_interview::interview::{
    CannedResponder, InterviewDeps, LoggingReportSink, ReportSink, WebhookReportSink,
};
use mock_interview::session::SessionStore;
use mock_interview::store::{KeyValueStore, LibSqlStore, MemoryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let server = ServerConfig::from_env().context("invalid server configuration")?;
    let flow_config = FlowConfig::from_env().context("invalid flow configuration")?;

    let _log_guard = init_tracing(server.log_dir.as_deref());

    eprintln!("🎤 Mock Interview v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}/api/landing", server.port);
    eprintln!("   Events WS: ws://0.0.0.0:{}/ws", server.port);

    // ── Storage ─────────────────────────────────────────────────────────
    let backend: Arc<dyn KeyValueStore> = if server.is_ephemeral() {
        info!("Using in-memory session store");
        Arc::new(MemoryStore::new())
    } else {
        let store = LibSqlStore::new_local(&server.db_path)
            .await
            .with_context(|| format!("failed to open database at {}", server.db_path.display()))?;
        info!(path = %server.db_path.display(), "Database opened");
        Arc::new(store)
    };
    let session = SessionStore::new(backend, server.session_id.clone());

    // ── Report hand-off ─────────────────────────────────────────────────
    let reports: Arc<dyn ReportSink> = match server.webhook.clone() {
        Some(webhook) => {
            info!(url = %webhook.url, "Completion records go to webhook");
            Arc::new(WebhookReportSink::new(webhook))
        }
        None => {
            info!("No webhook configured, completion records are only logged");
            Arc::new(LoggingReportSink)
        }
    };

    let flow = Arc::new(FlowService::new(InterviewDeps {
        responder: Arc::new(CannedResponder::new()),
        reports,
        session,
        events: EventBus::new(),
        config: flow_config,
    }));

    let app = flow_routes(flow);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", server.port))
        .await
        .with_context(|| format!("failed to bind port {}", server.port))?;
    info!(port = server.port, session_id = %server.session_id, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shutting down");
    Ok(())
}

/// Stderr logging, plus a daily rolling file when `log_dir` is set.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr = fmt::layer().with_target(false).with_writer(std::io::stderr);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "mock-interview.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .init();
            None
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C");
}
