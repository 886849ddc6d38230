//! Server entry-point: loads settings, wires the store backend and serves
//! the JSON API until interrupted.

mod server;

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetricsBuilder;
use mockable::{DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use todo_backend::domain::ports::TodoMetrics;
#[cfg(not(feature = "metrics"))]
use todo_backend::domain::ports::NoOpTodoMetrics;
use todo_backend::domain::{ApiKey, BuildInfo, STATS_SAMPLE_PERIOD, StoreStatsMonitor};
use todo_backend::inbound::http::health::HealthState;
use todo_backend::inbound::http::session_config::{BuildMode, session_cookie_settings};
use todo_backend::middleware::Cors;
#[cfg(feature = "metrics")]
use todo_backend::outbound::metrics::PrometheusTodoMetrics;
use todo_backend::settings::Settings;

use server::{Backend, ServerConfig, build_http_state, create_server};

const SESSION_SWEEP_PERIOD: Duration = Duration::from_secs(30 * 60);

fn init_tracing(settings: &Settings) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(settings.log_level()));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }
}

fn admin_key(settings: &Settings) -> ApiKey {
    match settings.api_key() {
        Some(key) => ApiKey::from(key.to_owned()),
        None => {
            let key = ApiKey::generate();
            warn!(
                api_key = key.expose(),
                "no admin API key configured; generated one for this run"
            );
            key
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let settings = Settings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    init_tracing(&settings);

    let build = BuildInfo::current();
    info!(
        version = build.version,
        commit = build.commit,
        date = build.date,
        "starting todo server"
    );

    let cookies = session_cookie_settings(
        &DefaultEnv::new(),
        BuildMode::from_debug_assertions(),
        settings.tls,
    )
    .map_err(|e| std::io::Error::other(format!("invalid session configuration: {e}")))?;
    info!(
        fingerprint = %cookies.key_fingerprint(),
        cookie_secure = cookies.cookie_secure,
        "session key loaded"
    );

    let bind_addr = settings
        .http_addr()
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    #[cfg(feature = "metrics")]
    let prometheus = PrometheusMetricsBuilder::new("todo")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::other(format!("configure Prometheus metrics: {e}")))?;
    #[cfg(feature = "metrics")]
    let metrics: Arc<dyn TodoMetrics> = Arc::new(
        PrometheusTodoMetrics::new(&prometheus.registry)
            .map_err(|e| std::io::Error::other(format!("metrics registration failed: {e}")))?,
    );
    #[cfg(not(feature = "metrics"))]
    let metrics: Arc<dyn TodoMetrics> = Arc::new(NoOpTodoMetrics);

    let backend = Backend::from_settings(&settings).await?;
    let sessions = backend.session_service(Arc::new(DefaultClock));
    let http_state = build_http_state(
        &backend,
        sessions.clone(),
        admin_key(&settings),
        settings.request_timeout(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(sessions.run_sweeper(SESSION_SWEEP_PERIOD, shutdown_rx.clone()));
    tokio::spawn(
        StoreStatsMonitor::new(backend.stats.clone(), metrics.clone())
            .run(STATS_SAMPLE_PERIOD, shutdown_rx),
    );

    let config = ServerConfig::new(
        cookies.key,
        cookies.cookie_secure,
        cookies.same_site,
        bind_addr,
        Cors::new(settings.domain(), settings.cors_allowed_origins()),
        #[cfg(feature = "metrics")]
        prometheus,
    );

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), http_state, metrics, config)?;
    info!(%bind_addr, domain = settings.domain(), "listening");

    let handle = server.handle();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for shutdown signal");
            return;
        }
        info!("shutdown requested");
        health_state.mark_unhealthy();
        if shutdown_tx.send(true).is_err() {
            debug!("background tasks already stopped");
        }
        handle.stop(true).await;
    });

    server.await
}
