use crate::cli::ServeArgs;
use crate::infra::{
    default_scoring_config, seeded_catalog, AppState, InMemoryCandidateStore,
    InMemoryNotificationPublisher,
};
use crate::routes::with_candidate_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use guidance::candidates::{CandidateService, CandidateStore, NotificationPublisher};
use guidance::config::{AppConfig, StatsConfig};
use guidance::content::ContentCatalog;
use guidance::error::AppError;
use guidance::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryCandidateStore::default());
    let catalog = Arc::new(seeded_catalog());
    let notifier = Arc::new(InMemoryNotificationPublisher::default());
    let candidate_service = Arc::new(CandidateService::new(
        store,
        catalog.clone(),
        notifier,
        default_scoring_config(),
    ));

    let browse_catalog: Arc<dyn ContentCatalog> = catalog;
    let app = with_candidate_routes(candidate_service.clone())
        .layer(Extension(app_state))
        .layer(Extension(browse_catalog))
        .layer(prometheus_layer);

    spawn_stats_sweep(candidate_service, config.stats.clone());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "career guidance service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Periodically recomputes cached statistics for candidates flagged stale.
fn spawn_stats_sweep<S, C, N>(service: Arc<CandidateService<S, C, N>>, stats: StatsConfig)
where
    S: CandidateStore + 'static,
    C: ContentCatalog + 'static,
    N: NotificationPublisher + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(stats.refresh_interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match service.refresh_pending(stats.refresh_batch, chrono::Utc::now()) {
                Ok(0) => {}
                Ok(count) => info!(count, "refreshed stale candidate statistics"),
                Err(error) => warn!(%error, "stats sweep failed"),
            }
        }
    });
}
