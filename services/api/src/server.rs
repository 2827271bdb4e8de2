use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryWorkforceStore};
use crate::routes::with_requisition_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use internal_mobility::config::AppConfig;
use internal_mobility::error::AppError;
use internal_mobility::telemetry;
use internal_mobility::workflows::requisition::{
    PostgresStore, RequisitionRepository, RequisitionScanService, SkillCatalog,
    WorkforceDirectory,
};
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

    match &config.database {
        Some(database) => {
            let store = Arc::new(PostgresStore::connect(database).await?);
            store.migrate().await?;
            info!(
                max_connections = database.max_connections,
                "requisition store backed by postgres"
            );
            let service = RequisitionScanService::new(store.clone(), store.clone(), store);
            serve(&config, service).await
        }
        None => {
            warn!("DATABASE_URL not set; serving a seeded in-memory workforce");
            let store = Arc::new(InMemoryWorkforceStore::seeded());
            let service = RequisitionScanService::new(store.clone(), store.clone(), store);
            serve(&config, service).await
        }
    }
}

async fn serve<R, C, W>(
    config: &AppConfig,
    service: RequisitionScanService<R, C, W>,
) -> Result<(), AppError>
where
    R: RequisitionRepository + 'static,
    C: SkillCatalog + 'static,
    W: WorkforceDirectory + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_requisition_routes(Arc::new(service))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "requisition scan orchestrator ready");

    axum::serve(listener, app).await?;
    Ok(())
}
