use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryMaterialStore, InMemoryRequestStore, TokenTableVerifier};
use crate::routes::api_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use upcycle_connect::config::AppConfig;
use upcycle_connect::error::AppError;
use upcycle_connect::marketplace::auth::TokenVerifier;
use upcycle_connect::marketplace::impact::ImpactService;
use upcycle_connect::marketplace::materials::MaterialService;
use upcycle_connect::marketplace::requests::RequestService;
use upcycle_connect::telemetry;

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

    let material_store = Arc::new(InMemoryMaterialStore::default());
    let request_store = Arc::new(InMemoryRequestStore::default());
    let verifier: Arc<dyn TokenVerifier> = Arc::new(TokenTableVerifier::default());
    info!("using in-memory stores; listings and requests reset on restart");

    let materials = Arc::new(MaterialService::new(material_store.clone()));
    let requests = Arc::new(RequestService::new(
        request_store.clone(),
        material_store.clone(),
    ));
    let impact = Arc::new(ImpactService::new(material_store, request_store));

    let app = api_router(
        materials,
        requests,
        impact,
        verifier,
        config.marketplace.default_radius_km,
    )
    .layer(Extension(app_state))
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "marketplace API ready");

    axum::serve(listener, app).await?;
    Ok(())
}
