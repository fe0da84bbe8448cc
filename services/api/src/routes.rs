use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use upcycle_connect::marketplace::auth::TokenVerifier;
use upcycle_connect::marketplace::impact::{impact_router, ImpactService};
use upcycle_connect::marketplace::materials::{material_router, MaterialService, MaterialStore};
use upcycle_connect::marketplace::requests::{request_router, RequestService, RequestStore};

/// Compose the marketplace routers with the operational endpoints.
pub(crate) fn api_router<M, R>(
    materials: Arc<MaterialService<M>>,
    requests: Arc<RequestService<R, M>>,
    impact: Arc<ImpactService<M, R>>,
    verifier: Arc<dyn TokenVerifier>,
    default_radius_km: f64,
) -> axum::Router
where
    M: MaterialStore + 'static,
    R: RequestStore + 'static,
{
    material_router(materials, verifier.clone(), default_radius_km)
        .merge(request_router(requests, verifier.clone()))
        .merge(impact_router(impact, verifier))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{InMemoryMaterialStore, InMemoryRequestStore, TokenTableVerifier};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;
    use upcycle_connect::marketplace::geo::DEFAULT_RADIUS_KM;

    fn build_router() -> axum::Router {
        let material_store = Arc::new(InMemoryMaterialStore::default());
        let request_store = Arc::new(InMemoryRequestStore::default());
        let verifier: Arc<dyn TokenVerifier> = Arc::new(TokenTableVerifier::default());

        api_router(
            Arc::new(MaterialService::new(material_store.clone())),
            Arc::new(RequestService::new(
                request_store.clone(),
                material_store.clone(),
            )),
            Arc::new(ImpactService::new(material_store, request_store)),
            verifier,
            DEFAULT_RADIUS_KM,
        )
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body.get("status").and_then(Value::as_str), Some("ok"));
    }

    #[tokio::test]
    async fn nearby_requires_coordinates() {
        let router = build_router();
        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/materials/nearby?latitude=40.7")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn platform_impact_starts_empty() {
        let router = build_router();
        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/impact/platform")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), 1024).await.expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(
            payload.get("totalCarbonSaved").and_then(Value::as_f64),
            Some(0.0)
        );
        assert_eq!(payload.get("totalProjects").and_then(Value::as_u64), Some(0));
    }
}
