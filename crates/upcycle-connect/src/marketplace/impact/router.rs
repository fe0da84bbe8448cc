use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::service::{ImpactService, ImpactServiceError};
use crate::marketplace::auth::{authenticate, TokenVerifier};
use crate::marketplace::materials::MaterialStore;
use crate::marketplace::requests::RequestStore;

pub struct ImpactRouterState<M, R> {
    pub service: Arc<ImpactService<M, R>>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl<M, R> Clone for ImpactRouterState<M, R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            verifier: self.verifier.clone(),
        }
    }
}

/// Router builder exposing the impact endpoints. Platform totals and
/// per-user lookups are public; the summary endpoint reports on whoever the
/// token identifies.
pub fn impact_router<M, R>(
    service: Arc<ImpactService<M, R>>,
    verifier: Arc<dyn TokenVerifier>,
) -> Router
where
    M: MaterialStore + 'static,
    R: RequestStore + 'static,
{
    let state = ImpactRouterState { service, verifier };

    Router::new()
        .route("/api/v1/impact/platform", get(platform_handler::<M, R>))
        .route("/api/v1/impact/summary", get(summary_handler::<M, R>))
        .route("/api/v1/impact/user/:user_id", get(user_handler::<M, R>))
        .with_state(state)
}

pub(crate) async fn platform_handler<M, R>(
    State(state): State<ImpactRouterState<M, R>>,
) -> Response
where
    M: MaterialStore + 'static,
    R: RequestStore + 'static,
{
    match state.service.platform_impact() {
        Ok(impact) => (StatusCode::OK, axum::Json(impact)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn summary_handler<M, R>(
    State(state): State<ImpactRouterState<M, R>>,
    headers: HeaderMap,
) -> Response
where
    M: MaterialStore + 'static,
    R: RequestStore + 'static,
{
    let identity = match authenticate(state.verifier.as_ref(), &headers) {
        Ok(identity) => identity,
        Err(err) => return err.into_response(),
    };

    match state.service.user_impact(&identity.user_id) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn user_handler<M, R>(
    State(state): State<ImpactRouterState<M, R>>,
    Path(user_id): Path<String>,
) -> Response
where
    M: MaterialStore + 'static,
    R: RequestStore + 'static,
{
    match state.service.user_impact(&user_id) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: ImpactServiceError) -> Response {
    let payload = json!({ "error": err.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
