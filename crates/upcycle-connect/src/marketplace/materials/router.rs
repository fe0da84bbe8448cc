use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{Material, MaterialDraft, MaterialId, MaterialPatch};
use super::repository::{MaterialQuery, MaterialStore};
use super::service::{MaterialService, MaterialServiceError};
use crate::marketplace::auth::{authenticate_role, Role, TokenVerifier};
use crate::marketplace::geo::{GeoPoint, Positioned};
use crate::marketplace::StoreError;

/// Router state: the service, the token seam, and the radius applied when a
/// nearby search omits one.
pub struct MaterialRouterState<S> {
    pub service: Arc<MaterialService<S>>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub default_radius_km: f64,
}

impl<S> Clone for MaterialRouterState<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            verifier: self.verifier.clone(),
            default_radius_km: self.default_radius_km,
        }
    }
}

/// Router builder exposing the material endpoints. Browsing is public;
/// mutations require a provider token.
pub fn material_router<S>(
    service: Arc<MaterialService<S>>,
    verifier: Arc<dyn TokenVerifier>,
    default_radius_km: f64,
) -> Router
where
    S: MaterialStore + 'static,
{
    let state = MaterialRouterState {
        service,
        verifier,
        default_radius_km,
    };

    Router::new()
        .route("/api/v1/materials", get(list_handler::<S>))
        .route("/api/v1/materials", post(create_handler::<S>))
        .route("/api/v1/materials/nearby", get(nearby_handler::<S>))
        .route(
            "/api/v1/materials/provider/:provider_id",
            get(by_provider_handler::<S>),
        )
        .route("/api/v1/materials/:id", get(get_handler::<S>))
        .route("/api/v1/materials/:id", put(update_handler::<S>))
        .route("/api/v1/materials/:id", delete(delete_handler::<S>))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct NearbyParams {
    pub(crate) latitude: f64,
    pub(crate) longitude: f64,
    pub(crate) radius: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MaterialListResponse {
    pub(crate) materials: Vec<Material>,
    pub(crate) count: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct NearbyResponse {
    pub(crate) materials: Vec<Positioned<Material>>,
    pub(crate) count: usize,
}

pub(crate) async fn list_handler<S>(
    State(state): State<MaterialRouterState<S>>,
    Query(query): Query<MaterialQuery>,
) -> Response
where
    S: MaterialStore + 'static,
{
    match state.service.list(&query) {
        Ok(materials) => {
            let count = materials.len();
            (
                StatusCode::OK,
                axum::Json(MaterialListResponse { materials, count }),
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn nearby_handler<S>(
    State(state): State<MaterialRouterState<S>>,
    Query(params): Query<NearbyParams>,
) -> Response
where
    S: MaterialStore + 'static,
{
    let origin = GeoPoint::new(params.latitude, params.longitude);
    let radius_km = params.radius.unwrap_or(state.default_radius_km);

    match state.service.nearby(origin, radius_km) {
        Ok(materials) => {
            let count = materials.len();
            (
                StatusCode::OK,
                axum::Json(NearbyResponse { materials, count }),
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn by_provider_handler<S>(
    State(state): State<MaterialRouterState<S>>,
    Path(provider_id): Path<String>,
) -> Response
where
    S: MaterialStore + 'static,
{
    match state.service.by_provider(&provider_id) {
        Ok(materials) => {
            let count = materials.len();
            (
                StatusCode::OK,
                axum::Json(MaterialListResponse { materials, count }),
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<S>(
    State(state): State<MaterialRouterState<S>>,
    Path(id): Path<String>,
) -> Response
where
    S: MaterialStore + 'static,
{
    match state.service.get(&MaterialId(id)) {
        Ok(material) => (StatusCode::OK, axum::Json(material)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_handler<S>(
    State(state): State<MaterialRouterState<S>>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<MaterialDraft>,
) -> Response
where
    S: MaterialStore + 'static,
{
    let identity = match authenticate_role(state.verifier.as_ref(), &headers, Role::Provider) {
        Ok(identity) => identity,
        Err(err) => return err.into_response(),
    };

    match state.service.create(draft, &identity.user_id) {
        Ok(material) => (StatusCode::CREATED, axum::Json(material)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler<S>(
    State(state): State<MaterialRouterState<S>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    axum::Json(patch): axum::Json<MaterialPatch>,
) -> Response
where
    S: MaterialStore + 'static,
{
    let identity = match authenticate_role(state.verifier.as_ref(), &headers, Role::Provider) {
        Ok(identity) => identity,
        Err(err) => return err.into_response(),
    };

    match state
        .service
        .update(&MaterialId(id), patch, &identity.user_id)
    {
        Ok(material) => (StatusCode::OK, axum::Json(material)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler<S>(
    State(state): State<MaterialRouterState<S>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: MaterialStore + 'static,
{
    let identity = match authenticate_role(state.verifier.as_ref(), &headers, Role::Provider) {
        Ok(identity) => identity,
        Err(err) => return err.into_response(),
    };

    match state.service.delete(&MaterialId(id), &identity.user_id) {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "message": "material deleted" })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: MaterialServiceError) -> Response {
    let status = match &err {
        MaterialServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        MaterialServiceError::NotFound => StatusCode::NOT_FOUND,
        MaterialServiceError::Forbidden => StatusCode::FORBIDDEN,
        MaterialServiceError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        MaterialServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
