use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::Serialize;
use serde_json::json;

use super::domain::{MaterialRequest, RequestDraft, RequestId, RequestPatch};
use super::repository::{RequestFilter, RequestStore};
use super::service::{RequestService, RequestServiceError};
use crate::marketplace::auth::{authenticate, authenticate_role, Role, TokenVerifier};
use crate::marketplace::materials::MaterialStore;
use crate::marketplace::StoreError;

pub struct RequestRouterState<S, M> {
    pub service: Arc<RequestService<S, M>>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl<S, M> Clone for RequestRouterState<S, M> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            verifier: self.verifier.clone(),
        }
    }
}

/// Router builder exposing the request endpoints. Browsing is public;
/// creation and deletion require a seeker token, updates any authenticated
/// caller (the service enforces ownership). `/requests/user` serves the
/// caller's own feed, dispatched on the token's role.
pub fn request_router<S, M>(
    service: Arc<RequestService<S, M>>,
    verifier: Arc<dyn TokenVerifier>,
) -> Router
where
    S: RequestStore + 'static,
    M: MaterialStore + 'static,
{
    let state = RequestRouterState { service, verifier };

    Router::new()
        .route("/api/v1/requests", get(list_handler::<S, M>))
        .route("/api/v1/requests", post(create_handler::<S, M>))
        .route("/api/v1/requests/user", get(user_feed_handler::<S, M>))
        .route(
            "/api/v1/requests/seeker/:seeker_id",
            get(by_seeker_handler::<S, M>),
        )
        .route(
            "/api/v1/requests/provider/:provider_id",
            get(by_provider_handler::<S, M>),
        )
        .route("/api/v1/requests/:id", get(get_handler::<S, M>))
        .route("/api/v1/requests/:id", put(update_handler::<S, M>))
        .route("/api/v1/requests/:id", delete(delete_handler::<S, M>))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestListResponse {
    pub(crate) requests: Vec<MaterialRequest>,
    pub(crate) count: usize,
}

pub(crate) async fn list_handler<S, M>(
    State(state): State<RequestRouterState<S, M>>,
    Query(filter): Query<RequestFilter>,
) -> Response
where
    S: RequestStore + 'static,
    M: MaterialStore + 'static,
{
    match state.service.list(&filter) {
        Ok(requests) => {
            let count = requests.len();
            (
                StatusCode::OK,
                axum::Json(RequestListResponse { requests, count }),
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn by_seeker_handler<S, M>(
    State(state): State<RequestRouterState<S, M>>,
    Path(seeker_id): Path<String>,
) -> Response
where
    S: RequestStore + 'static,
    M: MaterialStore + 'static,
{
    match state.service.by_seeker(&seeker_id) {
        Ok(requests) => {
            let count = requests.len();
            (
                StatusCode::OK,
                axum::Json(RequestListResponse { requests, count }),
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<S, M>(
    State(state): State<RequestRouterState<S, M>>,
    Path(id): Path<String>,
) -> Response
where
    S: RequestStore + 'static,
    M: MaterialStore + 'static,
{
    match state.service.get(&RequestId(id)) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn create_handler<S, M>(
    State(state): State<RequestRouterState<S, M>>,
    headers: HeaderMap,
    axum::Json(draft): axum::Json<RequestDraft>,
) -> Response
where
    S: RequestStore + 'static,
    M: MaterialStore + 'static,
{
    let identity = match authenticate_role(state.verifier.as_ref(), &headers, Role::Seeker) {
        Ok(identity) => identity,
        Err(err) => return err.into_response(),
    };

    match state.service.create(draft, &identity.user_id) {
        Ok(request) => (StatusCode::CREATED, axum::Json(request)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler<S, M>(
    State(state): State<RequestRouterState<S, M>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    axum::Json(patch): axum::Json<RequestPatch>,
) -> Response
where
    S: RequestStore + 'static,
    M: MaterialStore + 'static,
{
    let identity = match authenticate(state.verifier.as_ref(), &headers) {
        Ok(identity) => identity,
        Err(err) => return err.into_response(),
    };

    match state.service.update(&RequestId(id), patch, &identity) {
        Ok(request) => (StatusCode::OK, axum::Json(request)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler<S, M>(
    State(state): State<RequestRouterState<S, M>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: RequestStore + 'static,
    M: MaterialStore + 'static,
{
    let identity = match authenticate_role(state.verifier.as_ref(), &headers, Role::Seeker) {
        Ok(identity) => identity,
        Err(err) => return err.into_response(),
    };

    match state.service.delete(&RequestId(id), &identity.user_id) {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "message": "request deleted" })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn by_provider_handler<S, M>(
    State(state): State<RequestRouterState<S, M>>,
    Path(provider_id): Path<String>,
) -> Response
where
    S: RequestStore + 'static,
    M: MaterialStore + 'static,
{
    match state.service.for_provider(&provider_id) {
        Ok(requests) => {
            let count = requests.len();
            (
                StatusCode::OK,
                axum::Json(RequestListResponse { requests, count }),
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn user_feed_handler<S, M>(
    State(state): State<RequestRouterState<S, M>>,
    headers: HeaderMap,
) -> Response
where
    S: RequestStore + 'static,
    M: MaterialStore + 'static,
{
    let identity = match authenticate(state.verifier.as_ref(), &headers) {
        Ok(identity) => identity,
        Err(err) => return err.into_response(),
    };

    match state.service.for_identity(&identity) {
        Ok(requests) => {
            let count = requests.len();
            (
                StatusCode::OK,
                axum::Json(RequestListResponse { requests, count }),
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

fn error_response(err: RequestServiceError) -> Response {
    let status = match &err {
        RequestServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        RequestServiceError::NotFound => StatusCode::NOT_FOUND,
        RequestServiceError::Forbidden => StatusCode::FORBIDDEN,
        RequestServiceError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        RequestServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
