//! Token-verification seam and role gating.
//!
//! Token mechanics (issuance, signing, expiry) belong to an external
//! collaborator; the marketplace only consumes a verifier that turns a
//! bearer token into a caller identity.

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Marketplace roles carried by verified tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Provider,
    Seeker,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Provider => "provider",
            Role::Seeker => "seeker",
        }
    }
}

/// Verified caller identity attached to authenticated requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
}

/// Seam for the external token-verification collaborator.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no token provided; authorization header required")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("insufficient permissions; required role: {0}")]
    Forbidden(&'static str),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            AuthError::MissingToken | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Extract and verify the bearer token from `Authorization`.
pub fn authenticate(
    verifier: &dyn TokenVerifier,
    headers: &HeaderMap,
) -> Result<Identity, AuthError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = header
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MissingToken)?;

    verifier.verify(token)
}

/// Authenticate and require a specific role.
pub fn authenticate_role(
    verifier: &dyn TokenVerifier,
    headers: &HeaderMap,
    role: Role,
) -> Result<Identity, AuthError> {
    let identity = authenticate(verifier, headers)?;
    if identity.role != role {
        return Err(AuthError::Forbidden(role.label()));
    }
    Ok(identity)
}
