use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use super::domain::{MaterialRequest, RequestDraft, RequestId, RequestPatch, RequestStatus};
use super::repository::{RequestFilter, RequestStore};
use crate::marketplace::auth::{Identity, Role};
use crate::marketplace::materials::{MaterialId, MaterialStore};
use crate::marketplace::StoreError;

/// Service owning request intake, ownership checks, and status transitions.
/// Holds the material store as well so provider-facing views can join
/// requests against the provider's listings.
pub struct RequestService<S, M> {
    store: Arc<S>,
    materials: Arc<M>,
}

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> RequestId {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    RequestId(format!("req-{id:06}"))
}

impl<S, M> RequestService<S, M>
where
    S: RequestStore + 'static,
    M: MaterialStore + 'static,
{
    pub fn new(store: Arc<S>, materials: Arc<M>) -> Self {
        Self { store, materials }
    }

    /// Validate a draft and store it as a pending request owned by
    /// `seeker_id`.
    pub fn create(
        &self,
        draft: RequestDraft,
        seeker_id: &str,
    ) -> Result<MaterialRequest, RequestServiceError> {
        let title = required_text(draft.title, "title")?;
        let description = required_text(draft.description, "description")?;
        let now = Utc::now();

        let request = MaterialRequest {
            id: next_request_id(),
            title,
            description,
            material_id: draft.material_id,
            quantity: draft.quantity.filter(|quantity| *quantity > 0),
            seeker_id: seeker_id.to_string(),
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        Ok(self.store.insert(request)?)
    }

    /// Apply a partial update. Seekers may only touch their own requests;
    /// providers may move any request's status (accepting or completing an
    /// exchange for one of their materials).
    pub fn update(
        &self,
        id: &RequestId,
        patch: RequestPatch,
        identity: &Identity,
    ) -> Result<MaterialRequest, RequestServiceError> {
        let mut request = self
            .store
            .fetch(id)?
            .ok_or(RequestServiceError::NotFound)?;

        if identity.role == Role::Seeker && request.seeker_id != identity.user_id {
            return Err(RequestServiceError::Forbidden);
        }

        if let Some(title) = patch.title {
            request.title = title;
        }
        if let Some(description) = patch.description {
            request.description = description;
        }
        if let Some(material_id) = patch.material_id {
            request.material_id = Some(material_id);
        }
        if let Some(quantity) = patch.quantity {
            request.quantity = Some(quantity).filter(|quantity| *quantity > 0);
        }
        if let Some(status) = patch.status {
            request.status = status;
        }
        request.updated_at = Utc::now();

        self.store.update(request.clone())?;
        Ok(request)
    }

    /// Remove a request on behalf of the owning seeker.
    pub fn delete(&self, id: &RequestId, seeker_id: &str) -> Result<(), RequestServiceError> {
        let request = self
            .store
            .fetch(id)?
            .ok_or(RequestServiceError::NotFound)?;

        if request.seeker_id != seeker_id {
            return Err(RequestServiceError::Forbidden);
        }

        self.store.delete(id)?;
        Ok(())
    }

    pub fn get(&self, id: &RequestId) -> Result<MaterialRequest, RequestServiceError> {
        self.store.fetch(id)?.ok_or(RequestServiceError::NotFound)
    }

    pub fn list(
        &self,
        filter: &RequestFilter,
    ) -> Result<Vec<MaterialRequest>, RequestServiceError> {
        Ok(self.store.list(filter)?)
    }

    pub fn by_seeker(&self, seeker_id: &str) -> Result<Vec<MaterialRequest>, RequestServiceError> {
        Ok(self.store.by_seeker(seeker_id)?)
    }

    /// Requests aimed at the provider's listings, joined through
    /// `material_id`. Requests not linked to a material never show up here.
    pub fn for_provider(
        &self,
        provider_id: &str,
    ) -> Result<Vec<MaterialRequest>, RequestServiceError> {
        let owned: HashSet<MaterialId> = self
            .materials
            .by_provider(provider_id)?
            .into_iter()
            .map(|material| material.id)
            .collect();

        let incoming = self
            .store
            .list(&RequestFilter::default())?
            .into_iter()
            .filter(|request| {
                request
                    .material_id
                    .as_ref()
                    .is_some_and(|id| owned.contains(id))
            })
            .collect();
        Ok(incoming)
    }

    /// The caller's view of their requests: seekers see what they filed,
    /// providers see what targets their listings.
    pub fn for_identity(
        &self,
        identity: &Identity,
    ) -> Result<Vec<MaterialRequest>, RequestServiceError> {
        match identity.role {
            Role::Seeker => self.by_seeker(&identity.user_id),
            Role::Provider => self.for_provider(&identity.user_id),
        }
    }
}

fn required_text(value: Option<String>, field: &str) -> Result<String, RequestServiceError> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| RequestServiceError::Validation(format!("{field} is required")))
}

/// Error raised by the request service.
#[derive(Debug, thiserror::Error)]
pub enum RequestServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("request not found")]
    NotFound,
    #[error("not authorized to modify this request")]
    Forbidden,
    #[error(transparent)]
    Store(#[from] StoreError),
}
