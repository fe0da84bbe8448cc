use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use super::domain::{
    Material, MaterialCategory, MaterialDraft, MaterialId, MaterialPatch, MaterialStatus,
};
use super::repository::{MaterialQuery, MaterialStore};
use crate::marketplace::geo::{self, GeoPoint, Positioned};
use crate::marketplace::impact::estimate_carbon_saved;
use crate::marketplace::StoreError;

/// Service owning material intake, ownership checks, and proximity search.
pub struct MaterialService<S> {
    store: Arc<S>,
}

static MATERIAL_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_material_id() -> MaterialId {
    let id = MATERIAL_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    MaterialId(format!("mat-{id:06}"))
}

impl<S> MaterialService<S>
where
    S: MaterialStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Validate a draft, derive its carbon estimate, and store it as an
    /// available listing owned by `provider_id`.
    pub fn create(
        &self,
        draft: MaterialDraft,
        provider_id: &str,
    ) -> Result<Material, MaterialServiceError> {
        let name = required_text(draft.name, "name")?;
        let description = required_text(draft.description, "description")?;
        let category_raw = required_text(draft.category, "category")?;
        let condition = required_text(draft.condition, "condition")?.to_lowercase();
        let quantity = draft
            .quantity
            .filter(|quantity| *quantity > 0)
            .ok_or_else(|| {
                MaterialServiceError::Validation("quantity must be a positive integer".to_string())
            })?;

        let category = MaterialCategory::parse(&category_raw);
        let carbon_saved = estimate_carbon_saved(category.label(), f64::from(quantity));
        let now = Utc::now();

        let material = Material {
            id: next_material_id(),
            name,
            description,
            category,
            quantity,
            condition,
            location: draft.location.filter(|location| !location.is_empty()),
            latitude: draft.latitude,
            longitude: draft.longitude,
            provider_id: provider_id.to_string(),
            status: MaterialStatus::Available,
            carbon_saved,
            created_at: now,
            updated_at: now,
        };

        Ok(self.store.insert(material)?)
    }

    /// Apply a partial update on behalf of the owning provider, recomputing
    /// the carbon estimate when category or quantity change.
    pub fn update(
        &self,
        id: &MaterialId,
        patch: MaterialPatch,
        provider_id: &str,
    ) -> Result<Material, MaterialServiceError> {
        let mut material = self
            .store
            .fetch(id)?
            .ok_or(MaterialServiceError::NotFound)?;

        if material.provider_id != provider_id {
            return Err(MaterialServiceError::Forbidden);
        }

        let recompute_carbon = patch.category.is_some() || patch.quantity.is_some();

        if let Some(name) = patch.name {
            material.name = name;
        }
        if let Some(description) = patch.description {
            material.description = description;
        }
        if let Some(category) = patch.category {
            material.category = MaterialCategory::parse(&category);
        }
        if let Some(quantity) = patch.quantity {
            if quantity == 0 {
                return Err(MaterialServiceError::Validation(
                    "quantity must be a positive integer".to_string(),
                ));
            }
            material.quantity = quantity;
        }
        if let Some(condition) = patch.condition {
            material.condition = condition.to_lowercase();
        }
        if let Some(location) = patch.location {
            material.location = Some(location).filter(|location| !location.is_empty());
        }
        if let Some(latitude) = patch.latitude {
            material.latitude = Some(latitude);
        }
        if let Some(longitude) = patch.longitude {
            material.longitude = Some(longitude);
        }
        if let Some(status) = patch.status {
            material.status = status;
        }

        if recompute_carbon {
            material.carbon_saved = estimate_carbon_saved(
                material.category.label(),
                f64::from(material.quantity),
            );
        }
        material.updated_at = Utc::now();

        self.store.update(material.clone())?;
        Ok(material)
    }

    /// Remove a listing on behalf of the owning provider.
    pub fn delete(&self, id: &MaterialId, provider_id: &str) -> Result<(), MaterialServiceError> {
        let material = self
            .store
            .fetch(id)?
            .ok_or(MaterialServiceError::NotFound)?;

        if material.provider_id != provider_id {
            return Err(MaterialServiceError::Forbidden);
        }

        self.store.delete(id)?;
        Ok(())
    }

    pub fn get(&self, id: &MaterialId) -> Result<Material, MaterialServiceError> {
        self.store.fetch(id)?.ok_or(MaterialServiceError::NotFound)
    }

    pub fn list(&self, query: &MaterialQuery) -> Result<Vec<Material>, MaterialServiceError> {
        Ok(self.store.list(query)?)
    }

    pub fn by_provider(&self, provider_id: &str) -> Result<Vec<Material>, MaterialServiceError> {
        Ok(self.store.by_provider(provider_id)?)
    }

    /// Available, located materials within `radius_km` of `origin`, ordered
    /// by increasing distance.
    pub fn nearby(
        &self,
        origin: GeoPoint,
        radius_km: f64,
    ) -> Result<Vec<Positioned<Material>>, MaterialServiceError> {
        let candidates = self.store.located_available()?;
        Ok(geo::filter_by_distance(
            candidates,
            origin,
            radius_km,
            Material::position,
        ))
    }
}

fn required_text(value: Option<String>, field: &str) -> Result<String, MaterialServiceError> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| MaterialServiceError::Validation(format!("{field} is required")))
}

/// Error raised by the material service.
#[derive(Debug, thiserror::Error)]
pub enum MaterialServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("material not found")]
    NotFound,
    #[error("not authorized to modify this material")]
    Forbidden,
    #[error(transparent)]
    Store(#[from] StoreError),
}
