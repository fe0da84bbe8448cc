use serde::Deserialize;

use super::domain::{MaterialRequest, RequestId, RequestStatus};
use crate::marketplace::materials::MaterialId;
use crate::marketplace::StoreError;

/// Filters applied when listing requests.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    pub material_id: Option<MaterialId>,
}

impl RequestFilter {
    pub fn matches(&self, request: &MaterialRequest) -> bool {
        if let Some(status) = self.status {
            if request.status != status {
                return false;
            }
        }

        if let Some(material_id) = &self.material_id {
            if request.material_id.as_ref() != Some(material_id) {
                return false;
            }
        }

        true
    }
}

/// Storage abstraction mirroring [`crate::marketplace::materials::MaterialStore`].
pub trait RequestStore: Send + Sync {
    fn insert(&self, request: MaterialRequest) -> Result<MaterialRequest, StoreError>;
    fn update(&self, request: MaterialRequest) -> Result<(), StoreError>;
    fn fetch(&self, id: &RequestId) -> Result<Option<MaterialRequest>, StoreError>;
    fn delete(&self, id: &RequestId) -> Result<(), StoreError>;
    /// Requests matching `filter`, newest first.
    fn list(&self, filter: &RequestFilter) -> Result<Vec<MaterialRequest>, StoreError>;
    /// Everything a seeker has requested, newest first.
    fn by_seeker(&self, seeker_id: &str) -> Result<Vec<MaterialRequest>, StoreError>;
}
