use serde::Deserialize;

use super::domain::{Material, MaterialId, MaterialStatus};
use crate::marketplace::StoreError;

/// Filters applied when browsing available listings. All text matching is
/// case-insensitive; `location` and `search` match substrings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialQuery {
    pub category: Option<String>,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl MaterialQuery {
    /// Whether a material satisfies every supplied filter. Only available
    /// listings are browsable.
    pub fn matches(&self, material: &Material) -> bool {
        if material.status != MaterialStatus::Available {
            return false;
        }

        if let Some(category) = &self.category {
            if !material.category.label().eq_ignore_ascii_case(category) {
                return false;
            }
        }

        if let Some(condition) = &self.condition {
            if !material.condition.eq_ignore_ascii_case(condition) {
                return false;
            }
        }

        if let Some(location) = &self.location {
            let needle = location.to_lowercase();
            let haystack = material
                .location
                .as_deref()
                .unwrap_or_default()
                .to_lowercase();
            if !haystack.contains(&needle) {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !material.name.to_lowercase().contains(&needle)
                && !material.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }

        true
    }
}

/// Storage abstraction so the marketplace can run against a database-backed
/// or in-memory variant chosen once at startup.
pub trait MaterialStore: Send + Sync {
    fn insert(&self, material: Material) -> Result<Material, StoreError>;
    fn update(&self, material: Material) -> Result<(), StoreError>;
    fn fetch(&self, id: &MaterialId) -> Result<Option<Material>, StoreError>;
    fn delete(&self, id: &MaterialId) -> Result<(), StoreError>;
    /// Available listings matching `query`, newest first.
    fn list(&self, query: &MaterialQuery) -> Result<Vec<Material>, StoreError>;
    /// Everything a provider has listed, regardless of status, newest first.
    fn by_provider(&self, provider_id: &str) -> Result<Vec<Material>, StoreError>;
    /// Available listings that carry coordinates, for proximity search.
    fn located_available(&self) -> Result<Vec<Material>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::materials::domain::MaterialCategory;
    use chrono::Utc;

    fn material() -> Material {
        Material {
            id: MaterialId("mat-000001".to_string()),
            name: "Denim offcuts".to_string(),
            description: "Assorted indigo denim panels".to_string(),
            category: MaterialCategory::Fabric,
            quantity: 4,
            condition: "good".to_string(),
            location: Some("Brooklyn, NY".to_string()),
            latitude: None,
            longitude: None,
            provider_id: "user-1".to_string(),
            status: MaterialStatus::Available,
            carbon_saved: 100.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn empty_query_matches_available_material() {
        assert!(MaterialQuery::default().matches(&material()));
    }

    #[test]
    fn non_available_material_never_matches() {
        let mut claimed = material();
        claimed.status = MaterialStatus::Claimed;
        assert!(!MaterialQuery::default().matches(&claimed));
    }

    #[test]
    fn category_and_condition_match_case_insensitively() {
        let query = MaterialQuery {
            category: Some("FABRIC".to_string()),
            condition: Some("Good".to_string()),
            ..MaterialQuery::default()
        };
        assert!(query.matches(&material()));

        let query = MaterialQuery {
            category: Some("leather".to_string()),
            ..MaterialQuery::default()
        };
        assert!(!query.matches(&material()));
    }

    #[test]
    fn search_matches_name_or_description_substring() {
        let query = MaterialQuery {
            search: Some("indigo".to_string()),
            ..MaterialQuery::default()
        };
        assert!(query.matches(&material()));

        let query = MaterialQuery {
            search: Some("velvet".to_string()),
            ..MaterialQuery::default()
        };
        assert!(!query.matches(&material()));
    }

    #[test]
    fn location_filter_requires_a_stored_location() {
        let query = MaterialQuery {
            location: Some("brooklyn".to_string()),
            ..MaterialQuery::default()
        };
        assert!(query.matches(&material()));

        let mut unlocated = material();
        unlocated.location = None;
        assert!(!query.matches(&unlocated));
    }
}
