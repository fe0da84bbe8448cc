use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use upcycle_connect::marketplace::auth::{AuthError, Identity, TokenVerifier};
use upcycle_connect::marketplace::materials::{Material, MaterialId, MaterialQuery, MaterialStore};
use upcycle_connect::marketplace::requests::{
    MaterialRequest, RequestFilter, RequestId, RequestStore,
};
use upcycle_connect::marketplace::StoreError;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local material store. Contents reset on restart; the
/// database-backed variant lives behind the same trait.
#[derive(Default, Clone)]
pub(crate) struct InMemoryMaterialStore {
    records: Arc<Mutex<HashMap<MaterialId, Material>>>,
}

fn newest_first(materials: &mut [Material]) {
    materials.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

impl MaterialStore for InMemoryMaterialStore {
    fn insert(&self, material: Material) -> Result<Material, StoreError> {
        let mut guard = self.records.lock().expect("material store mutex poisoned");
        if guard.contains_key(&material.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(material.id.clone(), material.clone());
        Ok(material)
    }

    fn update(&self, material: Material) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("material store mutex poisoned");
        if guard.contains_key(&material.id) {
            guard.insert(material.id.clone(), material);
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    fn fetch(&self, id: &MaterialId) -> Result<Option<Material>, StoreError> {
        let guard = self.records.lock().expect("material store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn delete(&self, id: &MaterialId) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("material store mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    fn list(&self, query: &MaterialQuery) -> Result<Vec<Material>, StoreError> {
        let guard = self.records.lock().expect("material store mutex poisoned");
        let mut materials: Vec<Material> = guard
            .values()
            .filter(|material| query.matches(material))
            .cloned()
            .collect();
        newest_first(&mut materials);
        if let Some(limit) = query.limit {
            materials.truncate(limit);
        }
        Ok(materials)
    }

    fn by_provider(&self, provider_id: &str) -> Result<Vec<Material>, StoreError> {
        let guard = self.records.lock().expect("material store mutex poisoned");
        let mut materials: Vec<Material> = guard
            .values()
            .filter(|material| material.provider_id == provider_id)
            .cloned()
            .collect();
        newest_first(&mut materials);
        Ok(materials)
    }

    fn located_available(&self) -> Result<Vec<Material>, StoreError> {
        let guard = self.records.lock().expect("material store mutex poisoned");
        let mut materials: Vec<Material> = guard
            .values()
            .filter(|material| {
                MaterialQuery::default().matches(material) && material.position().is_some()
            })
            .cloned()
            .collect();
        newest_first(&mut materials);
        Ok(materials)
    }
}

/// Process-local request store.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRequestStore {
    records: Arc<Mutex<HashMap<RequestId, MaterialRequest>>>,
}

impl RequestStore for InMemoryRequestStore {
    fn insert(&self, request: MaterialRequest) -> Result<MaterialRequest, StoreError> {
        let mut guard = self.records.lock().expect("request store mutex poisoned");
        if guard.contains_key(&request.id) {
            return Err(StoreError::Conflict);
        }
        guard.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    fn update(&self, request: MaterialRequest) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("request store mutex poisoned");
        if guard.contains_key(&request.id) {
            guard.insert(request.id.clone(), request);
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    fn fetch(&self, id: &RequestId) -> Result<Option<MaterialRequest>, StoreError> {
        let guard = self.records.lock().expect("request store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn delete(&self, id: &RequestId) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("request store mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    fn list(&self, filter: &RequestFilter) -> Result<Vec<MaterialRequest>, StoreError> {
        let guard = self.records.lock().expect("request store mutex poisoned");
        let mut requests: Vec<MaterialRequest> = guard
            .values()
            .filter(|request| filter.matches(request))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    fn by_seeker(&self, seeker_id: &str) -> Result<Vec<MaterialRequest>, StoreError> {
        let guard = self.records.lock().expect("request store mutex poisoned");
        let mut requests: Vec<MaterialRequest> = guard
            .values()
            .filter(|request| request.seeker_id == seeker_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }
}

/// Token-table verifier standing in for the external auth provider: tokens
/// granted here verify to the identity they were granted for, everything
/// else is rejected.
#[derive(Default, Clone)]
pub(crate) struct TokenTableVerifier {
    tokens: Arc<Mutex<HashMap<String, Identity>>>,
}

impl TokenTableVerifier {
    pub(crate) fn grant(&self, token: &str, identity: Identity) {
        let mut guard = self.tokens.lock().expect("token table mutex poisoned");
        guard.insert(token.to_string(), identity);
    }
}

impl TokenVerifier for TokenTableVerifier {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let guard = self.tokens.lock().expect("token table mutex poisoned");
        guard.get(token).cloned().ok_or(AuthError::InvalidToken)
    }
}
