//! Integration scenarios for impact reporting.
//!
//! Covers aggregation over the material and request stores and the HTTP
//! surface: the public platform and per-user endpoints and the
//! token-gated personal summary.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use upcycle_connect::marketplace::auth::{AuthError, Identity, Role, TokenVerifier};
    use upcycle_connect::marketplace::impact::ImpactService;
    use upcycle_connect::marketplace::materials::{
        Material, MaterialDraft, MaterialId, MaterialQuery, MaterialService, MaterialStore,
    };
    use upcycle_connect::marketplace::requests::{
        MaterialRequest, RequestDraft, RequestFilter, RequestId, RequestPatch, RequestService,
        RequestStatus, RequestStore,
    };
    use upcycle_connect::marketplace::StoreError;

    #[derive(Default, Clone)]
    pub(super) struct MemoryMaterialStore {
        records: Arc<Mutex<HashMap<MaterialId, Material>>>,
    }

    impl MaterialStore for MemoryMaterialStore {
        fn insert(&self, material: Material) -> Result<Material, StoreError> {
            let mut guard = self.records.lock().expect("lock");
            if guard.contains_key(&material.id) {
                return Err(StoreError::Conflict);
            }
            guard.insert(material.id.clone(), material.clone());
            Ok(material)
        }

        fn update(&self, material: Material) -> Result<(), StoreError> {
            let mut guard = self.records.lock().expect("lock");
            if !guard.contains_key(&material.id) {
                return Err(StoreError::NotFound);
            }
            guard.insert(material.id.clone(), material);
            Ok(())
        }

        fn fetch(&self, id: &MaterialId) -> Result<Option<Material>, StoreError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard.get(id).cloned())
        }

        fn delete(&self, id: &MaterialId) -> Result<(), StoreError> {
            let mut guard = self.records.lock().expect("lock");
            guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
        }

        fn list(&self, query: &MaterialQuery) -> Result<Vec<Material>, StoreError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard
                .values()
                .filter(|material| query.matches(material))
                .cloned()
                .collect())
        }

        fn by_provider(&self, provider_id: &str) -> Result<Vec<Material>, StoreError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard
                .values()
                .filter(|material| material.provider_id == provider_id)
                .cloned()
                .collect())
        }

        fn located_available(&self) -> Result<Vec<Material>, StoreError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard
                .values()
                .filter(|material| {
                    MaterialQuery::default().matches(material) && material.position().is_some()
                })
                .cloned()
                .collect())
        }
    }

    #[derive(Default, Clone)]
    pub(super) struct MemoryRequestStore {
        records: Arc<Mutex<HashMap<RequestId, MaterialRequest>>>,
    }

    impl RequestStore for MemoryRequestStore {
        fn insert(&self, request: MaterialRequest) -> Result<MaterialRequest, StoreError> {
            let mut guard = self.records.lock().expect("lock");
            if guard.contains_key(&request.id) {
                return Err(StoreError::Conflict);
            }
            guard.insert(request.id.clone(), request.clone());
            Ok(request)
        }

        fn update(&self, request: MaterialRequest) -> Result<(), StoreError> {
            let mut guard = self.records.lock().expect("lock");
            if !guard.contains_key(&request.id) {
                return Err(StoreError::NotFound);
            }
            guard.insert(request.id.clone(), request);
            Ok(())
        }

        fn fetch(&self, id: &RequestId) -> Result<Option<MaterialRequest>, StoreError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard.get(id).cloned())
        }

        fn delete(&self, id: &RequestId) -> Result<(), StoreError> {
            let mut guard = self.records.lock().expect("lock");
            guard.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
        }

        fn list(&self, filter: &RequestFilter) -> Result<Vec<MaterialRequest>, StoreError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard
                .values()
                .filter(|request| filter.matches(request))
                .cloned()
                .collect())
        }

        fn by_seeker(&self, seeker_id: &str) -> Result<Vec<MaterialRequest>, StoreError> {
            let guard = self.records.lock().expect("lock");
            Ok(guard
                .values()
                .filter(|request| request.seeker_id == seeker_id)
                .cloned()
                .collect())
        }
    }

    pub(super) struct Marketplace {
        pub(super) materials: MaterialService<MemoryMaterialStore>,
        pub(super) requests: RequestService<MemoryRequestStore, MemoryMaterialStore>,
        pub(super) impact: ImpactService<MemoryMaterialStore, MemoryRequestStore>,
    }

    pub(super) fn build_marketplace() -> Marketplace {
        let material_store = Arc::new(MemoryMaterialStore::default());
        let request_store = Arc::new(MemoryRequestStore::default());
        Marketplace {
            materials: MaterialService::new(material_store.clone()),
            requests: RequestService::new(request_store.clone(), material_store.clone()),
            impact: ImpactService::new(material_store, request_store),
        }
    }

    pub(super) fn draft(name: &str, category: &str, quantity: u32) -> MaterialDraft {
        MaterialDraft {
            name: Some(name.to_string()),
            description: Some("Reclaimed lot".to_string()),
            category: Some(category.to_string()),
            quantity: Some(quantity),
            condition: Some("good".to_string()),
            location: None,
            latitude: None,
            longitude: None,
        }
    }

    /// Create a request for `seeker_id` and mark it completed.
    pub(super) fn complete_request(marketplace: &Marketplace, seeker_id: &str) {
        let request = marketplace
            .requests
            .create(
                RequestDraft {
                    title: Some("Workshop supplies".to_string()),
                    description: Some("Any reclaimed textile".to_string()),
                    material_id: None,
                    quantity: None,
                },
                seeker_id,
            )
            .expect("request accepted");
        marketplace
            .requests
            .update(
                &request.id,
                RequestPatch {
                    status: Some(RequestStatus::Completed),
                    ..RequestPatch::default()
                },
                &Identity {
                    user_id: "provider-ops".to_string(),
                    role: Role::Provider,
                },
            )
            .expect("request completed");
    }

    /// Fixed token table for the HTTP scenarios.
    pub(super) struct SummaryVerifier;

    impl TokenVerifier for SummaryVerifier {
        fn verify(&self, token: &str) -> Result<Identity, AuthError> {
            match token {
                "alice-token" => Ok(Identity {
                    user_id: "alice".to_string(),
                    role: Role::Provider,
                }),
                _ => Err(AuthError::InvalidToken),
            }
        }
    }
}

mod aggregation {
    use super::common::*;

    #[test]
    fn user_impact_sums_listings_and_completed_projects() {
        let marketplace = build_marketplace();
        marketplace
            .materials
            .create(draft("Denim offcuts", "fabric", 2), "alice")
            .expect("listing accepted");
        marketplace
            .materials
            .create(draft("Leather swatches", "leather", 1), "alice")
            .expect("listing accepted");
        complete_request(&marketplace, "alice");
        complete_request(&marketplace, "alice");

        let summary = marketplace
            .impact
            .user_impact("alice")
            .expect("summary computed");

        // fabric 2x25 + leather 1x30 = 80 kg; 80*0.5 + 2*0.3 + 2*0.2 = 41
        assert_eq!(summary.carbon_saved, 80.0);
        assert_eq!(summary.materials_recycled, 2);
        assert_eq!(summary.projects_completed, 2);
        assert_eq!(summary.impact_score, 41);
    }

    #[test]
    fn unknown_categories_fall_back_to_the_other_factor() {
        let marketplace = build_marketplace();
        marketplace
            .materials
            .create(draft("Mystery crate", "reclaimed-timber", 4), "alice")
            .expect("listing accepted");

        let summary = marketplace
            .impact
            .user_impact("alice")
            .expect("summary computed");
        assert_eq!(summary.carbon_saved, 60.0);
    }

    #[test]
    fn users_with_no_activity_have_a_zero_summary() {
        let marketplace = build_marketplace();
        let summary = marketplace
            .impact
            .user_impact("nobody")
            .expect("summary computed");

        assert_eq!(summary.carbon_saved, 0.0);
        assert_eq!(summary.materials_recycled, 0);
        assert_eq!(summary.projects_completed, 0);
        assert_eq!(summary.impact_score, 0);
    }

    #[test]
    fn pending_requests_do_not_count_as_projects() {
        let marketplace = build_marketplace();
        marketplace
            .requests
            .create(
                upcycle_connect::marketplace::requests::RequestDraft {
                    title: Some("Denim".to_string()),
                    description: Some("For totes".to_string()),
                    material_id: None,
                    quantity: None,
                },
                "alice",
            )
            .expect("request accepted");

        let summary = marketplace
            .impact
            .user_impact("alice")
            .expect("summary computed");
        assert_eq!(summary.projects_completed, 0);
    }

    #[test]
    fn platform_totals_span_all_providers() {
        let marketplace = build_marketplace();
        marketplace
            .materials
            .create(draft("Denim offcuts", "fabric", 10), "alice")
            .expect("listing accepted");
        marketplace
            .materials
            .create(draft("Button crate", "accessories", 2), "bob")
            .expect("listing accepted");
        complete_request(&marketplace, "carol");

        let platform = marketplace
            .impact
            .platform_impact()
            .expect("totals computed");
        assert_eq!(platform.total_carbon_saved, 260.0);
        assert_eq!(platform.total_materials_recycled, 2);
        assert_eq!(platform.total_projects, 1);
    }
}

mod routing {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;
    use upcycle_connect::marketplace::auth::TokenVerifier;
    use upcycle_connect::marketplace::impact::{impact_router, ImpactService};
    use upcycle_connect::marketplace::materials::MaterialService;

    fn impact_app() -> (axum::Router, MaterialService<MemoryMaterialStore>) {
        let material_store = Arc::new(MemoryMaterialStore::default());
        let request_store = Arc::new(MemoryRequestStore::default());
        let verifier: Arc<dyn TokenVerifier> = Arc::new(SummaryVerifier);
        let materials = MaterialService::new(material_store.clone());
        let router = impact_router(
            Arc::new(ImpactService::new(material_store, request_store)),
            verifier,
        );
        (router, materials)
    }

    #[tokio::test]
    async fn personal_summary_requires_a_token() {
        let (router, _) = impact_app();
        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/impact/summary")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn personal_summary_reflects_the_callers_listings() {
        let (router, materials) = impact_app();
        materials
            .create(draft("Denim offcuts", "fabric", 10), "alice")
            .expect("listing accepted");

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/impact/summary")
                    .header("authorization", "Bearer alice-token")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(
            payload.get("carbonSaved").and_then(Value::as_f64),
            Some(250.0)
        );
        assert_eq!(
            payload.get("materialsRecycled").and_then(Value::as_u64),
            Some(1)
        );
        // 250*0.5 + 1*0.3 = 125.3 -> 125
        assert_eq!(payload.get("impactScore").and_then(Value::as_i64), Some(125));
    }

    #[tokio::test]
    async fn user_impact_endpoint_is_public() {
        let (router, materials) = impact_app();
        materials
            .create(draft("Leather swatches", "leather", 1), "alice")
            .expect("listing accepted");

        let response = router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/impact/user/alice")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(
            payload.get("carbonSaved").and_then(Value::as_f64),
            Some(30.0)
        );
    }

    #[tokio::test]
    async fn platform_endpoint_serves_totals_without_a_token() {
        let (router, materials) = impact_app();
        materials
            .create(draft("Denim offcuts", "fabric", 4), "alice")
            .expect("listing accepted");

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

        let body = to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body");
        let payload: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(
            payload.get("totalCarbonSaved").and_then(Value::as_f64),
            Some(100.0)
        );
        assert_eq!(
            payload.get("totalMaterialsRecycled").and_then(Value::as_u64),
            Some(1)
        );
    }
}
