use crate::infra::{InMemoryMaterialStore, InMemoryRequestStore};
use clap::Args;
use std::sync::Arc;
use upcycle_connect::error::AppError;
use upcycle_connect::marketplace::auth::{Identity, Role};
use upcycle_connect::marketplace::geo::{GeoPoint, DEFAULT_RADIUS_KM};
use upcycle_connect::marketplace::impact::ImpactService;
use upcycle_connect::marketplace::materials::{MaterialDraft, MaterialService};
use upcycle_connect::marketplace::requests::{
    RequestDraft, RequestPatch, RequestService, RequestStatus,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Origin latitude for the proximity search (defaults to downtown Manhattan)
    #[arg(long)]
    pub(crate) latitude: Option<f64>,
    /// Origin longitude for the proximity search
    #[arg(long)]
    pub(crate) longitude: Option<f64>,
    /// Search radius in kilometers
    #[arg(long)]
    pub(crate) radius: Option<f64>,
    /// Skip the impact reporting portion of the demo
    #[arg(long)]
    pub(crate) skip_impact: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        latitude,
        longitude,
        radius,
        skip_impact,
    } = args;

    let origin = GeoPoint::new(
        latitude.unwrap_or(40.7128),
        longitude.unwrap_or(-74.0060),
    );
    let radius_km = radius.unwrap_or(DEFAULT_RADIUS_KM);

    let material_store = Arc::new(InMemoryMaterialStore::default());
    let request_store = Arc::new(InMemoryRequestStore::default());
    let materials = MaterialService::new(material_store.clone());
    let requests = RequestService::new(request_store.clone(), material_store.clone());
    let impact = ImpactService::new(material_store, request_store);

    let provider = Identity {
        user_id: "provider-demo".to_string(),
        role: Role::Provider,
    };
    let seeker = Identity {
        user_id: "seeker-demo".to_string(),
        role: Role::Seeker,
    };

    println!("UpCycle Connect marketplace demo");
    println!(
        "Origin {:.4}, {:.4} | radius {radius_km} km",
        origin.latitude, origin.longitude
    );

    println!("\nSeeding provider listings");
    let mut listed = Vec::new();
    for draft in demo_listings() {
        let name = draft.name.clone().unwrap_or_default();
        match materials.create(draft, &provider.user_id) {
            Ok(material) => {
                println!(
                    "- {} [{}] x{} -> {:.2} kg CO2e saved",
                    material.name,
                    material.category.label(),
                    material.quantity,
                    material.carbon_saved
                );
                listed.push(material);
            }
            Err(err) => println!("- {name} rejected: {err}"),
        }
    }

    println!("\nNearby materials (sorted by distance)");
    match materials.nearby(origin, radius_km) {
        Ok(nearby) if nearby.is_empty() => println!("- none within {radius_km} km"),
        Ok(nearby) => {
            for found in &nearby {
                println!(
                    "- {} at {:.1} km ({})",
                    found.record.name,
                    found.distance_km,
                    found
                        .record
                        .location
                        .as_deref()
                        .unwrap_or("no address on file")
                );
            }
        }
        Err(err) => println!("- proximity search unavailable: {err}"),
    }

    if skip_impact {
        return Ok(());
    }

    println!("\nSeeker activity");
    let request = match requests.create(
        RequestDraft {
            title: Some("Denim for tote bags".to_string()),
            description: Some("Heavyweight denim offcuts for a workshop run".to_string()),
            material_id: listed.first().map(|material| material.id.clone()),
            quantity: Some(3),
        },
        &seeker.user_id,
    ) {
        Ok(request) => request,
        Err(err) => {
            println!("- request rejected: {err}");
            return Ok(());
        }
    };
    println!("- Request {} created ({})", request.id.0, request.status.label());

    match requests.for_provider(&provider.user_id) {
        Ok(incoming) => println!(
            "- Provider inbox: {} request(s) targeting their listings",
            incoming.len()
        ),
        Err(err) => println!("- Provider inbox unavailable: {err}"),
    }

    match requests.update(
        &request.id,
        RequestPatch {
            status: Some(RequestStatus::Completed),
            ..RequestPatch::default()
        },
        &seeker,
    ) {
        Ok(updated) => println!("- Request {} marked {}", updated.id.0, updated.status.label()),
        Err(err) => println!("- Request update failed: {err}"),
    }

    println!("\nImpact report");
    match impact.user_impact(&provider.user_id) {
        Ok(summary) => println!(
            "- Provider: {:.2} kg CO2e | {} materials | {} projects | score {}",
            summary.carbon_saved,
            summary.materials_recycled,
            summary.projects_completed,
            summary.impact_score
        ),
        Err(err) => println!("- Provider impact unavailable: {err}"),
    }
    match impact.user_impact(&seeker.user_id) {
        Ok(summary) => println!(
            "- Seeker: {:.2} kg CO2e | {} materials | {} projects | score {}",
            summary.carbon_saved,
            summary.materials_recycled,
            summary.projects_completed,
            summary.impact_score
        ),
        Err(err) => println!("- Seeker impact unavailable: {err}"),
    }
    match impact.platform_impact() {
        Ok(platform) => println!(
            "- Platform: {:.2} kg CO2e | {} materials | {} completed projects",
            platform.total_carbon_saved,
            platform.total_materials_recycled,
            platform.total_projects
        ),
        Err(err) => println!("- Platform impact unavailable: {err}"),
    }

    Ok(())
}

fn demo_listings() -> Vec<MaterialDraft> {
    vec![
        MaterialDraft {
            name: Some("Denim offcuts".to_string()),
            description: Some("Assorted indigo denim panels from a jeans run".to_string()),
            category: Some("fabric".to_string()),
            quantity: Some(12),
            condition: Some("good".to_string()),
            location: Some("SoHo, New York".to_string()),
            latitude: Some(40.7233),
            longitude: Some(-74.0030),
        },
        MaterialDraft {
            name: Some("Leather swatches".to_string()),
            description: Some("Full-grain leather samples, mixed colors".to_string()),
            category: Some("leather".to_string()),
            quantity: Some(5),
            condition: Some("like new".to_string()),
            location: Some("Williamsburg, Brooklyn".to_string()),
            latitude: Some(40.7081),
            longitude: Some(-73.9571),
        },
        MaterialDraft {
            name: Some("Wool coats".to_string()),
            description: Some("Gently used winter coats for reworking".to_string()),
            category: Some("clothing".to_string()),
            quantity: Some(8),
            condition: Some("fair".to_string()),
            location: Some("Los Angeles, CA".to_string()),
            latitude: Some(34.0522),
            longitude: Some(-118.2437),
        },
        MaterialDraft {
            name: Some("Button assortment".to_string()),
            description: Some("Mixed vintage buttons, no location on file".to_string()),
            category: Some("accessories".to_string()),
            quantity: Some(200),
            condition: Some("good".to_string()),
            location: None,
            latitude: None,
            longitude: None,
        },
    ]
}
