use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{round_hundredth, ImpactSummary};
use crate::marketplace::materials::{MaterialQuery, MaterialStore};
use crate::marketplace::requests::{RequestFilter, RequestStatus, RequestStore};
use crate::marketplace::StoreError;

/// Aggregates store data into impact summaries for users and the platform.
pub struct ImpactService<M, R> {
    materials: Arc<M>,
    requests: Arc<R>,
}

/// Platform-wide totals served on the public analytics endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformImpact {
    pub total_carbon_saved: f64,
    pub total_materials_recycled: u64,
    pub total_projects: u64,
}

impl<M, R> ImpactService<M, R>
where
    M: MaterialStore + 'static,
    R: RequestStore + 'static,
{
    pub fn new(materials: Arc<M>, requests: Arc<R>) -> Self {
        Self {
            materials,
            requests,
        }
    }

    /// A user's impact: carbon saved across their listed materials, the
    /// count of those materials, and their completed requests as projects.
    pub fn user_impact(&self, user_id: &str) -> Result<ImpactSummary, ImpactServiceError> {
        let materials = self.materials.by_provider(user_id)?;
        let carbon_saved: f64 = materials.iter().map(|material| material.carbon_saved).sum();
        let materials_recycled = materials.len() as u64;

        let projects_completed = self
            .requests
            .by_seeker(user_id)?
            .iter()
            .filter(|request| request.status == RequestStatus::Completed)
            .count() as u64;

        Ok(ImpactSummary::derive(
            carbon_saved,
            materials_recycled,
            projects_completed,
        ))
    }

    /// Totals over all available listings and all completed requests.
    pub fn platform_impact(&self) -> Result<PlatformImpact, ImpactServiceError> {
        let materials = self.materials.list(&MaterialQuery::default())?;
        let total_carbon_saved: f64 =
            materials.iter().map(|material| material.carbon_saved).sum();
        let total_materials_recycled = materials.len() as u64;

        let total_projects = self
            .requests
            .list(&RequestFilter {
                status: Some(RequestStatus::Completed),
                ..RequestFilter::default()
            })?
            .len() as u64;

        Ok(PlatformImpact {
            total_carbon_saved: round_hundredth(total_carbon_saved),
            total_materials_recycled,
            total_projects,
        })
    }
}

/// Error raised by the impact service.
#[derive(Debug, thiserror::Error)]
pub enum ImpactServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
