use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::marketplace::materials::MaterialId;

/// Identifier wrapper for seeker requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

/// Request lifecycle. A completed request counts as a finished project in
/// the impact metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Completed,
}

impl RequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Completed => "completed",
        }
    }
}

/// A seeker's request as stored and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRequest {
    pub id: RequestId,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_id: Option<MaterialId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    pub seeker_id: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Seeker-submitted request payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub material_id: Option<MaterialId>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// Partial update. Providers move status forward; seekers may edit their own
/// request text. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub material_id: Option<MaterialId>,
    pub quantity: Option<u32>,
    pub status: Option<RequestStatus>,
}
