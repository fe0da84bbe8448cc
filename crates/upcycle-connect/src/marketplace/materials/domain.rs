use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::marketplace::geo::GeoPoint;

/// Identifier wrapper for listed materials.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub String);

/// Categories recognized by the carbon model. Anything else collapses to
/// `Other`, which is a deliberate default rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialCategory {
    Fabric,
    Clothing,
    Accessories,
    Leather,
    Other,
}

impl MaterialCategory {
    /// Case-insensitive parse; unrecognized categories fall back to `Other`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "fabric" => Self::Fabric,
            "clothing" => Self::Clothing,
            "accessories" => Self::Accessories,
            "leather" => Self::Leather,
            _ => Self::Other,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Fabric => "fabric",
            Self::Clothing => "clothing",
            Self::Accessories => "accessories",
            Self::Leather => "leather",
            Self::Other => "other",
        }
    }
}

/// Listing lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialStatus {
    Available,
    Reserved,
    Claimed,
}

impl MaterialStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Claimed => "claimed",
        }
    }
}

/// A listed material as stored and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    pub description: String,
    pub category: MaterialCategory,
    pub quantity: u32,
    pub condition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub provider_id: String,
    pub status: MaterialStatus,
    pub carbon_saved: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Material {
    /// Both coordinates present and finite, or the material is not locatable.
    pub fn position(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude))
                if latitude.is_finite() && longitude.is_finite() =>
            {
                Some(GeoPoint::new(latitude, longitude))
            }
            _ => None,
        }
    }
}

/// Provider-submitted listing payload. Required fields are optional here so
/// the service can report all intake problems as validation errors rather
/// than deserialization failures.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<u32>,
    pub condition: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Partial update applied by the owning provider. Absent fields keep their
/// stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<u32>,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Option<MaterialStatus>,
}
