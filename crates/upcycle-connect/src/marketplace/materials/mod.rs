//! Material listings: intake, ownership-guarded updates, filtered browsing,
//! and proximity search.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    Material, MaterialCategory, MaterialDraft, MaterialId, MaterialPatch, MaterialStatus,
};
pub use repository::{MaterialQuery, MaterialStore};
pub use router::material_router;
pub use service::{MaterialService, MaterialServiceError};
