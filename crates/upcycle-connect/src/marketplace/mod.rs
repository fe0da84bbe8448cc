//! Marketplace domain: material listings, seeker requests, proximity search,
//! and derived sustainability metrics.

pub mod auth;
pub mod geo;
pub mod impact;
pub mod materials;
pub mod requests;

/// Error enumeration shared by the material and request store seams.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
