//! Marketplace backend for exchanging reusable and upcycled materials.
//!
//! Providers list materials, seekers request them, and the platform derives
//! sustainability metrics (carbon saved, impact score) from completed
//! exchanges. Storage and token verification are seams: the domain services
//! are generic over a [`marketplace::materials::MaterialStore`] /
//! [`marketplace::requests::RequestStore`] pair and a
//! [`marketplace::auth::TokenVerifier`], all chosen once at process start.

pub mod config;
pub mod error;
pub mod marketplace;
pub mod telemetry;
