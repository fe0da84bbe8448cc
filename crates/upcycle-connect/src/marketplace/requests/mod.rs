//! Seeker requests for listed materials: intake, status transitions, and
//! browsing.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{MaterialRequest, RequestDraft, RequestId, RequestPatch, RequestStatus};
pub use repository::{RequestFilter, RequestStore};
pub use router::request_router;
pub use service::{RequestService, RequestServiceError};
