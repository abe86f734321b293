//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! the lookup cache, validation and code generation. Handlers talk to it through
//! [`services::LinkService`].
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link creation, resolution and sweeping
//! - [`services::auth_service::AuthService`] - API key authentication
//! - [`expiry_sweeper`] - Periodic removal of expired links

pub mod errors;
pub mod expiry_sweeper;
pub mod services;

pub use errors::{ErrorKind, LinkError};
