//! Domain layer containing business entities and store contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`errors`] - Store failure taxonomy
//!
//! The domain layer has no knowledge of HTTP or of concrete backends. The
//! orchestration of these pieces lives in [`crate::application`].

pub mod entities;
pub mod errors;
pub mod repositories;
