//! Core domain entities.
//!
//! - [`ShortLink`] - A code to URL mapping
//! - [`UsageStats`] - Redirect counters kept alongside each link
//!
//! Creation inputs live next to the entity they produce
//! ([`NewShortLink`], [`CreateLinkOptions`]).

pub mod link;
pub mod usage;

pub use link::{CreateLinkOptions, NewShortLink, ShortLink};
pub use usage::UsageStats;
