//! Utility functions shared across layers.
//!
//! - [`code_generator`] - Short code generation with injectable entropy
//! - [`db_error`] - Classification of database errors
//! - [`url_validator`] - Absolute URL checks

pub mod code_generator;
pub mod db_error;
pub mod url_validator;
