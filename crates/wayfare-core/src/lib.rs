//! # wayfare-core
//!
//! Core types, traits, and abstractions for the wayfare location service.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other wayfare crates depend on: the location and currency models,
//! the search query types shared between the query builders and the database
//! layer, and the repository traits the HTTP layer is written against.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod search;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use search::*;
pub use traits::*;
