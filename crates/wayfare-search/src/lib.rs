//! # wayfare-search
//!
//! Location search for wayfare.
//!
//! This crate turns a raw search string into ranked location results:
//! - Input classification (code, Chinese, pinyin/English)
//! - Staged regex query construction (exact, prefix, contains)
//! - Text-index query construction
//! - `matchScore` computation and result ordering
//! - Text-index to regex fallback over any [`LocationSearchBackend`]
//!
//! [`LocationSearchBackend`]: wayfare_core::LocationSearchBackend

pub mod classifier;
pub mod fallback;
pub mod flags;
pub mod memory;
pub mod regex_builder;
pub mod scoring;
pub mod text_builder;

pub use classifier::classify;
pub use fallback::{LocationPage, LocationSearchService, SearchRequest};
pub use flags::{SearchConfig, WideningPolicy};
pub use memory::{BackendCall, MemoryLocationStore};
pub use regex_builder::{build_regex_query, escape_regex};
pub use scoring::{match_score, rank};
pub use text_builder::build_text_query;
