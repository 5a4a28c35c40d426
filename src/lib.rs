// src/lib.rs

//! jobscout library
//!
//! Discovers job postings across South African and remote job boards,
//! normalizes and deduplicates them, filters international postings for
//! eligibility and ranks everything against a candidate profile.

pub mod error;
pub mod location;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod utils;

pub use error::{AppError, Result};
pub use pipeline::Discovery;
