//! Dramabox Upstream Integration
//!
//! Client for the scraping backend that exposes the drama provider's data.
//!
//! # Endpoints
//!
//! ```text
//! GET {DRAMABOX_API_URL}/stream?bookId=X&index=N   chapters + stream sources
//! GET {DRAMABOX_API_URL}/latest?pageNo=N           latest releases
//! GET {DRAMABOX_API_URL}/suggest?keyword=K         search suggestions
//! ```
//!
//! Responses are handed back as raw JSON together with the HTTP status. The
//! stream payload goes through [`crate::services::normalizer`]; list payloads
//! are mapped with [`latest_records`] / [`suggest_records`].

pub mod client;
pub mod types;

pub use client::{DramaboxClient, DramaboxError};
pub use types::{latest_records, suggest_records, BookItem, UpstreamResponse};
