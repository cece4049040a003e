//! # schemagate-remote
//!
//! Remote sourcing for catalog URLs hosted outside the local store:
//! sequential fetching into scan visitors, and the link check. All
//! remote work is best-effort.

pub mod error;
pub mod fetch;
pub mod links;

pub use error::FetchError;
pub use fetch::{FetchConfig, FetchSummary, RemoteFetcher};
pub use links::{check_links, LinkProblem, LinkReport};
