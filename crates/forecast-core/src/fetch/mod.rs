//! Fetchers
//!
//! Each fetcher issues one request and resolves it into a
//! [`RequestOutcome`](crate::outcome::RequestOutcome); errors never escape as
//! `Err`.

pub mod forecast;
pub mod metadata;

pub use forecast::ForecastFetcher;
pub use metadata::MetadataFetcher;
