pub mod crawler;
pub mod web;

pub use crawler::{FetchResponse, Fetcher};
pub use web::{HttpFetcher, SiteCrawler, audit_site};
