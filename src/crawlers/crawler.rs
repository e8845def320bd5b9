use crate::error::Result;
use std::future::Future;

/// A fetched HTTP response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 2xx with a non-empty body
    pub fn has_content(&self) -> bool {
        self.is_success() && !self.body.is_empty()
    }
}

/// Fetch capability used by the crawl.
///
/// Network failures and timeouts must surface as `Err` so the crawl can
/// degrade to defaults instead of aborting.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchResponse>> + Send;
}
