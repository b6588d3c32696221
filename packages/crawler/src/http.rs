//! HTTP fetcher shared by every stage of the crawl.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, REFERER};

use crate::config;
use crate::error::{CrawlerError, Result};

/// Status and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Issues GET requests for the crawler.
///
/// Any status code is a successful fetch; only transport failures are errors.
/// `referer` is applied to this one request and nothing else.
pub trait Fetch {
    fn get(&self, url: &str, timeout: Duration, referer: Option<&str>) -> Result<FetchResponse>;
}

/// Blocking reqwest client with a persistent cookie jar and browser-like headers.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(config::ACCEPT_LANGUAGE),
        );

        let client = Client::builder()
            .user_agent(config::USER_AGENT)
            .default_headers(headers)
            .cookie_store(true)
            .build()
            .map_err(CrawlerError::ClientBuild)?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn get(&self, url: &str, timeout: Duration, referer: Option<&str>) -> Result<FetchResponse> {
        let mut request = self.client.get(url).timeout(timeout);
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }

        let transport = |source| CrawlerError::Transport {
            url: url.to_string(),
            source,
        };

        let response = request.send().map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(transport)?.to_vec();

        tracing::debug!(url, status, bytes = body.len(), "fetched");
        Ok(FetchResponse { status, body })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_fetcher() {
        assert!(HttpFetcher::new().is_ok());
    }

    #[test]
    fn test_response_text_is_lossy() {
        let response = FetchResponse {
            status: 200,
            body: vec![b'o', b'k', 0xff],
        };
        assert!(response.is_ok());
        assert_eq!(response.text(), "ok\u{fffd}");
    }
}
