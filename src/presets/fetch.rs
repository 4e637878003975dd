//! Single-attempt JSON fetching

use async_trait::async_trait;
use log::trace;
use serde_json::Value;
use std::fmt;

use crate::exceptions::FetchError;

/// One GET returning a JSON document. Retries and timeouts are layered on
/// top by [`super::RetryPolicy`].
#[async_trait]
pub trait JsonFetcher: Send + Sync + fmt::Debug {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// [`JsonFetcher`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("slicelens/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn transport(url: &str, err: &reqwest::Error) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        trace!("🌐 GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                FetchError::Decode {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            } else {
                transport(url, &e)
            }
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory fetcher: each URL answers from a queue of scripted
    /// responses, repeating the last one. Unknown URLs answer 404.
    #[derive(Debug, Default)]
    pub(crate) struct StubFetcher {
        routes: Mutex<HashMap<String, Vec<Result<Value, FetchError>>>>,
        calls: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn with_json(self, url: &str, value: Value) -> Self {
            self.with_responses(url, vec![Ok(value)])
        }

        pub(crate) fn with_responses(
            self,
            url: &str,
            responses: Vec<Result<Value, FetchError>>,
        ) -> Self {
            self.routes
                .lock()
                .unwrap()
                .insert(url.to_string(), responses);
            self
        }

        pub(crate) fn calls_to(&self, url: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|u| u.as_str() == url)
                .count()
        }
    }

    #[async_trait]
    impl JsonFetcher for StubFetcher {
        async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(url) {
                Some(queue) if queue.len() > 1 => queue.remove(0),
                Some(queue) => queue.first().cloned().unwrap_or_else(|| {
                    Err(FetchError::Status {
                        url: url.to_string(),
                        status: 404,
                    })
                }),
                None => Err(FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_stub_scripted_responses() {
        let url = "https://profiles.test/a.json";
        let fetcher = StubFetcher::new().with_responses(
            url,
            vec![
                Err(FetchError::Status {
                    url: url.to_string(),
                    status: 500,
                }),
                Ok(serde_json::json!({"foo": 1})),
            ],
        );
        assert!(fetcher.fetch_json(url).await.is_err());
        assert_eq!(fetcher.fetch_json(url).await.unwrap()["foo"], 1);
        assert_eq!(fetcher.fetch_json(url).await.unwrap()["foo"], 1);
        assert_eq!(fetcher.calls_to(url), 3);
        assert!(fetcher.fetch_json("https://profiles.test/missing").await.is_err());
    }

    #[test]
    fn test_http_fetcher_builds() {
        assert!(HttpFetcher::new().is_ok());
    }
}
