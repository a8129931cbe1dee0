//! Access to the remote family record store
//!
//! The traversal engine only sees [`RecordFetcher`], which answers every
//! lookup with a record or `None`. Not-found, malformed bodies, transport
//! errors and timeouts are all folded into `None` before they get there.

use crate::error::{CrawlerError, FetchError, Result};
use crate::model::{Family, FamilyId, Person, PersonId};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, warn};

/// Default record store address
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8123";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// Boxed future returned by record lookups
pub type FetchFuture<'a, T> = Pin<Box<dyn Future<Output = Option<T>> + Send + 'a>>;

/// Keyed, idempotent lookups against the record store
///
/// Implementations must be safe to call concurrently and repeatedly.
pub trait RecordFetcher: Send + Sync {
    fn fetch_family(&self, id: FamilyId) -> FetchFuture<'_, Family>;

    fn fetch_person(&self, id: PersonId) -> FetchFuture<'_, Person>;
}

/// Record fetcher backed by the JSON-over-HTTP record server
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl HttpFetcher {
    /// Creates a fetcher for `base_url`, bounding every request by `timeout`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(CrawlerError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn family_url(&self, id: FamilyId) -> String {
        format!("{}/family/{}", self.base_url, id.0)
    }

    pub fn person_url(&self, id: PersonId) -> String {
        format!("{}/person/{}", self.base_url, id.0)
    }

    async fn get_record<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> std::result::Result<Option<T>, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        // A literal `null` body is how the server says "no such record".
        serde_json::from_str::<Option<T>>(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

/// Logs a failed lookup and reports it as absent
fn absent_on_error<T>(url: &str, result: std::result::Result<Option<T>, FetchError>) -> Option<T> {
    match result {
        Ok(Some(record)) => Some(record),
        Ok(None) => {
            debug!(url, "record not found");
            None
        }
        Err(e) => {
            warn!(error = %e, "treating record as absent");
            None
        }
    }
}

impl RecordFetcher for HttpFetcher {
    fn fetch_family(&self, id: FamilyId) -> FetchFuture<'_, Family> {
        Box::pin(async move {
            let url = self.family_url(id);
            absent_on_error(&url, self.get_record::<Family>(&url).await).filter(|family| {
                let matches = family.id == id;
                if !matches {
                    warn!(requested = %id, received = %family.id, "family record id mismatch");
                }
                matches
            })
        })
    }

    fn fetch_person(&self, id: PersonId) -> FetchFuture<'_, Person> {
        Box::pin(async move {
            let url = self.person_url(id);
            absent_on_error(&url, self.get_record::<Person>(&url).await).filter(|person| {
                let matches = person.id == id;
                if !matches {
                    warn!(requested = %id, received = %person.id, "person record id mismatch");
                }
                matches
            })
        })
    }
}
