use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;
use url::Url;

use footfall_core::session::SessionContext;

/// One-shot country lookup against a geolocation collaborator.
#[async_trait]
pub trait GeoLookup: Send + Sync + 'static {
    /// The caller's two-letter country code, `None` when unknown.
    async fn lookup(&self) -> Result<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct GeoReply {
    #[serde(default)]
    country_code: Option<String>,
}

/// `GeoLookup` against an ipapi-style JSON endpoint.
pub struct HttpGeoLookup {
    http: reqwest::Client,
    url: Url,
}

impl HttpGeoLookup {
    pub fn new(url: &str) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(3))
                .timeout(Duration::from_secs(5))
                .build()?,
            url: Url::parse(url)?,
        })
    }
}

#[async_trait]
impl GeoLookup for HttpGeoLookup {
    async fn lookup(&self) -> Result<Option<String>> {
        let reply: GeoReply = self
            .http
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(reply.country_code.as_deref().and_then(normalize_country_code))
    }
}

/// Trim, uppercase, and validate a provider-supplied country code.
///
/// Anything that is not exactly two ASCII letters reads as unknown, so the
/// `country:<CC>` key namespace never picks up malformed members.
fn normalize_country_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(trimmed.to_ascii_uppercase())
    } else {
        None
    }
}

/// Session-cached country resolution.
///
/// Successes are cached in the session context for its lifetime; failures
/// are not, so the next call within the same session retries the lookup.
pub struct GeoResolver {
    lookup: Arc<dyn GeoLookup>,
}

impl GeoResolver {
    pub fn new(lookup: Arc<dyn GeoLookup>) -> Self {
        Self { lookup }
    }

    pub async fn resolve(&self, session: &mut SessionContext) -> Option<String> {
        if let Some(code) = session.cached_country() {
            return Some(code.to_string());
        }
        match self.lookup.lookup().await {
            Ok(Some(code)) => {
                session.cache_country(&code);
                Some(code)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "country lookup failed");
                None
            }
        }
    }
}
