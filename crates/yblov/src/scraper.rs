use std::time::Duration;

use reqwest::Client;

use crate::parser::{self, ParseError};
use crate::types::{MunicipalityRef, MunicipalityResults};

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
    #[error("No municipality links found on {0}")]
    NoMunicipalities(String),
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    base_url: String,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
        Self::with_base_url(crate::BASE_URL)
    }

    /// Points the same extraction logic at a different site root, e.g. a
    /// local fixture server in tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetches the index page and lists every municipality it links to.
    /// An index page without a single qualifying row is fatal: the page
    /// layout does not match expectations.
    pub async fn fetch_municipalities(
        &self,
        index_url: &str,
    ) -> Result<Vec<MunicipalityRef>, ScraperError> {
        let html = self.get_html(index_url).await?;
        let municipalities = parser::parse_municipality_list(&html, &self.base_url);
        if municipalities.is_empty() {
            return Err(ScraperError::NoMunicipalities(index_url.to_string()));
        }
        log::debug!("Parsed {} municipality links", municipalities.len());
        Ok(municipalities)
    }

    /// Fetches one detail page and extracts its summary counts and party
    /// votes.
    pub async fn fetch_municipality_results(
        &self,
        detail_url: &str,
    ) -> Result<MunicipalityResults, ScraperError> {
        let html = self.get_html(detail_url).await?;
        let summary = parser::parse_summary(&html)?;
        let votes = parser::parse_party_votes(&html);
        Ok(MunicipalityResults { summary, votes })
    }

    async fn get_html(&self, url: &str) -> Result<String, ScraperError> {
        Ok(self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error for {url}: {e:?}"))?
            .error_for_status()?
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error for {url}: {e:?}"))?)
    }
}
