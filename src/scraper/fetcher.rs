use std::time::Duration;

use rand::seq::IndexedRandom;
use reqwest::Client;

use crate::config::AppConfig;
use crate::model::ScraperError;
use crate::scraper::traits::PageFetcher;

/// Query parameter selecting the listing variant sorted by total price with
/// shipping included. Same listing markup; only the ordering and the price
/// block class differ.
const SHIPPING_INCLUDED_SORT: &str = "sort=prezzo_totale";

pub struct TrovaScraper {
    client: Client,
}

impl TrovaScraper {
    /// Builds the HTTP client with a user agent picked from the configured
    /// pool and the configured request timeout.
    pub fn new(config: &AppConfig) -> Result<Self, ScraperError> {
        let user_agent = config
            .user_agents
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_else(|| format!("tpscanner/{}", env!("CARGO_PKG_VERSION")));
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;
        Ok(Self { client })
    }

    fn shipping_included_url(url: &str) -> String {
        if url.contains('?') {
            format!("{url}&{SHIPPING_INCLUDED_SORT}")
        } else {
            format!("{url}?{SHIPPING_INCLUDED_SORT}")
        }
    }

    /// Downloads both listing variants for a product page: the default
    /// ordering and the total-price-with-shipping ordering.
    pub async fn download_listing_pair(
        &self,
        url: &str,
    ) -> Result<(String, String), ScraperError> {
        let listing = self.fetch(url).await?;
        let shipping_included = self.fetch(&Self::shipping_included_url(url)).await?;
        Ok((listing, shipping_included))
    }
}

#[async_trait::async_trait]
impl PageFetcher for TrovaScraper {
    async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ScraperError::Status(response.status()));
        }
        Ok(response.text().await?)
    }
}
