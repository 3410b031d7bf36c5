use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use tracing::info;

use crate::parser;
use crate::store::TitleMap;

const SEARCH_URL: &str = "https://adp.acb.org/adp-search";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Outcome of fetching one listing page, consumed by the pagination driver.
#[derive(Debug)]
pub enum PageOutcome {
    /// Results table found; ids extracted on this page.
    Listing(TitleMap),
    /// Page rendered without the results table: pagination ran past the end.
    NoMoreData,
    /// Non-2xx response; the driver counts these against its retry budget.
    TransportError { status: StatusCode },
}

/// Shared HTTP client for the whole run.
pub fn http_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to build HTTP client")
}

/// Fetch and extract one catalog listing page. Network-level failures
/// (connect, read, timeout) propagate as errors; HTTP status failures are
/// reported as `TransportError` for the driver to branch on.
pub async fn fetch_listing_page(client: &Client, page: u32) -> Result<PageOutcome> {
    let url = page_url(page);
    info!("Scraping {}", url);

    let response = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Request failed for {}", url))?;

    let status = response.status();
    if !status.is_success() {
        return Ok(PageOutcome::TransportError { status });
    }

    let body = response
        .text()
        .await
        .with_context(|| format!("Failed to read body of {}", url))?;

    match parser::extract_listing(&body) {
        Some(titles) => Ok(PageOutcome::Listing(titles)),
        None => Ok(PageOutcome::NoMoreData),
    }
}

fn page_url(page: u32) -> String {
    format!("{}?page={}&order=field_release_year&sort=desc", SEARCH_URL, page)
}

// ── Tests ──
