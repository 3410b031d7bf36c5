use anyhow::Result;
use reqwest::Client;
use tracing::{info, warn};

use crate::fetch::{self, PageOutcome};
use crate::store::TitleMap;

const MAX_CONSECUTIVE_ERRORS: u32 = 3;

/// Pagination state: walks the listing page by page, merging each page's
/// titles into the accumulator until the catalog runs out or the transport
/// error budget is exhausted.
pub struct Driver {
    current_page: u32,
    consecutive_errors: u32,
    titles: TitleMap,
}

enum Flow {
    NextPage,
    RetryPage,
    Finished,
}

impl Driver {
    pub fn new(start_page: u32) -> Self {
        Self {
            current_page: start_page,
            consecutive_errors: 0,
            titles: TitleMap::new(),
        }
    }

    /// Fetch until the no-more-data signal, the error budget runs out, or
    /// `limit` pages have been merged. Returns the accumulated titles.
    pub async fn run(mut self, client: &Client, limit: Option<u32>) -> Result<TitleMap> {
        let mut pages_merged = 0u32;
        loop {
            if limit.is_some_and(|n| pages_merged >= n) {
                info!("Page limit reached after {} page(s)", pages_merged);
                break;
            }
            let outcome = fetch::fetch_listing_page(client, self.current_page).await?;
            match self.apply(outcome) {
                Flow::NextPage => pages_merged += 1,
                Flow::RetryPage => {}
                Flow::Finished => break,
            }
        }
        Ok(self.titles)
    }

    /// Apply one page outcome to the driver state. Pure state transition,
    /// no I/O.
    fn apply(&mut self, outcome: PageOutcome) -> Flow {
        match outcome {
            PageOutcome::Listing(page_titles) => {
                // Newest page wins on id collision
                self.titles.extend(page_titles);
                self.consecutive_errors = 0;
                self.current_page += 1;
                Flow::NextPage
            }
            PageOutcome::NoMoreData => {
                info!("Reached end of database at page {}", self.current_page);
                Flow::Finished
            }
            PageOutcome::TransportError { status } => {
                self.consecutive_errors += 1;
                if self.consecutive_errors > MAX_CONSECUTIVE_ERRORS {
                    warn!(
                        "Giving up on page {} after {} successive HTTP errors (last: {})",
                        self.current_page, self.consecutive_errors, status
                    );
                    Flow::Finished
                } else {
                    warn!(
                        "HTTP {} on page {}, retrying ({}/{})",
                        status, self.current_page, self.consecutive_errors, MAX_CONSECUTIVE_ERRORS
                    );
                    Flow::RetryPage
                }
            }
        }
    }
}

// ── Tests ──
