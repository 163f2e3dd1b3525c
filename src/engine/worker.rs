//! The worker loop: dequeue, fetch, tokenize, dedup verdict, analytics,
//! link extraction, completion.
//!
//! Nothing a page does can take a worker down. Fetch failures and pipeline
//! surprises are logged and the URL is still marked complete, so the
//! frontier's record status stays monotonic.

use std::sync::Arc;

use url::Url;

use crate::analytics::Analytics;
use crate::dedup::{self, DuplicateDetector};
use crate::frontier::Frontier;
use crate::net::fetch::Fetcher;
use crate::page::{links, text, tokens};
use crate::urls::admission::AdmissionFilter;
use crate::urls::hostname;

pub struct Worker {
    id: usize,
    frontier: Arc<Frontier>,
    detector: Arc<DuplicateDetector>,
    analytics: Arc<Analytics>,
    fetcher: Arc<dyn Fetcher>,
    filter: AdmissionFilter,
}

impl Worker {
    pub fn new(
        id: usize,
        frontier: Arc<Frontier>,
        detector: Arc<DuplicateDetector>,
        analytics: Arc<Analytics>,
        fetcher: Arc<dyn Fetcher>,
        filter: AdmissionFilter,
    ) -> Self {
        Self {
            id,
            frontier,
            detector,
            analytics,
            fetcher,
            filter,
        }
    }

    pub fn run(&self) {
        while let Some(url) = self.frontier.next_url() {
            self.process(&url);
            self.frontier.mark_complete(&url);
        }
        log::info!("worker {}: frontier is empty, stopping", self.id);
    }

    fn process(&self, url: &str) {
        let response = match self.fetcher.fetch(url) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("worker {}: fetch failed for {url}: {e}", self.id);
                return;
            }
        };
        log::info!(
            "worker {}: downloaded {url}, status <{}>",
            self.id,
            response.status
        );

        if response.status != 200 || response.body.is_empty() {
            return;
        }

        let html = String::from_utf8_lossy(&response.body);
        let page_text = text::visible_text(&html);
        let page_tokens = tokens::tokenize(&page_text);

        let verdict = self.detector.admit(
            dedup::exact_fingerprint(&page_tokens),
            dedup::simhash(&page_tokens),
        );

        // The page was fetched, so it counts even when its content is a
        // duplicate; only link extraction is gated on the verdict.
        let host = Url::parse(url).map(|u| hostname(&u)).unwrap_or_default();
        self.analytics.record_page(url, &host, &page_tokens);

        if !verdict.should_scrape() {
            log::info!(
                "worker {}: duplicate content at {url} ({verdict:?}), links skipped",
                self.id
            );
            return;
        }

        let base = if response.url.is_empty() {
            url
        } else {
            response.url.as_str()
        };
        let mut admitted = 0usize;
        let extracted = links::extract_links(&html, base);
        let found = extracted.len();
        for link in extracted {
            if self.filter.admits(&link) {
                self.frontier.add_url(&link);
                admitted += 1;
            }
        }
        log::info!(
            "worker {}: scraped {found} urls from {url}, {admitted} admitted",
            self.id
        );
    }
}
