//! The crawl engine: Frontier → workers → report.
//!
//! Owns the three shared components (frontier, duplicate detector,
//! analytics) and the fetcher seam, spawns the worker pool, and renders the
//! final report once every worker has drained the frontier.

pub mod worker;

use std::io;
use std::sync::Arc;
use std::thread;

use crate::analytics::Analytics;
use crate::config::CrawlConfig;
use crate::dedup::DuplicateDetector;
use crate::frontier::Frontier;
use crate::net::fetch::Fetcher;
use crate::report;
use crate::urls::admission::AdmissionFilter;
use worker::Worker;

/// Error during engine startup.
pub struct EngineError {
    pub message: String,
    pub phase: &'static str,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.phase, self.message)
    }
}

pub struct CrawlEngine {
    config: CrawlConfig,
    filter: AdmissionFilter,
    frontier: Arc<Frontier>,
    detector: Arc<DuplicateDetector>,
    analytics: Arc<Analytics>,
    fetcher: Arc<dyn Fetcher>,
}

impl CrawlEngine {
    /// Validate the config and bring up the shared components. The only
    /// fatal errors the crawler has live here.
    pub fn new(
        config: CrawlConfig,
        fetcher: Arc<dyn Fetcher>,
        restart: bool,
    ) -> Result<Self, EngineError> {
        config.validate().map_err(|e| EngineError {
            message: e.message,
            phase: "config",
        })?;

        let filter = AdmissionFilter::new(&config.allowed_domains);
        let frontier = Frontier::new(&config, filter.clone(), restart).map_err(|e| EngineError {
            message: e.message,
            phase: "frontier",
        })?;

        let analytics = Arc::new(Analytics::new(&config.root_domain));
        Ok(Self {
            filter,
            frontier: Arc::new(frontier),
            detector: Arc::new(DuplicateDetector::new()),
            analytics,
            fetcher,
            config,
        })
    }

    /// Run the crawl to completion: spawn the worker pool and join it.
    /// Workers exit on their own once the frontier stays empty.
    pub fn run(&self) {
        log::info!(
            "starting crawl with {} workers, {} urls pending",
            self.config.worker_count,
            self.frontier.pending()
        );

        thread::scope(|scope| {
            for id in 0..self.config.worker_count {
                let worker = Worker::new(
                    id,
                    Arc::clone(&self.frontier),
                    Arc::clone(&self.detector),
                    Arc::clone(&self.analytics),
                    Arc::clone(&self.fetcher),
                    self.filter.clone(),
                );
                scope.spawn(move || worker.run());
            }
        });

        log::info!(
            "crawl finished: {} unique pages, {} duplicates",
            self.analytics.unique_pages(),
            self.detector.stats.duplicates()
        );
    }

    /// Write the final report from the analytics snapshot and the
    /// detector's duplicate count.
    pub fn write_report(&self) -> io::Result<()> {
        report::write_report(
            &self.config.report_file,
            &self.analytics.snapshot(),
            self.detector.stats.duplicates(),
            &self.config.root_domain,
        )
    }

    pub fn analytics(&self) -> &Analytics {
        &self.analytics
    }

    pub fn detector(&self) -> &DuplicateDetector {
        &self.detector
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }
}
