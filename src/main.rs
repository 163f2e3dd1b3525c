use std::path::Path;
use std::sync::Arc;

use anteater_crawler::config::CrawlConfig;
use anteater_crawler::engine::CrawlEngine;
use anteater_crawler::net::fetch::HttpFetcher;

fn main() {
    env_logger::init();

    let mut restart = false;
    let mut config_path: Option<String> = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--restart" => restart = true,
            other => config_path = Some(other.to_string()),
        }
    }

    let config = match config_path {
        Some(path) => CrawlConfig::load(Path::new(&path))
            .unwrap_or_else(|e| panic!("Failed to load config: {e}")),
        None => CrawlConfig::default(),
    };

    let fetcher = HttpFetcher::new(&config.user_agent, config.cache_server.clone())
        .expect("Failed to build HTTP client");

    let engine = CrawlEngine::new(config, Arc::new(fetcher), restart)
        .unwrap_or_else(|e| panic!("Failed to start crawler: {e}"));

    engine.run();
    engine.write_report().expect("Failed to write report");
}
