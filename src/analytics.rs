//! Crawl analytics: unique pages, per-subdomain counts, global term
//! frequencies, and the longest page seen so far.
//!
//! One mutex guards all counters; [`Analytics::record_page`] runs to
//! completion while holding it. Duplicate pages still count — the URL was
//! fetched — only their links go unfollowed.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

/// How many terms the report lists.
const TOP_TERM_COUNT: usize = 50;

#[derive(Debug, Clone)]
struct TermEntry {
    count: u64,
    /// Ties in the top-terms ranking break by first appearance.
    first_seen: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongestPage {
    pub url: String,
    pub word_count: usize,
}

struct AnalyticsState {
    unique_urls: HashSet<String>,
    subdomains: BTreeMap<String, u64>,
    terms: HashMap<String, TermEntry>,
    next_term_seq: u64,
    longest_page: Option<LongestPage>,
}

/// Immutable end-of-crawl snapshot.
#[derive(Debug, Clone)]
pub struct ReportSnapshot {
    pub unique_pages: usize,
    pub longest_page: Option<LongestPage>,
    /// Top terms by descending count, ties by first appearance.
    pub top_terms: Vec<(String, u64)>,
    /// Per-host page counts under the root domain, alphabetical.
    pub subdomains: Vec<(String, u64)>,
}

pub struct Analytics {
    root_domain: String,
    state: Mutex<AnalyticsState>,
}

impl Analytics {
    pub fn new(root_domain: &str) -> Self {
        Self {
            root_domain: root_domain.to_ascii_lowercase(),
            state: Mutex::new(AnalyticsState {
                unique_urls: HashSet::new(),
                subdomains: BTreeMap::new(),
                terms: HashMap::new(),
                next_term_seq: 0,
                longest_page: None,
            }),
        }
    }

    /// Fold one fetched page into the counters. `host` is the page's
    /// hostname as served; `tokens` the retained token sequence.
    pub fn record_page(&self, canonical_url: &str, host: &str, tokens: &[String]) {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;

        let newly_added = state.unique_urls.insert(canonical_url.to_string());
        if newly_added && self.under_root_domain(host) {
            *state.subdomains.entry(host.to_string()).or_insert(0) += 1;
        }

        for token in tokens {
            if let Some(entry) = state.terms.get_mut(token) {
                entry.count += 1;
                continue;
            }
            let first_seen = state.next_term_seq;
            state.next_term_seq += 1;
            state
                .terms
                .insert(token.clone(), TermEntry { count: 1, first_seen });
        }

        let word_count = tokens.len();
        let current_longest = state.longest_page.as_ref().map_or(0, |p| p.word_count);
        if word_count > current_longest {
            state.longest_page = Some(LongestPage {
                url: canonical_url.to_string(),
                word_count,
            });
        }
    }

    /// Number of distinct canonical URLs recorded so far.
    pub fn unique_pages(&self) -> usize {
        self.state.lock().unwrap().unique_urls.len()
    }

    pub fn snapshot(&self) -> ReportSnapshot {
        let state = self.state.lock().unwrap();

        let mut ranked: Vec<(&String, &TermEntry)> = state.terms.iter().collect();
        ranked.sort_by(|(_, a), (_, b)| {
            b.count.cmp(&a.count).then(a.first_seen.cmp(&b.first_seen))
        });
        let top_terms = ranked
            .into_iter()
            .take(TOP_TERM_COUNT)
            .map(|(term, entry)| (term.clone(), entry.count))
            .collect();

        ReportSnapshot {
            unique_pages: state.unique_urls.len(),
            longest_page: state.longest_page.clone(),
            top_terms,
            subdomains: state
                .subdomains
                .iter()
                .map(|(host, count)| (host.clone(), *count))
                .collect(),
        }
    }

    fn under_root_domain(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        host == self.root_domain || host.ends_with(&format!(".{}", self.root_domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn counts_unique_urls_once() {
        let analytics = Analytics::new("uci.edu");
        let page = tokens(&["systems", "research"]);
        analytics.record_page("http://ics.uci.edu/a", "ics.uci.edu", &page);
        analytics.record_page("http://ics.uci.edu/a", "ics.uci.edu", &page);
        analytics.record_page("http://ics.uci.edu/b", "ics.uci.edu", &page);

        let snap = analytics.snapshot();
        assert_eq!(snap.unique_pages, 2);
        assert_eq!(snap.subdomains, vec![("ics.uci.edu".to_string(), 2)]);
    }

    #[test]
    fn subdomain_counts_restricted_to_root() {
        let analytics = Analytics::new("uci.edu");
        analytics.record_page("http://vision.ics.uci.edu/", "vision.ics.uci.edu", &[]);
        analytics.record_page("http://example.com/", "example.com", &[]);
        analytics.record_page("http://notuci.edu/", "notuci.edu", &[]);

        let snap = analytics.snapshot();
        assert_eq!(snap.unique_pages, 3);
        assert_eq!(snap.subdomains, vec![("vision.ics.uci.edu".to_string(), 1)]);
    }

    #[test]
    fn subdomains_sorted_alphabetically() {
        let analytics = Analytics::new("uci.edu");
        analytics.record_page("http://stat.uci.edu/", "stat.uci.edu", &[]);
        analytics.record_page("http://cs.uci.edu/", "cs.uci.edu", &[]);
        analytics.record_page("http://ics.uci.edu/", "ics.uci.edu", &[]);

        let hosts: Vec<String> = analytics
            .snapshot()
            .subdomains
            .into_iter()
            .map(|(h, _)| h)
            .collect();
        assert_eq!(hosts, vec!["cs.uci.edu", "ics.uci.edu", "stat.uci.edu"]);
    }

    #[test]
    fn top_terms_rank_by_count_then_first_seen() {
        let analytics = Analytics::new("uci.edu");
        analytics.record_page(
            "http://ics.uci.edu/a",
            "ics.uci.edu",
            &tokens(&["zeta", "alpha", "zeta"]),
        );
        analytics.record_page(
            "http://ics.uci.edu/b",
            "ics.uci.edu",
            &tokens(&["beta", "alpha"]),
        );

        let snap = analytics.snapshot();
        // zeta: 2, alpha: 2 but zeta appeared first; beta: 1
        assert_eq!(
            snap.top_terms,
            vec![
                ("zeta".to_string(), 2),
                ("alpha".to_string(), 2),
                ("beta".to_string(), 1),
            ]
        );
    }

    #[test]
    fn longest_page_is_non_decreasing() {
        let analytics = Analytics::new("uci.edu");
        analytics.record_page("http://ics.uci.edu/long", "ics.uci.edu", &tokens(&["one", "two", "three"]));
        analytics.record_page("http://ics.uci.edu/short", "ics.uci.edu", &tokens(&["one"]));

        let longest = analytics.snapshot().longest_page.unwrap();
        assert_eq!(longest.url, "http://ics.uci.edu/long");
        assert_eq!(longest.word_count, 3);
    }

    #[test]
    fn empty_crawl_snapshot() {
        let snap = Analytics::new("uci.edu").snapshot();
        assert_eq!(snap.unique_pages, 0);
        assert!(snap.longest_page.is_none());
        assert!(snap.top_terms.is_empty());
        assert!(snap.subdomains.is_empty());
    }
}
