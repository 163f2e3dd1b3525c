//! The frontier: pending-URL queue, durable seen-set, and per-host
//! politeness scheduler.
//!
//! One mutex guards the queue, the record map, and the host schedule.
//! Politeness uses queueing semantics: a worker claiming a URL advances the
//! host's next-allowed time from `max(now, next_allowed)` before sleeping,
//! so concurrent workers targeting one host reserve consecutive slots and
//! drain at the configured delay regardless of thread scheduling.

pub mod store;

use std::collections::{HashMap, VecDeque};
use std::sync::{Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use url::Url;

use crate::config::CrawlConfig;
use crate::hashing::fnv1a_64_str;
use crate::urls::admission::AdmissionFilter;
use crate::urls::{canonicalize, host_key};
use store::{StoreError, UrlRecord, UrlStore};

/// How long an empty dequeue blocks before giving up.
const DEQUEUE_TIMEOUT: Duration = Duration::from_secs(1);

struct FrontierState {
    queue: VecDeque<String>,
    /// Mirror of the durable store: hash of canonical URL → latest record.
    records: HashMap<u64, UrlRecord>,
    /// Host key → earliest instant the next request may start.
    next_allowed: HashMap<String, Instant>,
}

pub struct Frontier {
    store: UrlStore,
    filter: AdmissionFilter,
    delay: Duration,
    state: Mutex<FrontierState>,
    available: Condvar,
}

impl Frontier {
    /// Open (or reset) the durable store and seed the queue.
    ///
    /// With `restart` the store is wiped and the seeds enqueued. Otherwise
    /// the journal is replayed and every not-done URL that still passes
    /// admission is re-enqueued; if that leaves the queue empty, the seeds
    /// are enqueued instead.
    pub fn new(
        config: &CrawlConfig,
        filter: AdmissionFilter,
        restart: bool,
    ) -> Result<Self, StoreError> {
        let store = UrlStore::new(&config.save_file);

        let records = if restart {
            log::info!("restart requested, wiping {}", config.save_file.display());
            store.wipe()?;
            HashMap::new()
        } else {
            match store.load() {
                Ok(records) => records,
                Err(e) => {
                    log::error!(
                        "could not replay {}: {e}; continuing with an empty store",
                        config.save_file.display()
                    );
                    HashMap::new()
                }
            }
        };

        let mut queue = VecDeque::new();
        for record in records.values() {
            if !record.done && filter.admits(&record.url) {
                queue.push_back(record.url.clone());
            }
        }
        if !queue.is_empty() {
            log::info!("resumed {} pending urls from the save file", queue.len());
        }

        let frontier = Self {
            store,
            filter,
            delay: config.politeness_delay(),
            state: Mutex::new(FrontierState {
                queue,
                records,
                next_allowed: HashMap::new(),
            }),
            available: Condvar::new(),
        };

        if frontier.pending() == 0 {
            for seed in &config.seed_urls {
                frontier.add_url(seed);
            }
        }
        Ok(frontier)
    }

    /// Admit a URL to the frontier. Canonicalizes first; a URL whose hash
    /// is already on record is ignored, so repeated calls are idempotent.
    pub fn add_url(&self, raw: &str) {
        let Some(url) = canonicalize(raw) else {
            return;
        };
        let hash = fnv1a_64_str(&url);

        let mut state = self.state.lock().unwrap();
        if state.records.contains_key(&hash) {
            return;
        }
        state.records.insert(
            hash,
            UrlRecord {
                url: url.clone(),
                done: false,
            },
        );
        if let Err(e) = self.store.append(hash, &url, false) {
            log::error!("could not journal {url}: {e}");
        }
        state.queue.push_back(url);
        drop(state);
        self.available.notify_one();
    }

    /// Dequeue the next URL, FIFO. Blocks up to one second when the queue
    /// is empty, then returns `None`. Before returning a URL, reserves the
    /// host's next politeness slot and sleeps until it opens.
    pub fn next_url(&self) -> Option<String> {
        let deadline = Instant::now() + DEQUEUE_TIMEOUT;
        let mut state = self.state.lock().unwrap();
        while state.queue.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let (guard, _) = self.available.wait_timeout(state, remaining).unwrap();
            state = guard;
        }
        let url = state.queue.pop_front()?;
        let wait = Self::reserve_slot(&mut state, &url, self.delay);
        drop(state);

        if !wait.is_zero() {
            log::debug!("politeness: sleeping {}ms before {url}", wait.as_millis());
            thread::sleep(wait);
        }
        Some(url)
    }

    /// Record that a dequeued URL finished processing. Must be called
    /// exactly once per successful dequeue.
    pub fn mark_complete(&self, url: &str) {
        let canonical = canonicalize(url).unwrap_or_else(|| url.to_string());
        let hash = fnv1a_64_str(&canonical);

        let mut state = self.state.lock().unwrap();
        match state.records.get_mut(&hash) {
            Some(record) => record.done = true,
            None => log::warn!("mark_complete for unknown url {canonical}"),
        }
        if let Err(e) = self.store.append(hash, &canonical, true) {
            log::error!("could not journal completion of {canonical}: {e}");
        }
    }

    /// URLs waiting in the queue.
    pub fn pending(&self) -> usize {
        self.state.lock().unwrap().queue.len()
    }

    /// URLs ever recorded (pending or done).
    pub fn record_count(&self) -> usize {
        self.state.lock().unwrap().records.len()
    }

    /// Compute this request's wait and push the host's next-allowed time
    /// forward by the delay. Runs under the frontier lock; the sleep itself
    /// happens outside it.
    fn reserve_slot(state: &mut FrontierState, url: &str, delay: Duration) -> Duration {
        let host = match Url::parse(url) {
            Ok(u) => host_key(&u),
            Err(_) => String::new(),
        };
        let now = Instant::now();
        let next_allowed = state.next_allowed.get(&host).copied().unwrap_or(now);
        let wait = next_allowed.saturating_duration_since(now);
        let base = if next_allowed > now { next_allowed } else { now };
        state.next_allowed.insert(host, base + delay);
        wait
    }
}
