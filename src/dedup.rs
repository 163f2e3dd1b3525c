//! Online duplicate detection: an exact-fingerprint set plus a banded
//! SimHash index for near-duplicate matching.
//!
//! The 64-bit SimHash is split into 4 bands of 16 bits. Any pair of
//! fingerprints within Hamming distance 3 shares at least one band value
//! (pigeonhole), so the band index yields a small candidate list instead of
//! a scan over every stored fingerprint; the match threshold of 4 admits
//! one extra bit of slack.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::hashing::{fnv1a_64_str, hamming_distance};

/// Exact fingerprints hash the space-joined first 5 000 retained tokens;
/// the cap bounds hashing cost on huge pages.
const EXACT_FINGERPRINT_TOKEN_CAP: usize = 5_000;

const SIMHASH_BANDS: u32 = 4;
const BAND_BITS: u32 = 16;

/// Candidates within this Hamming distance are near-duplicates.
const NEAR_DUPLICATE_THRESHOLD: u32 = 4;

/// Detector counters, shared across threads.
#[derive(Debug, Clone)]
pub struct DedupStats {
    /// Pages run through the admission protocol
    pub pages_checked: Arc<AtomicUsize>,
    /// Pages whose exact fingerprint was already known
    pub exact_duplicates: Arc<AtomicUsize>,
    /// Pages within Hamming threshold of an indexed fingerprint
    pub near_duplicates: Arc<AtomicUsize>,
}

impl DedupStats {
    pub fn new() -> Self {
        Self {
            pages_checked: Arc::new(AtomicUsize::new(0)),
            exact_duplicates: Arc::new(AtomicUsize::new(0)),
            near_duplicates: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn record_check(&self) {
        self.pages_checked.fetch_add(1, Ordering::Relaxed);
    }

    fn record_exact(&self) {
        self.exact_duplicates.fetch_add(1, Ordering::Relaxed);
    }

    fn record_near(&self) {
        self.near_duplicates.fetch_add(1, Ordering::Relaxed);
    }

    /// Total pages classified as duplicates of something already ingested.
    pub fn duplicates(&self) -> usize {
        self.exact_duplicates.load(Ordering::Relaxed) + self.near_duplicates.load(Ordering::Relaxed)
    }
}

impl Default for DedupStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of the admission protocol for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Content not seen before; links should be followed.
    Fresh,
    /// Exact fingerprint already in the set.
    ExactDuplicate,
    /// Within Hamming threshold of an indexed SimHash.
    NearDuplicate,
}

impl Verdict {
    pub fn should_scrape(&self) -> bool {
        matches!(self, Verdict::Fresh)
    }
}

/// Exact fingerprint of a token stream: FNV-1a over the space-joined first
/// 5 000 tokens. Pages sharing that prefix collide and are treated as
/// identical.
pub fn exact_fingerprint(tokens: &[String]) -> u64 {
    let cap = tokens.len().min(EXACT_FINGERPRINT_TOKEN_CAP);
    fnv1a_64_str(&tokens[..cap].join(" "))
}

/// Weighted 64-bit SimHash of a token stream. Bit `i` is set iff the
/// frequency-weighted accumulator for that bit is strictly positive; an
/// empty stream hashes to 0.
pub fn simhash(tokens: &[String]) -> u64 {
    let mut frequencies: HashMap<&str, i64> = HashMap::new();
    for token in tokens {
        *frequencies.entry(token.as_str()).or_default() += 1;
    }

    let mut v = [0i64; 64];
    for (token, weight) in frequencies {
        let h = fnv1a_64_str(token);
        for (i, slot) in v.iter_mut().enumerate() {
            if (h >> i) & 1 == 1 {
                *slot += weight;
            } else {
                *slot -= weight;
            }
        }
    }

    let mut fingerprint = 0u64;
    for (i, &slot) in v.iter().enumerate() {
        if slot > 0 {
            fingerprint |= 1 << i;
        }
    }
    fingerprint
}

fn band_value(fingerprint: u64, band: u32) -> u16 {
    ((fingerprint >> (band * BAND_BITS)) & 0xffff) as u16
}

struct DetectorState {
    exact: HashSet<u64>,
    /// SimHash fingerprints in admission order; band index entries point
    /// into this list.
    fingerprints: Vec<u64>,
    bands: HashMap<(u32, u16), Vec<usize>>,
}

/// The duplicate detector. All state lives behind one mutex; the admission
/// protocol runs to completion while holding it, so two identical pages
/// processed concurrently resolve to exactly one admission.
pub struct DuplicateDetector {
    state: Mutex<DetectorState>,
    pub stats: DedupStats,
}

impl DuplicateDetector {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DetectorState {
                exact: HashSet::new(),
                fingerprints: Vec::new(),
                bands: HashMap::new(),
            }),
            stats: DedupStats::new(),
        }
    }

    /// Run the admission protocol for a page's fingerprints, atomically:
    /// exact check-and-insert, then banded near-duplicate query, then
    /// indexing if the page is fresh.
    pub fn admit(&self, exact: u64, simhash: u64) -> Verdict {
        self.stats.record_check();
        let mut state = self.state.lock().unwrap();

        if !state.exact.insert(exact) {
            self.stats.record_exact();
            return Verdict::ExactDuplicate;
        }

        if self.find_near_duplicate(&state, simhash).is_some() {
            self.stats.record_near();
            return Verdict::NearDuplicate;
        }

        let index = state.fingerprints.len();
        state.fingerprints.push(simhash);
        for band in 0..SIMHASH_BANDS {
            state
                .bands
                .entry((band, band_value(simhash, band)))
                .or_default()
                .push(index);
        }
        Verdict::Fresh
    }

    /// Number of distinct fingerprints admitted so far.
    pub fn indexed_len(&self) -> usize {
        self.state.lock().unwrap().fingerprints.len()
    }

    fn find_near_duplicate(&self, state: &DetectorState, simhash: u64) -> Option<usize> {
        let mut candidates_seen = HashSet::new();
        for band in 0..SIMHASH_BANDS {
            let Some(positions) = state.bands.get(&(band, band_value(simhash, band))) else {
                continue;
            };
            for &index in positions {
                if !candidates_seen.insert(index) {
                    continue;
                }
                if hamming_distance(state.fingerprints[index], simhash) <= NEAR_DUPLICATE_THRESHOLD
                {
                    return Some(index);
                }
            }
        }
        None
    }
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn empty_stream_fingerprints() {
        assert_eq!(simhash(&[]), 0);
        assert_eq!(exact_fingerprint(&[]), fnv1a_64_str(""));
    }

    #[test]
    fn token_free_pages_collide_exactly() {
        // Markup-only pages all share SimHash 0 and the empty-string
        // exact fingerprint: the first admits, the rest are duplicates.
        let detector = DuplicateDetector::new();
        let (e, s) = (exact_fingerprint(&[]), simhash(&[]));
        assert_eq!(detector.admit(e, s), Verdict::Fresh);
        assert_eq!(detector.admit(e, s), Verdict::ExactDuplicate);
    }

    #[test]
    fn simhash_ignores_order_but_not_frequency() {
        let a = tokens(&["alpha", "beta", "gamma"]);
        let b = tokens(&["gamma", "alpha", "beta"]);
        assert_eq!(simhash(&a), simhash(&b));
    }

    #[test]
    fn exact_fingerprint_caps_at_five_thousand_tokens() {
        let base: Vec<String> = (0..5_000).map(|i| format!("tok{i}")).collect();
        let mut extended = base.clone();
        extended.push("extra".to_string());
        assert_eq!(exact_fingerprint(&base), exact_fingerprint(&extended));
    }

    #[test]
    fn exact_duplicate_detected() {
        let detector = DuplicateDetector::new();
        let page = tokens(&["irvine", "research", "faculty"]);
        let (e, s) = (exact_fingerprint(&page), simhash(&page));
        assert_eq!(detector.admit(e, s), Verdict::Fresh);
        assert_eq!(detector.admit(e, s), Verdict::ExactDuplicate);
        assert_eq!(detector.stats.duplicates(), 1);
        assert_eq!(detector.indexed_len(), 1);
    }

    #[test]
    fn near_duplicate_detected_and_not_indexed() {
        // Three distinct tokens repeated ten times give every SimHash bit a
        // margin of at least 10, so a three-word footer of weight 1 cannot
        // flip any bit: the SimHashes are identical while the exact
        // fingerprints differ.
        let mut page_a = Vec::new();
        for _ in 0..10 {
            page_a.extend(tokens(&["alpha", "beta", "gamma"]));
        }
        let mut page_b = page_a.clone();
        page_b.extend(tokens(&["delta", "epsilon", "zeta"]));

        let detector = DuplicateDetector::new();
        assert_eq!(
            detector.admit(exact_fingerprint(&page_a), simhash(&page_a)),
            Verdict::Fresh
        );
        assert_eq!(
            detector.admit(exact_fingerprint(&page_b), simhash(&page_b)),
            Verdict::NearDuplicate
        );
        assert_eq!(detector.indexed_len(), 1);
        assert_eq!(detector.stats.near_duplicates.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn distant_pages_both_admitted() {
        let detector = DuplicateDetector::new();
        let a = tokens(&["machine", "learning", "systems"]);
        let b = tokens(&["theory", "algorithms", "complexity", "proofs"]);
        assert_eq!(detector.admit(exact_fingerprint(&a), simhash(&a)), Verdict::Fresh);
        let verdict = detector.admit(exact_fingerprint(&b), simhash(&b));
        // The verdict must agree with the actual Hamming distance: beyond
        // the threshold the page is fresh; within 3 bits the band index is
        // guaranteed to surface it.
        let d = hamming_distance(simhash(&a), simhash(&b));
        if d > NEAR_DUPLICATE_THRESHOLD {
            assert_eq!(verdict, Verdict::Fresh);
            assert_eq!(detector.indexed_len(), 2);
        } else if d <= 3 {
            assert_eq!(verdict, Verdict::NearDuplicate);
            assert_eq!(detector.indexed_len(), 1);
        }
    }

    #[test]
    fn band_pigeonhole_holds_for_close_fingerprints() {
        // Flip up to 3 bits of a fingerprint: at least one 16-bit band
        // must be untouched.
        let base = 0xDEAD_BEEF_CAFE_F00Du64;
        for flips in [
            vec![0], vec![0, 17], vec![0, 17, 33], vec![5, 6, 7], vec![63, 62, 61],
        ] {
            let mut other = base;
            for bit in flips {
                other ^= 1u64 << bit;
            }
            assert!(hamming_distance(base, other) <= 3);
            let shared = (0..SIMHASH_BANDS)
                .any(|band| band_value(base, band) == band_value(other, band));
            assert!(shared);
        }
    }

    #[test]
    fn concurrent_identical_pages_admit_once() {
        use std::sync::Arc;

        let detector = Arc::new(DuplicateDetector::new());
        let page = tokens(&["parallel", "workers", "content"]);
        let (e, s) = (exact_fingerprint(&page), simhash(&page));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let detector = Arc::clone(&detector);
            handles.push(std::thread::spawn(move || detector.admit(e, s)));
        }
        let fresh = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Verdict::should_scrape)
            .count();
        assert_eq!(fresh, 1);
        assert_eq!(detector.stats.duplicates(), 7);
    }
}
