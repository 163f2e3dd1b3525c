//! URL admission filter — the crawler's trap avoidance engine.
//!
//! Decides, URL by URL, whether a link is worth fetching: domain whitelist,
//! static-asset extension blocklist, path-shape traps (calendars, repeated
//! segments, code-browser trees), and query-parameter traps (session ids,
//! cache busters, unbounded pagination, sort-order combinatorics).
//!
//! All rules are independent; any parse failure rejects.

use url::Url;

use super::hostname;

/// Path extensions that never lead to crawlable HTML.
const BLOCKED_EXTENSIONS: &[&str] = &[
    // Assets & media
    ".css", ".js", ".mjs", ".map", ".wasm",
    ".bmp", ".gif", ".jpg", ".jpeg", ".png", ".tiff", ".tif", ".ico", ".svg", ".webp",
    ".psd", ".ai", ".eps", ".heic", ".heif", ".avif", ".jp2",
    ".mp2", ".mp3", ".m4a", ".aac", ".flac", ".wav", ".wma", ".aiff", ".au",
    ".mp4", ".m4v", ".mov", ".avi", ".mkv", ".flv", ".wmv", ".webm", ".mpeg", ".mpg",
    ".ogv", ".ogg", ".m3u8", ".ts", ".srt", ".vtt",
    // Documents & fonts
    ".pdf", ".ps", ".tex", ".djvu",
    ".ppt", ".pptx", ".pptm", ".pps", ".ppsx", ".ppsm", ".pot", ".potx", ".potm",
    ".doc", ".docx", ".docm", ".xls", ".xlsx", ".xlsm", ".odt", ".ods", ".odp",
    ".rtf", ".txt", ".epub", ".mobi", ".azw", ".azw3",
    ".woff", ".woff2", ".ttf", ".eot", ".otf",
    // Data, logs, archives, executables
    ".xml", ".json", ".jsonl", ".ndjson", ".yaml", ".yml", ".toml",
    ".sql", ".db", ".sqlite", ".sqlite3", ".csv", ".tsv",
    ".log", ".dat", ".bak", ".tmp", ".swp", ".old", ".dmp", ".dump",
    ".zip", ".rar", ".7z", ".tar", ".tgz", ".tar.gz", ".tar.bz2", ".tar.xz", ".tar.zst",
    ".gz", ".bz2", ".xz", ".zst", ".lz4", ".iso", ".img",
    ".exe", ".msi", ".bin", ".dll", ".so", ".dylib", ".deb", ".rpm", ".apk", ".dmg", ".pkg", ".cab",
    ".jar", ".war", ".ear", ".class",
    // Source code & configs
    ".c", ".cc", ".cpp", ".cxx", ".h", ".hpp",
    ".java", ".py", ".ipynb",
    ".sh", ".bash", ".zsh", ".ps1", ".bat", ".cmd",
    ".go", ".rs", ".rb", ".php", ".pl", ".swift", ".kt",
    ".m", ".mat", ".r",
    ".ini", ".cfg", ".conf", ".cnf", ".env", ".pem", ".crt", ".cer", ".key",
    // Traps & feeds
    ".ics", ".rss", ".atom", ".arff", ".diff", ".patch",
];

/// Path segments that mark crawler traps or low-value auto-generated pages,
/// matched as `/hint/` infix or trailing `/hint`.
const TRAP_PATH_HINTS: &[&str] = &[
    "wp-json", "wp-admin", "wp-includes", "wp-content",
    "feed", "rss", "atom", "cgi-bin",
    "login", "logout", "signin", "signout",
    "admin", "api", "graphql",
    "search", "tag", "tags", "category", "categories",
    "archive", "archives", "author", "authors",
    "uploads", "assets", "static", "media",
    // Code-browser traps (GitLab, cgit and friends)
    "tree", "blob", "commit", "commits", "compare", "network", "graph",
    // Infinite calendars
    "calendar", "events", "agenda", "schedule", "bitstream", "retrieve",
    // Auto-generated docs and monitoring dashboards
    "mailman", "pipermail", "javadoc", "doxygen", "epydoc", "apidocs",
    "ganglia", "nagios", "mrtg",
];

/// Query parameter names that always reject: calendar/date selectors,
/// low-info page modes, tracking and session ids, cache busters, auth
/// tokens, and site-specific tabs.
const HARD_BLOCK_QUERY_KEYS: &[&str] = &[
    // Calendar / date traps
    "day", "month", "year", "date", "time",
    "tribe_bar_date", "tribe_event_display", "eventdate", "start_date", "end_date", "ical",
    // Functional / low-info pages
    "print", "printable", "download", "attachment", "preview",
    "fullscreen", "mobile", "view_mode",
    "diff", "oldid", "action", "mode",
    // Tracking & session
    "replytocom", "share", "shared", "share_id",
    "utm_source", "utm_medium", "utm_campaign", "utm_term", "utm_content",
    "gclid", "dclid", "gbraid", "wbraid", "fbclid", "msclkid", "mc_cid", "mc_eid", "igshid", "yclid",
    "ref", "ref_", "referrer", "source", "src", "campaign", "adid",
    "session", "sid", "phpsessid", "jsessionid", "state",
    // Cache-bust & auth
    "_", "_t", "cb", "cachebust", "nocache", "timestamp", "ts", "rnd", "random",
    "v", "ver", "version", "hash",
    "token", "access_token", "auth", "oauth", "apikey", "key", "signature", "sig", "expires",
    "samlrequest", "samlresponse",
    // Site-specific & sort
    "do", "rev", "image", "tab_files", "tab_details",
    "sort", "order",
];

/// Parameters whose co-occurrence signals sort/filter combinatorics.
const COMBINATORIAL_QUERY_KEYS: &[&str] =
    &["sort", "order", "filter", "facet", "action", "view", "layout"];

/// Page-number parameters, bounded at [`MAX_PAGE_NUMBER`].
const PAGE_NUMBER_KEYS: &[&str] = &["page", "p", "pg", "paged"];

/// Row-offset parameters, bounded at [`MAX_START_OFFSET`].
const OFFSET_KEYS: &[&str] = &["start", "offset", "limit", "per_page"];

const MAX_PAGE_NUMBER: i64 = 20;
const MAX_START_OFFSET: i64 = 500;

const MAX_URL_LEN: usize = 300;
const MAX_PATH_DEPTH: usize = 10;
const MAX_SEGMENT_OCCURRENCES: usize = 6;
const MAX_QUERY_PARAMS: usize = 4;

/// The admission filter. Holds the registered-domain whitelist; every other
/// rule is a compiled-in constant table.
#[derive(Debug, Clone)]
pub struct AdmissionFilter {
    allowed_domains: Vec<String>,
}

impl AdmissionFilter {
    pub fn new(allowed_domains: &[String]) -> Self {
        Self {
            allowed_domains: allowed_domains
                .iter()
                .map(|d| d.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Accept or reject a fully-qualified URL. Deterministic, and any
    /// parsing failure rejects.
    pub fn admits(&self, raw: &str) -> bool {
        let mut url = match Url::parse(raw.trim()) {
            Ok(u) => u,
            Err(_) => return false,
        };
        url.set_fragment(None);

        match url.scheme() {
            "http" | "https" => {}
            _ => return false,
        }

        let host = hostname(&url);
        if !self.is_allowed_domain(&host) {
            return false;
        }
        // GitLab instances expose an unbounded tree/blob/commit space;
        // kill the whole host.
        if host.contains("gitlab") {
            return false;
        }

        let path = url.path().to_ascii_lowercase();
        if BLOCKED_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
            return false;
        }

        if url.as_str().len() > MAX_URL_LEN {
            return false;
        }

        if has_repeating_segments(&path) {
            return false;
        }
        if path_depth(&path) > MAX_PATH_DEPTH {
            return false;
        }
        if is_date_archive(&path) {
            return false;
        }
        for hint in TRAP_PATH_HINTS {
            let infix = format!("/{hint}/");
            let suffix = format!("/{hint}");
            if path.contains(&infix) || path.ends_with(&suffix) {
                return false;
            }
        }

        if url.query().is_some_and(|q| !q.is_empty()) && !self.query_admissible(&url) {
            return false;
        }

        true
    }

    fn is_allowed_domain(&self, host: &str) -> bool {
        self.allowed_domains
            .iter()
            .any(|d| host == d || host.ends_with(&format!(".{d}")))
    }

    fn query_admissible(&self, url: &Url) -> bool {
        // First value per distinct lowercased parameter name.
        let mut params: Vec<(String, String)> = Vec::new();
        for (k, v) in url.query_pairs() {
            let key = k.to_ascii_lowercase();
            if key.contains('[') || key.contains(']') {
                return false;
            }
            if !params.iter().any(|(seen, _)| *seen == key) {
                params.push((key, v.into_owned()));
            }
        }

        if params.len() > MAX_QUERY_PARAMS {
            return false;
        }

        for (key, _) in &params {
            if HARD_BLOCK_QUERY_KEYS.contains(&key.as_str()) {
                return false;
            }
        }

        for (key, value) in &params {
            let limit = if PAGE_NUMBER_KEYS.contains(&key.as_str()) {
                MAX_PAGE_NUMBER
            } else if OFFSET_KEYS.contains(&key.as_str()) {
                MAX_START_OFFSET
            } else {
                continue;
            };
            match value.trim().parse::<i64>() {
                Ok(n) if n <= limit => {}
                _ => return false,
            }
        }

        let combinatorial = params
            .iter()
            .filter(|(k, _)| COMBINATORIAL_QUERY_KEYS.contains(&k.as_str()))
            .count();
        combinatorial < 2
    }
}

/// True when a segment repeats three times in a row, or any segment occurs
/// six or more times anywhere in the path.
fn has_repeating_segments(path: &str) -> bool {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 3 {
        return false;
    }
    if segments.windows(3).any(|w| w[0] == w[1] && w[1] == w[2]) {
        return true;
    }
    let mut counts = std::collections::HashMap::new();
    for s in &segments {
        let n = counts.entry(*s).or_insert(0usize);
        *n += 1;
        if *n >= MAX_SEGMENT_OCCURRENCES {
            return true;
        }
    }
    false
}

fn path_depth(path: &str) -> usize {
    path.split('/').filter(|s| !s.is_empty()).count()
}

/// Matches date-archive paths like `/2023/07/` or `/2023-07/`.
fn is_date_archive(path: &str) -> bool {
    let bytes = path.as_bytes();
    let digit = |i: usize| bytes.get(i).is_some_and(|b| b.is_ascii_digit());
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'/' {
            continue;
        }
        if digit(i + 1)
            && digit(i + 2)
            && digit(i + 3)
            && digit(i + 4)
            && matches!(bytes.get(i + 5), Some(b'-') | Some(b'/'))
            && digit(i + 6)
            && digit(i + 7)
            && bytes.get(i + 8) == Some(&b'/')
        {
            return true;
        }
    }
    false
}
