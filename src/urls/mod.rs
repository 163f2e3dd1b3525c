//! URL canonicalization and host keys.
//!
//! Every URL entering the crawler passes through [`canonicalize`] first, so
//! the frontier's hashes, the analytics' unique set, and the admission filter
//! all agree on one spelling per page.

pub mod admission;

use url::Url;

/// Canonical form: surrounding whitespace trimmed, scheme and host
/// lowercased, fragment removed. Path and query are kept verbatim.
///
/// Returns `None` when the input does not parse as an absolute URL.
/// Idempotent: canonicalizing a canonical URL is a no-op.
pub fn canonicalize(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    url.set_fragment(None);
    Some(url.into())
}

/// Host key used for politeness scheduling and per-host grouping:
/// lowercased hostname with the port stripped and any `www.` prefix
/// removed, so `www.ics.uci.edu` and `ics.uci.edu` share one rate slot.
pub fn host_key(url: &Url) -> String {
    let host = url.host_str().unwrap_or("").to_ascii_lowercase();
    host.strip_prefix("www.").unwrap_or(&host).to_string()
}

/// Hostname as served (lowercase, port stripped, `www.` kept). Admission
/// and the subdomain report compare against this form.
pub fn hostname(url: &Url) -> String {
    url.host_str().unwrap_or("").to_ascii_lowercase()
}
