//! End-of-crawl report rendering.
//!
//! The output format is fixed and line-delimited; downstream tooling parses
//! it, so the numbering and indentation must not drift.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use crate::analytics::ReportSnapshot;

/// Render the report as plain UTF-8 text.
pub fn render(snapshot: &ReportSnapshot, near_duplicates: usize, root_domain: &str) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "1. Unique pages: {}", snapshot.unique_pages);

    match &snapshot.longest_page {
        Some(page) => {
            let _ = writeln!(out, "2. Longest page: {} ({} words)", page.url, page.word_count);
        }
        None => {
            let _ = writeln!(out, "2. Longest page: - (0 words)");
        }
    }

    let _ = writeln!(out, "3. Near-duplicate pages found: {near_duplicates}");

    let _ = writeln!(out, "4. Top 50 words:");
    for (term, count) in &snapshot.top_terms {
        let _ = writeln!(out, "   {term}: {count}");
    }

    let _ = writeln!(out, "5. Subdomains in {root_domain} (alphabetical):");
    for (host, count) in &snapshot.subdomains {
        let _ = writeln!(out, "   {host}, {count}");
    }

    out
}

/// Write the rendered report to `path`, logging the headline numbers.
pub fn write_report(
    path: &Path,
    snapshot: &ReportSnapshot,
    near_duplicates: usize,
    root_domain: &str,
) -> io::Result<()> {
    let text = render(snapshot, near_duplicates, root_domain);
    fs::write(path, &text)?;
    log::info!(
        "report written to {}: {} unique pages, {} near-duplicates",
        path.display(),
        snapshot.unique_pages,
        near_duplicates
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::LongestPage;

    #[test]
    fn renders_exact_format() {
        let snapshot = ReportSnapshot {
            unique_pages: 3,
            longest_page: Some(LongestPage {
                url: "http://ics.uci.edu/about".to_string(),
                word_count: 120,
            }),
            top_terms: vec![("research".to_string(), 9), ("faculty".to_string(), 4)],
            subdomains: vec![
                ("cs.uci.edu".to_string(), 1),
                ("ics.uci.edu".to_string(), 2),
            ],
        };

        let text = render(&snapshot, 1, "uci.edu");
        let expected = "\
1. Unique pages: 3
2. Longest page: http://ics.uci.edu/about (120 words)
3. Near-duplicate pages found: 1
4. Top 50 words:
   research: 9
   faculty: 4
5. Subdomains in uci.edu (alphabetical):
   cs.uci.edu, 1
   ics.uci.edu, 2
";
        assert_eq!(text, expected);
    }

    #[test]
    fn renders_empty_crawl() {
        let snapshot = ReportSnapshot {
            unique_pages: 0,
            longest_page: None,
            top_terms: Vec::new(),
            subdomains: Vec::new(),
        };
        let text = render(&snapshot, 0, "uci.edu");
        assert!(text.starts_with("1. Unique pages: 0\n2. Longest page: - (0 words)\n"));
    }
}
