//! Tokenizer and stop-word filter.
//!
//! Terms are maximal lowercase `[a-z0-9]` runs; single characters and
//! common English function words are dropped. The number of retained
//! tokens is the page's word count.

use std::collections::HashSet;
use std::sync::OnceLock;

/// Common English function words and contractions, excluded from term
/// frequencies and word counts.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can't", "cannot", "could", "couldn't", "did", "didn't", "do", "does", "doesn't",
    "doing", "don't", "down", "during", "each", "few", "for", "from", "further", "had", "hadn't",
    "has", "hasn't", "have", "haven't", "having", "he", "he'd", "he'll", "he's", "her", "here",
    "here's", "hers", "herself", "him", "himself", "his", "how", "how's", "i", "i'd", "i'll",
    "i'm", "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself", "let's",
    "me", "more", "most", "mustn't", "my", "myself", "no", "nor", "not", "of", "off", "on",
    "once", "only", "or", "other", "ought", "our", "ours", "ourselves", "out", "over", "own",
    "same", "shan't", "she", "she'd", "she'll", "she's", "should", "shouldn't", "so", "some",
    "such", "than", "that", "that's", "the", "their", "theirs", "them", "themselves", "then",
    "there", "there's", "these", "they", "they'd", "they'll", "they're", "they've", "this",
    "those", "through", "to", "too", "under", "until", "up", "very", "was", "wasn't", "we",
    "we'd", "we'll", "we're", "we've", "were", "weren't", "what", "what's", "when", "when's",
    "where", "where's", "which", "while", "who", "who's", "whom", "why", "why's", "with",
    "won't", "would", "wouldn't", "you", "you'd", "you'll", "you're", "you've", "your", "yours",
    "yourself", "yourselves",
];

fn stop_words() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

/// Tokenize text into retained terms, in document order.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_lowercase() || lower.is_ascii_digit() {
            current.push(lower);
        } else if !current.is_empty() {
            flush_token(&mut tokens, &mut current);
        }
    }
    if !current.is_empty() {
        flush_token(&mut tokens, &mut current);
    }
    tokens
}

fn flush_token(tokens: &mut Vec<String>, current: &mut String) {
    if current.len() > 1 && !stop_words().contains(current.as_str()) {
        tokens.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_non_alphanumeric() {
        let tokens = tokenize("Machine-Learning, graphs & data2!");
        assert_eq!(tokens, vec!["machine", "learning", "graphs", "data2"]);
    }

    #[test]
    fn drops_stop_words_and_single_chars() {
        let tokens = tokenize("the quick brown fox is a fox");
        assert_eq!(tokens, vec!["quick", "brown", "fox", "fox"]);
    }

    #[test]
    fn contractions_split_and_filter() {
        // "don't" becomes "don" + "t"; "t" is dropped for length
        let tokens = tokenize("don't panic");
        assert_eq!(tokens, vec!["don", "panic"]);
    }

    #[test]
    fn empty_and_symbol_only_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("!!! --- ???").is_empty());
    }

    #[test]
    fn non_ascii_breaks_runs() {
        let tokens = tokenize("café menu");
        assert_eq!(tokens, vec!["caf", "menu"]);
    }
}
