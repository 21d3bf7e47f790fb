//! Contact names from a sidebar text dump.
//!
//! The sidebar mixes chat names with last-message previews and times. A line
//! is kept as a contact when it has no `:` and no compact clock time. This is
//! a heuristic: a preview without those markers slips through, and a contact
//! whose name contains `:` is dropped.

use lazy_static::lazy_static;
use regex_lite::Regex;

lazy_static! {
    // Sidebar times render without a space: "10:42AM"
    static ref CLOCK_TIME: Regex = Regex::new(r"\d{1,2}:\d{2}(?:AM|PM)").unwrap();
}

/// Whether a single sidebar line looks like a contact name.
pub fn is_contact_line(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.contains(':') && !CLOCK_TIME.is_match(line)
}

/// Extract contact names in order of appearance. Duplicates are kept.
pub fn extract_contacts(raw_sidebar_text: &str) -> Vec<String> {
    raw_sidebar_text
        .lines()
        .filter(|line| is_contact_line(line))
        .map(|line| line.trim().to_string())
        .collect()
}
