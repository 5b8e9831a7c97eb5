use regex::Regex;
use std::sync::OnceLock;

use crate::resume::ResumeRecord;

/// Fixed segment between the title and the extension.
pub const FILENAME_SUFFIX: &str = "1-1_Graduate";

fn whitespace() -> &'static Regex {
    static WS: OnceLock<Regex> = OnceLock::new();
    WS.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Recruiter-friendly PDF name: `{First}-{Last}_{Title-With-Hyphens}_1-1_Graduate.pdf`.
///
/// A single-token name is used for both first and last.
pub fn synthesize_filename(record: &ResumeRecord) -> String {
    let mut tokens = record.name.split_whitespace();
    let first = tokens.next().unwrap_or_default();
    let last = tokens.last().unwrap_or(first);
    let title = whitespace().replace_all(record.title.trim(), "-");

    format!("{first}-{last}_{title}_{FILENAME_SUFFIX}.pdf")
}
