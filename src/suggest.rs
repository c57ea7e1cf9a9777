use regex::RegexBuilder;

use crate::models::{EntityKind, Suggestion, SuggestionRecord};

/// Queries shorter than this never reach the network; the caller enforces it.
pub const MIN_QUERY_LEN: usize = 2;
pub const MAX_SUGGESTIONS: usize = 10;

/// Plain-text highlight markers. A rendering adapter swaps these for real
/// markup.
pub const MARK_OPEN: &str = "[";
pub const MARK_CLOSE: &str = "]";

/// Pure transform from raw hits to display-ready records. Truncation keeps
/// the server-provided order; there is no client-side re-ranking.
pub fn format_suggestions(raw: &[Suggestion], query: &str, limit: usize) -> Vec<SuggestionRecord> {
    raw.iter()
        .take(limit)
        .map(|suggestion| SuggestionRecord {
            text: highlight_term(&suggestion.text, query),
            kind: suggestion.kind,
            summary: summary_line(suggestion),
        })
        .collect()
}

/// Wraps every case-insensitive occurrence of `query` in highlight markers,
/// preserving the matched text's original casing. Empty query returns the
/// text unchanged.
pub fn highlight_term(text: &str, query: &str) -> String {
    if query.is_empty() {
        return text.to_string();
    }
    let Ok(matcher) = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        return text.to_string();
    };
    matcher
        .replace_all(text, |caps: &regex::Captures| {
            format!("{MARK_OPEN}{}{MARK_CLOSE}", &caps[0])
        })
        .into_owned()
}

fn summary_line(suggestion: &Suggestion) -> String {
    match suggestion.kind {
        EntityKind::Player => match (&suggestion.position, suggestion.jersey_number) {
            (Some(pos), Some(num)) => format!("{pos} • #{num}"),
            (Some(pos), None) => pos.clone(),
            (None, Some(num)) => format!("#{num}"),
            (None, None) => String::new(),
        },
        EntityKind::Manager => match &suggestion.nationality {
            Some(nat) if !nat.is_empty() => format!("Manager • {nat}"),
            _ => "Manager".to_string(),
        },
    }
}
