#[cfg(test)]
#[path = "sources_test.rs"]
mod tests;

/// Phrases that make a chat turn ask the service for its citations.
pub const SOURCE_KEYWORDS: [&str; 7] = [
    "source",
    "sources",
    "reference",
    "link",
    "url",
    "website",
    "where did you get",
];

/// Keyword heuristic, evaluated on every message. This is a plain
/// case-insensitive substring match, so "resources" or "unlinked" count too.
pub fn wants_sources(text: &str) -> bool {
    let lowered = text.to_lowercase();
    return SOURCE_KEYWORDS
        .iter()
        .any(|keyword| return lowered.contains(keyword));
}
