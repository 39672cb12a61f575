//! Model catalogue filtering
//!
//! Narrows the upstream model listing to chat-capable models and orders it
//! so the commonly used ones come first.

/// A model id must contain one of these (case-insensitive) to be listed.
const INCLUDE_MARKERS: &[&str] = &["gpt-4", "gpt-5", "o1", "o3", "chatgpt"];

/// Ids containing any of these are never listed.
const EXCLUDE_MARKERS: &[&str] = &["realtime", "audio", "transcribe", "search"];

/// Display order by id prefix; the first matching prefix wins.
const PRIORITY_PREFIXES: &[&str] = &[
    "gpt-4o-mini",
    "gpt-4o",
    "gpt-4.1",
    "gpt-4.1-mini",
    "o1-mini",
    "o1",
    "o3-mini",
    "o3",
    "gpt-5",
    "chatgpt-4o",
];

const UNRANKED: usize = 100;

fn is_chat_model(id: &str) -> bool {
    let lowered = id.to_lowercase();
    INCLUDE_MARKERS.iter().any(|marker| lowered.contains(marker))
        && !EXCLUDE_MARKERS.iter().any(|marker| id.contains(marker))
}

fn rank(id: &str) -> usize {
    PRIORITY_PREFIXES
        .iter()
        .position(|prefix| id.starts_with(prefix))
        .unwrap_or(UNRANKED)
}

/// Filter and sort raw model ids for display.
///
/// Ties within a rank, and every unranked id, are ordered lexically.
pub fn select_models<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut selected: Vec<String> = ids
        .into_iter()
        .map(Into::into)
        .filter(|id| is_chat_model(id))
        .collect();

    selected.sort_by(|a, b| (rank(a), a).cmp(&(rank(b), b)));
    selected
}
