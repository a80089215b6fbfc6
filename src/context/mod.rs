use crate::models::chat::ChatMessage;

/// Default number of recent user/assistant pairs kept behind the intro.
pub const DEFAULT_MAX_RECENT_PAIRS: usize = 7;

const ANCHOR_LEN: usize = 2;

/// Keeps the intro exchange (first two messages) plus at most the last
/// `max_recent_pairs * 2` messages that follow it.
///
/// Everything in between is dropped, so the window slides over the tail while
/// the persona stays anchored at the front.
pub fn trim_context(messages: &[ChatMessage], max_recent_pairs: usize) -> Vec<ChatMessage> {
    if messages.len() <= ANCHOR_LEN {
        return messages.to_vec();
    }

    let (anchor, recent) = messages.split_at(ANCHOR_LEN);
    let keep = recent.len().min(max_recent_pairs.saturating_mul(2));
    let tail = &recent[recent.len() - keep..];

    let mut trimmed = Vec::with_capacity(ANCHOR_LEN + keep);
    trimmed.extend_from_slice(anchor);
    trimmed.extend_from_slice(tail);
    trimmed
}
