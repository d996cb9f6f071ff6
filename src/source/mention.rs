//! Mention-style invocation parsing: `<@BOT_ID> word args...`

/// Whether `token` is a user mention of `user_id` (`<@id>` or `<@!id>`).
pub fn is_mention_of(token: &str, user_id: &str) -> bool {
    token
        .strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
        .map(|id| id.strip_prefix('!').unwrap_or(id) == user_id)
        .unwrap_or(false)
}

/// Whether the first token of `raw` mentions `user_id`.
pub fn starts_with_mention(raw: &str, user_id: &str) -> bool {
    raw.split_whitespace()
        .next()
        .map(|token| is_mention_of(token, user_id))
        .unwrap_or(false)
}

/// Match `<@user_id> word` at the start of `raw`.
///
/// On success returns the slice of `raw` up to the end of `word`, so the
/// caller can strip it as a literal prefix.
pub fn mention_trigger(raw: &str, user_id: &str, word: &str) -> Option<String> {
    if user_id.is_empty() || word.is_empty() {
        return None;
    }

    let body = raw.trim_start();
    let lead = raw.len() - body.len();

    let mention_end = body.find(char::is_whitespace)?;
    if !is_mention_of(&body[..mention_end], user_id) {
        return None;
    }

    let after = &body[mention_end..];
    let next = after.trim_start();
    let word_start = lead + mention_end + (after.len() - next.len());
    let word_len = next.find(char::is_whitespace).unwrap_or(next.len());

    if &next[..word_len] != word {
        return None;
    }

    Some(raw[..word_start + word_len].to_string())
}
