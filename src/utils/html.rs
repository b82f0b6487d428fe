use ammonia;

/// Whitelist-based sanitization for user-supplied rich text (blog bodies,
/// course descriptions, contact messages). Keeps harmless formatting tags,
/// drops scripts and event-handler attributes before anything is stored.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
