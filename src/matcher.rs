//! Entity-name matching against narrative text.
//!
//! Deliberately crude substring and token matching: the goal is recall,
//! not precision. A narrative that refers to "Prince Cassian Arcanus" as
//! just "Cassian" should still count as a mention, so a miss here means
//! the entity is very likely absent from the text. A fuzzy or
//! edit-distance matcher can replace this behind the same contract
//! without touching callers.

/// Name tokens must be longer than this to participate in the fallback
/// match. Short tokens ("of", "the", "Sir") produce too many false hits.
pub const MIN_TOKEN_LEN: usize = 3;

/// Check whether `entity` is referenced in `text`.
///
/// Case-insensitive substring match on the full name first; for
/// multi-token names, a match on any individual token longer than
/// [`MIN_TOKEN_LEN`] characters also counts, tolerating narratives that
/// use a short form, a title, or a given name only. Empty names and
/// empty text never match.
pub fn is_mentioned(text: &str, entity: &str) -> bool {
    if text.is_empty() || entity.is_empty() {
        return false;
    }

    let text_lower = text.to_lowercase();
    let entity_lower = entity.to_lowercase();

    if text_lower.contains(&entity_lower) {
        return true;
    }

    let tokens: Vec<&str> = entity_lower.split_whitespace().collect();
    if tokens.len() < 2 {
        return false;
    }

    tokens
        .iter()
        .any(|token| token.chars().count() > MIN_TOKEN_LEN && text_lower.contains(token))
}
