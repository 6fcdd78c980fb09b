//! Text-index query construction.
//!
//! The text stage hands a sanitised string to `plainto_tsquery` using the
//! `simple` configuration, so there is no stemming and no stopword removal.
//! Punctuation is dropped rather than escaped: the tsquery parser ignores
//! it anyway, and dropping it keeps the query stable across PostgreSQL
//! versions.

use wayfare_core::TextQuery;

use crate::classifier::is_cjk_ideograph;

/// Build a text-index query, or `None` when nothing searchable remains.
///
/// # Examples
///
/// ```
/// use wayfare_search::text_builder::build_text_query;
///
/// let q = build_text_query("  New   York! ").unwrap();
/// assert_eq!(q.search, "New York");
/// assert_eq!(q.language, "simple");
/// assert!(build_text_query("?!").is_none());
/// ```
pub fn build_text_query(term: &str) -> Option<TextQuery> {
    let kept: String = term
        .chars()
        .map(|ch| if is_searchable(ch) { ch } else { ' ' })
        .collect();
    let search = kept.split_whitespace().collect::<Vec<_>>().join(" ");

    if search.is_empty() {
        None
    } else {
        Some(TextQuery::new(search))
    }
}

fn is_searchable(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || is_cjk_ideograph(ch)
}
