//! Staged regex query construction.
//!
//! A regex query is a disjunction of [`MatchClause`]s ordered from strongest
//! to weakest: exact (`^term$`), prefix (`^term`) and, unless the caller asks
//! for prefix-only, contains (`term`). The field set is chosen by the
//! classification of the input, and every clause carries the status filter
//! so each disjunct can use a `(field, status)` index.

use regex::RegexBuilder;

use wayfare_core::{
    Classification, Location, LocationStatus, MatchClause, MatchTier, QueryKind, RegexQuery,
    ScoreSpec, SearchField, SearchPriority,
};

use crate::classifier::classify;

/// Characters that carry meaning in a regex pattern.
const REGEX_METACHARACTERS: &[char] = &[
    '.', '*', '+', '?', '^', '$', '{', '}', '(', ')', '|', '[', ']', '\\',
];

/// Escape regex metacharacters with a backslash.
///
/// # Examples
///
/// ```
/// use wayfare_search::regex_builder::escape_regex;
///
/// assert_eq!(escape_regex("a.b*c"), "a\\.b\\*c");
/// assert_eq!(escape_regex("Tokyo"), "Tokyo");
/// ```
pub fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if REGEX_METACHARACTERS.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Fields searched for a classification, honouring the caller's priority hint.
pub fn strategy_fields(
    classification: Classification,
    priority: Option<SearchPriority>,
) -> Vec<SearchField> {
    if classification.is_pinyin_or_english || priority == Some(SearchPriority::EnNamePinyin) {
        return vec![SearchField::EnName, SearchField::Pinyin];
    }
    match classification.kind {
        QueryKind::Chinese => vec![SearchField::Name],
        QueryKind::Code => vec![SearchField::Code],
        QueryKind::PinyinOrEnglish => vec![SearchField::EnName, SearchField::Pinyin],
        QueryKind::Unknown => Vec::new(),
    }
}

/// Build the staged regex query for a search term.
///
/// Returns `None` when the term is empty after trimming; callers treat that
/// as "no search constraint".
pub fn build_regex_query(
    term: &str,
    priority: Option<SearchPriority>,
    status: Option<LocationStatus>,
    prefix_only: bool,
) -> Option<RegexQuery> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        return None;
    }

    let classification = classify(trimmed);
    let fields = strategy_fields(classification, priority);
    let escaped = escape_regex(trimmed);

    let mut tiers = vec![MatchTier::Exact, MatchTier::Prefix];
    if !prefix_only {
        tiers.push(MatchTier::Contains);
    }

    let clauses = tiers
        .into_iter()
        .flat_map(|tier| {
            let escaped = &escaped;
            fields.iter().map(move |field| MatchClause {
                field: *field,
                tier,
                escaped: escaped.clone(),
                status,
            })
        })
        .collect();

    Some(RegexQuery {
        classification,
        clauses,
        prefix_only,
        score: ScoreSpec {
            term: trimmed.to_string(),
            fields,
        },
    })
}

/// Evaluates a regex query against a location in process.
///
/// Mirrors the SQL semantics: a location matches when any clause's pattern
/// matches its field case-insensitively and the clause's status (if any)
/// equals the location's status. Clauses whose pattern fails to compile
/// never match.
pub fn matches(query: &RegexQuery, location: &Location) -> bool {
    query.clauses.iter().any(|clause| clause_matches(clause, location))
}

fn clause_matches(clause: &MatchClause, location: &Location) -> bool {
    if let Some(status) = clause.status {
        if location.status != status {
            return false;
        }
    }
    let Some(value) = clause.field.value(location) else {
        return false;
    };
    RegexBuilder::new(&clause.pattern())
        .case_insensitive(true)
        .build()
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}
