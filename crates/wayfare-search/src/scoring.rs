//! Relevance scoring and result ordering.
//!
//! `matchScore` is a coarse three-level signal: an exact field match scores
//! 100, a prefix match 80, anything else 0. Results sort by
//! `(matchScore desc, type rank asc, name asc)`. The SQL renderer in
//! `wayfare-db` produces the same ordering with `CASE` expressions; the
//! functions here are the in-process reference used by the memory store and
//! by tests.

use std::cmp::Ordering;

use wayfare_core::defaults::{SCORE_EXACT, SCORE_NONE, SCORE_PREFIX};
use wayfare_core::{
    Classification, Location, ScoreSpec, ScoredLocation, SearchPriority,
};

use crate::regex_builder::strategy_fields;

/// Score specification for a term, using the same fields the regex stage searches.
pub fn score_spec(
    term: &str,
    classification: Classification,
    priority: Option<SearchPriority>,
) -> ScoreSpec {
    ScoreSpec {
        term: term.trim().to_string(),
        fields: strategy_fields(classification, priority),
    }
}

/// Compute `matchScore` for one location.
pub fn match_score(location: &Location, spec: &ScoreSpec) -> u8 {
    let term = spec.term.to_lowercase();
    if term.is_empty() {
        return SCORE_NONE;
    }

    let values: Vec<String> = spec
        .fields
        .iter()
        .filter_map(|field| field.value(location))
        .map(str::to_lowercase)
        .collect();

    if values.iter().any(|v| *v == term) {
        SCORE_EXACT
    } else if values.iter().any(|v| v.starts_with(&term)) {
        SCORE_PREFIX
    } else {
        SCORE_NONE
    }
}

/// Ordering used for every result page.
pub fn compare(a: &ScoredLocation, b: &ScoredLocation) -> Ordering {
    b.match_score
        .cmp(&a.match_score)
        .then_with(|| compare_locations(&a.location, &b.location))
}

/// Ordering for unscored lists: type rank, then name by byte order.
pub fn compare_locations(a: &Location, b: &Location) -> Ordering {
    a.location_type
        .rank()
        .cmp(&b.location_type.rank())
        .then_with(|| a.name.as_bytes().cmp(b.name.as_bytes()))
}

/// Sort scored results in place and return them.
pub fn rank(mut items: Vec<ScoredLocation>) -> Vec<ScoredLocation> {
    items.sort_by(compare);
    items
}

/// Score and rank a set of candidate locations.
pub fn score_and_rank(candidates: Vec<Location>, spec: &ScoreSpec) -> Vec<ScoredLocation> {
    let scored = candidates
        .into_iter()
        .map(|location| {
            let score = match_score(&location, spec);
            ScoredLocation::new(location, score)
        })
        .collect();
    rank(scored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfare_core::{LocationType, QueryKind, SearchField};

    fn spec(term: &str) -> ScoreSpec {
        ScoreSpec {
            term: term.to_string(),
            fields: vec![SearchField::Pinyin, SearchField::EnName],
        }
    }

    fn tokyo() -> Location {
        Location::new("东京", LocationType::City)
            .with_en_name("Tokyo")
            .with_pinyin("Dongjing")
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        assert_eq!(match_score(&tokyo(), &spec("Tokyo")), SCORE_EXACT);
        assert_eq!(match_score(&tokyo(), &spec("TOKYO")), SCORE_EXACT);
        assert_eq!(match_score(&tokyo(), &spec("dongjing")), SCORE_EXACT);
    }

    #[test]
    fn test_prefix_match() {
        assert_eq!(match_score(&tokyo(), &spec("tok")), SCORE_PREFIX);
        assert_eq!(match_score(&tokyo(), &spec("Dong")), SCORE_PREFIX);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(match_score(&tokyo(), &spec("kyo")), SCORE_NONE);
        assert_eq!(match_score(&tokyo(), &spec("")), SCORE_NONE);
    }

    #[test]
    fn test_score_is_monotone_and_idempotent() {
        let exact = match_score(&tokyo(), &spec("tokyo"));
        let prefix = match_score(&tokyo(), &spec("to"));
        let neither = match_score(&tokyo(), &spec("osaka"));
        assert!(exact >= prefix && prefix >= neither);
        assert_eq!(exact, match_score(&tokyo(), &spec("tokyo")));
    }

    #[test]
    fn test_only_scored_fields_count() {
        // Chinese name is not a scored field for pinyin/English searches.
        assert_eq!(match_score(&tokyo(), &spec("东京")), SCORE_NONE);

        let chinese = score_spec("东京", Classification::new(QueryKind::Chinese), None);
        assert_eq!(match_score(&tokyo(), &chinese), SCORE_EXACT);
    }

    #[test]
    fn test_code_strategy_scores_code() {
        let pek = Location::new("北京首都国际机场", LocationType::Airport).with_code("pek");
        let s = score_spec("PEK", Classification::new(QueryKind::Code), None);
        assert_eq!(match_score(&pek, &s), SCORE_EXACT);
    }

    #[test]
    fn test_rank_orders_by_score_then_type_then_name() {
        let city = Location::new("北京", LocationType::City).with_en_name("Beijing");
        let airport = Location::new("北京首都", LocationType::Airport).with_en_name("Beijing Capital");
        let station = Location::new("北京站", LocationType::Station).with_en_name("Beijing");
        let other = Location::new("天津", LocationType::City).with_en_name("Tianjin");

        let ranked = score_and_rank(
            vec![other.clone(), airport.clone(), station.clone(), city.clone()],
            &spec("beijing"),
        );
        let names: Vec<_> = ranked.iter().map(|r| r.location.name.as_str()).collect();
        assert_eq!(names, vec!["北京", "北京站", "北京首都", "天津"]);
        assert_eq!(ranked[0].match_score, SCORE_EXACT);
        assert_eq!(ranked[2].match_score, SCORE_PREFIX);
        assert_eq!(ranked[3].match_score, SCORE_NONE);
    }

    #[test]
    fn test_name_tiebreak_is_byte_order() {
        let a = Location::new("Abc", LocationType::City);
        let b = Location::new("abc", LocationType::City);
        assert_eq!(compare_locations(&a, &b), Ordering::Less);
    }
}
