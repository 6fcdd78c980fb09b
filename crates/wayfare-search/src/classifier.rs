//! Search input classification.
//!
//! Decides which location fields a search string should be matched against.
//! The detector performs a single O(n) pass through the trimmed input and
//! never fails: every string maps to exactly one [`QueryKind`].

use unicode_script::{Script, UnicodeScript};

use wayfare_core::defaults::{CODE_MAX_LEN, CODE_MIN_LEN};
use wayfare_core::{Classification, QueryKind};

/// Classifies a raw search string.
///
/// Rules, in order:
/// 1. empty after trimming: [`QueryKind::Unknown`]
/// 2. 2-5 ASCII letters/digits with no lowercase letter: [`QueryKind::Code`]
/// 3. any Han ideograph: [`QueryKind::Chinese`]
/// 4. anything else: [`QueryKind::PinyinOrEnglish`]
///
/// Codes are stored uppercase, so a title-case word such as `Tokyo` is a
/// name, not a code.
///
/// # Examples
///
/// ```
/// use wayfare_search::classifier::classify;
/// use wayfare_core::QueryKind;
///
/// assert_eq!(classify("BJ").kind, QueryKind::Code);
/// assert_eq!(classify("东京").kind, QueryKind::Chinese);
/// assert_eq!(classify("Tokyo").kind, QueryKind::PinyinOrEnglish);
/// assert_eq!(classify("   ").kind, QueryKind::Unknown);
/// ```
pub fn classify(input: &str) -> Classification {
    let trimmed = input.trim();

    let kind = if trimmed.is_empty() {
        QueryKind::Unknown
    } else if looks_like_code(trimmed) {
        QueryKind::Code
    } else if has_cjk_ideograph(trimmed) {
        QueryKind::Chinese
    } else {
        QueryKind::PinyinOrEnglish
    };

    Classification::new(kind)
}

/// Checks whether the input has the shape of an airport or station code.
fn looks_like_code(trimmed: &str) -> bool {
    let len = trimmed.len();
    (CODE_MIN_LEN..=CODE_MAX_LEN).contains(&len)
        && trimmed.bytes().all(|b| b.is_ascii_alphanumeric())
        && !trimmed.bytes().any(|b| b.is_ascii_lowercase())
}

/// Checks if the input contains a CJK ideograph (Han script).
///
/// # Examples
///
/// ```
/// use wayfare_search::classifier::has_cjk_ideograph;
///
/// assert!(has_cjk_ideograph("北京"));
/// assert!(has_cjk_ideograph("Tokyo 东京"));
/// assert!(!has_cjk_ideograph("Beijing"));
/// ```
pub fn has_cjk_ideograph(input: &str) -> bool {
    input.chars().any(is_cjk_ideograph)
}

pub(crate) fn is_cjk_ideograph(ch: char) -> bool {
    ch.script() == Script::Han
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_unknown() {
        for input in ["", "   ", "\t\n"] {
            let c = classify(input);
            assert_eq!(c.kind, QueryKind::Unknown);
            assert!(!c.is_pinyin_or_english);
        }
    }

    #[test]
    fn test_two_letter_uppercase_is_code() {
        assert_eq!(classify("BJ").kind, QueryKind::Code);
    }

    #[test]
    fn test_airport_and_station_codes() {
        assert_eq!(classify("PEK").kind, QueryKind::Code);
        assert_eq!(classify("SHA").kind, QueryKind::Code);
        assert_eq!(classify(" K123 ").kind, QueryKind::Code);
        assert_eq!(classify("12345").kind, QueryKind::Code);
    }

    #[test]
    fn test_code_length_bounds() {
        assert_eq!(classify("A").kind, QueryKind::PinyinOrEnglish);
        assert_eq!(classify("ABCDEF").kind, QueryKind::PinyinOrEnglish);
    }

    #[test]
    fn test_title_case_word_is_not_code() {
        let c = classify("Tokyo");
        assert_eq!(c.kind, QueryKind::PinyinOrEnglish);
        assert!(c.is_pinyin_or_english);
        assert_eq!(classify("pek").kind, QueryKind::PinyinOrEnglish);
    }

    #[test]
    fn test_chinese() {
        assert_eq!(classify("东京").kind, QueryKind::Chinese);
        assert_eq!(classify("上海 Pudong").kind, QueryKind::Chinese);
    }

    #[test]
    fn test_catch_all_is_permissive() {
        assert_eq!(classify("beijing").kind, QueryKind::PinyinOrEnglish);
        assert_eq!(classify("New York").kind, QueryKind::PinyinOrEnglish);
        assert_eq!(classify("a.b*c").kind, QueryKind::PinyinOrEnglish);
        assert_eq!(classify("Москва").kind, QueryKind::PinyinOrEnglish);
        assert_eq!(classify("とうきょう").kind, QueryKind::PinyinOrEnglish);
    }

    #[test]
    fn test_total_and_deterministic() {
        let inputs = [
            "", "BJ", "东京", "Tokyo", "(*)", "🚀", "ÅÄÖ", "\u{0}", "a\u{3000}b", "1",
        ];
        for input in inputs {
            let first = classify(input);
            let second = classify(input);
            assert_eq!(first, second);
            assert_eq!(first.is_pinyin_or_english, first.kind == QueryKind::PinyinOrEnglish);
        }
    }
}
