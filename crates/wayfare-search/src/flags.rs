//! Runtime switches for the search fallback chain.
//!
//! Both switches can be flipped through environment variables, so an
//! operator can turn the text stage off while the index is rebuilt or
//! tighten widening without a redeploy.

use std::env;
use std::fmt;
use std::str::FromStr;

use wayfare_core::{Classification, Error, SearchPriority};

/// When the regex stage may widen from prefix to substring matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WideningPolicy {
    /// Widen only for pinyin/English input or the `enName_pinyin` hint.
    #[default]
    PinyinOrEnglishOnly,
    /// Widen for every classification.
    Always,
    /// Never run the contains tier.
    Never,
}

impl WideningPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            WideningPolicy::PinyinOrEnglishOnly => "pinyin_or_english",
            WideningPolicy::Always => "always",
            WideningPolicy::Never => "never",
        }
    }

    /// Whether an empty prefix stage may be retried with the contains tier.
    pub fn allows(&self, classification: Classification, priority: Option<SearchPriority>) -> bool {
        match self {
            WideningPolicy::Always => true,
            WideningPolicy::Never => false,
            WideningPolicy::PinyinOrEnglishOnly => {
                classification.is_pinyin_or_english
                    || priority == Some(SearchPriority::EnNamePinyin)
            }
        }
    }
}

impl fmt::Display for WideningPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WideningPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pinyin_or_english" | "pinyin" | "default" => Ok(WideningPolicy::PinyinOrEnglishOnly),
            "always" => Ok(WideningPolicy::Always),
            "never" => Ok(WideningPolicy::Never),
            other => Err(Error::Config(format!("Unknown widening policy: {}", other))),
        }
    }
}

/// Search behaviour switches.
///
/// # Example
/// ```
/// use wayfare_search::flags::{SearchConfig, WideningPolicy};
///
/// let config = SearchConfig::default();
/// assert!(config.text_index);
/// assert_eq!(config.widening, WideningPolicy::PinyinOrEnglishOnly);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Try the text index before the regex stages.
    pub text_index: bool,
    pub widening: WideningPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            text_index: true,
            widening: WideningPolicy::default(),
        }
    }
}

impl SearchConfig {
    /// Read `SEARCH_TEXT_INDEX` (default true) and `SEARCH_WIDENING`
    /// (default `pinyin_or_english`). Unparsable values keep the default.
    pub fn from_env() -> Self {
        let widening = env::var("SEARCH_WIDENING")
            .ok()
            .and_then(|val| match val.parse::<WideningPolicy>() {
                Ok(policy) => Some(policy),
                Err(e) => {
                    tracing::warn!(
                        subsystem = "search",
                        component = "config",
                        value = %val,
                        error = %e,
                        "Ignoring invalid SEARCH_WIDENING"
                    );
                    None
                }
            })
            .unwrap_or_default();

        Self {
            text_index: parse_bool_env("SEARCH_TEXT_INDEX", true),
            widening,
        }
    }

    /// Regex-only configuration: skip the text stage entirely.
    pub fn regex_only() -> Self {
        Self {
            text_index: false,
            ..Self::default()
        }
    }
}

/// Parses a boolean environment variable with a default fallback.
///
/// Recognizes "true", "1", "yes", "on" and "false", "0", "no", "off"
/// (case-insensitive). Any other value or a missing variable returns the default.
pub fn parse_bool_env(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .and_then(|val| parse_bool(&val))
        .unwrap_or(default)
}

/// Parse a lenient boolean string.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
