//! Site languages.
//!
//! The site is published in Spanish (the default) and English. Language codes
//! arrive from cookies and URLs, so parsing is lenient: anything that is not a
//! recognised code falls back to [`Language::Es`] instead of failing.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A language the site content can be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Spanish. Base (untranslated) columns hold Spanish text.
    #[default]
    Es,
    /// English. Read from `<field>_en` columns when present.
    En,
}

impl Language {
    /// Every supported language, default first.
    pub const ALL: [Language; 2] = [Language::Es, Language::En];

    /// The two-letter code used in cookies and URLs.
    pub fn code(self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }

    /// Parse a code, returning `None` for anything unrecognised.
    ///
    /// Used where an explicit choice is being made (e.g. `/set_language/{lang}`)
    /// and an unknown value must be ignored rather than silently mapped.
    pub fn parse_strict(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "es" => Some(Self::Es),
            "en" => Some(Self::En),
            _ => None,
        }
    }

    /// Parse a code, falling back to the default language.
    ///
    /// # Examples
    ///
    /// ```
    /// use farmavet_core::Language;
    ///
    /// assert_eq!(Language::from_code("en"), Language::En);
    /// assert_eq!(Language::from_code(" EN "), Language::En);
    /// assert_eq!(Language::from_code("fr"), Language::Es);
    /// assert_eq!(Language::from_code(""), Language::Es);
    /// ```
    pub fn from_code(code: &str) -> Self {
        Self::parse_strict(code).unwrap_or_default()
    }

    /// Whether translated (`_en`) columns should be preferred.
    pub fn is_english(self) -> bool {
        matches!(self, Self::En)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_code(s))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_spanish() {
        assert_eq!(Language::default(), Language::Es);
    }

    #[test]
    fn test_code_roundtrip() {
        for lang in Language::ALL {
            assert_eq!(Language::from_code(lang.code()), lang);
        }
    }

    #[test]
    fn test_unknown_code_falls_back() {
        assert_eq!(Language::from_code("pt"), Language::Es);
        assert_eq!(Language::from_code("english"), Language::Es);
        assert_eq!("de".parse::<Language>().unwrap(), Language::Es);
    }

    #[test]
    fn test_parse_strict_rejects_unknown() {
        assert_eq!(Language::parse_strict("en"), Some(Language::En));
        assert_eq!(Language::parse_strict("xx"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Language::En.to_string(), "en");
        assert_eq!(Language::Es.to_string(), "es");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Language::En).unwrap();
        assert_eq!(json, "\"en\"");
        let lang: Language = serde_json::from_str("\"es\"").unwrap();
        assert_eq!(lang, Language::Es);
    }
}
