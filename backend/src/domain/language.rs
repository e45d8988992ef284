//! Supported interface languages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Language a member reads the site and their emails in.
///
/// English is the default; Indonesian is the community's primary language.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English (`en`).
    #[default]
    En,
    /// Indonesian (`id`).
    Id,
}

impl Language {
    /// Two-letter code used in URLs and storage.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Id => "id",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when a language code is not supported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language '{0}'; expected 'en' or 'id'")]
pub struct UnsupportedLanguage(pub String);

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "id" => Ok(Self::Id),
            _ => Err(UnsupportedLanguage(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("en", Language::En)]
    #[case("ID", Language::Id)]
    #[case(" id ", Language::Id)]
    fn parses_known_codes(#[case] raw: &str, #[case] expected: Language) {
        assert_eq!(raw.parse::<Language>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_codes() {
        assert!("fr".parse::<Language>().is_err());
    }

    #[rstest]
    fn serialises_lowercase() {
        let value = serde_json::to_value(Language::Id).expect("serialise");
        assert_eq!(value, serde_json::json!("id"));
    }
}
