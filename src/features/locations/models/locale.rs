use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::shared::validation::LOCALE_TAG_REGEX;

/// Locales a translation may be stored in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ru,
    Tg,
    En,
}

impl Locale {
    pub const SUPPORTED: [Locale; 3] = [Locale::Ru, Locale::Tg, Locale::En];

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Ru => "ru",
            Locale::Tg => "tg",
            Locale::En => "en",
        }
    }

    /// Lenient parse of a client-supplied tag: case-insensitive, region and
    /// script subtags are ignored (`ru-RU`, `ru_RU` and `RU` all give `Ru`).
    /// Returns `None` for anything outside the supported set.
    pub fn parse(tag: &str) -> Option<Locale> {
        let tag = tag.trim();
        if !LOCALE_TAG_REGEX.is_match(tag) {
            return None;
        }
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        Locale::SUPPORTED
            .into_iter()
            .find(|locale| locale.as_str() == language)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::parse(s).ok_or_else(|| {
            format!(
                "Unsupported locale '{}', expected one of: ru, tg, en",
                s.trim()
            )
        })
    }
}
