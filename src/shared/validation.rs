use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Regex for locale tags accepted from clients before normalization
    /// Language subtag, optionally followed by region/script subtags separated by '-' or '_'
    /// - Valid: "ru", "tg", "en-US", "ru_RU", "zh-Hans-CN"
    /// - Invalid: "", "r", "ru--RU", "ru RU", "1ru"
    pub static ref LOCALE_TAG_REGEX: Regex =
        Regex::new(r"^[A-Za-z]{2,3}(?:[-_][A-Za-z0-9]{2,8})*$").unwrap();
}

/// Rejects strings that are empty once surrounding whitespace is removed
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }
    Ok(())
}
