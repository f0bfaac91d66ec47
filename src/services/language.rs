//! Script-based language detection for native titles.
//!
//! Each supported language has a character-class test. Script tests for
//! requested languages run first, then the remaining scripts (non-Latin blocks
//! before Latin diacritic sets). The ASCII-only rule is permissive, so it runs
//! last and only resolves to English when English is acceptable.

use once_cell::sync::Lazy;
use regex::Regex;

/// Fallback language when nothing was requested
pub const DEFAULT_LANGUAGE: &str = "en";

static SCRIPT_DETECTORS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("ko", r"[\x{AC00}-\x{D7AF}\x{1100}-\x{11FF}\x{3130}-\x{318F}]"),
        ("ja", r"[\x{3040}-\x{309F}\x{30A0}-\x{30FF}\x{4E00}-\x{9FAF}]"),
        ("hi", r"[\x{0900}-\x{097F}]"),
        ("ur", r"[\x{0600}-\x{06FF}]"),
        ("de", r"[ÄäÖöÜüß]"),
        ("fr", r"(?i)[àâäéèêëîïôöùûüÿçœæ]"),
        ("es", r"(?i)[áéíóúüñ¿¡]"),
    ]
    .into_iter()
    .map(|(code, pattern)| (code, Regex::new(pattern).expect("script pattern")))
    .collect()
});

static ASCII_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[a-zA-Z0-9\s.,!?'"():;&-]+$"#).expect("ascii title pattern")
});

fn script_matches(code: &str, title: &str) -> bool {
    SCRIPT_DETECTORS
        .iter()
        .any(|(lang, re)| *lang == code && re.is_match(title))
}

/// Resolves the language of a native title.
///
/// Never fails: undetectable titles fall back to the first requested
/// language, or English.
pub fn detect_language(title: &str, requested: &[String]) -> String {
    if let Some(code) = requested.iter().find(|code| script_matches(code, title)) {
        return code.clone();
    }

    if let Some((code, _)) = SCRIPT_DETECTORS
        .iter()
        .find(|(code, re)| !requested.iter().any(|r| r.as_str() == *code) && re.is_match(title))
    {
        return code.to_string();
    }

    let english_allowed = requested.is_empty() || requested.iter().any(|r| r == DEFAULT_LANGUAGE);
    if english_allowed && ASCII_TITLE.is_match(title) {
        return DEFAULT_LANGUAGE.to_string();
    }

    requested
        .first()
        .cloned()
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

/// Display name used in prompts
pub fn language_name(code: &str) -> &str {
    match code {
        "de" => "German",
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "hi" => "Hindi",
        "ja" => "Japanese",
        "ko" => "Korean",
        "ur" => "Urdu",
        "zh" => "Chinese",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "ar" => "Arabic",
        "tr" => "Turkish",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_detects_non_latin_scripts() {
        assert_eq!(detect_language("기생충", &[]), "ko");
        assert_eq!(detect_language("千と千尋の神隠し", &[]), "ja");
        assert_eq!(detect_language("दंगल", &[]), "hi");
        assert_eq!(detect_language("خوبصورت", &[]), "ur");
    }

    #[test]
    fn test_ascii_title_is_english_when_allowed() {
        assert_eq!(detect_language("The Godfather", &[]), "en");
        assert_eq!(detect_language("Inception", &langs(&["en", "ko"])), "en");
        assert_eq!(detect_language("Steins;Gate", &[]), "en");
    }

    #[test]
    fn test_ascii_title_defaults_to_requested_language() {
        assert_eq!(detect_language("Parasite", &langs(&["ko"])), "ko");
        assert_eq!(detect_language("Oldboy", &langs(&["ko", "ja"])), "ko");
    }

    #[test]
    fn test_requested_latin_language_wins_shared_diacritics() {
        // "é" belongs to both the French and the Spanish sets
        assert_eq!(detect_language("Amélie", &langs(&["fr"])), "fr");
        assert_eq!(detect_language("Amélie", &langs(&["es"])), "es");
    }

    #[test]
    fn test_german_before_other_latin_sets() {
        assert_eq!(detect_language("Das Leben der Anderen", &langs(&["de"])), "de");
        assert_eq!(detect_language("Die fabelhafte Welt der Amélie", &[]), "fr");
        assert_eq!(detect_language("Der Untergang ß", &[]), "de");
    }

    #[test]
    fn test_undetectable_falls_back() {
        assert_eq!(detect_language("Léon #2", &[]), "fr");
        assert_eq!(detect_language("Ω", &[]), "en");
        assert_eq!(detect_language("Ω", &langs(&["hi"])), "hi");
    }

    #[test]
    fn test_language_name() {
        assert_eq!(language_name("ko"), "Korean");
        assert_eq!(language_name("xx"), "xx");
    }
}
