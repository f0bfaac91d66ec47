//! Turns free-text model output into candidate records.
//!
//! Grammar, one recommendation per line:
//!
//! ```text
//! [N.] * <title> [(<secondary title>)] (<YYYY>[-YYYY|-present]) - <description> | Genres: <g1>, <g2>
//! ```
//!
//! The description may carry an uppercase `EXACT MATCH` / `CLOSE MATCH`
//! annotation anywhere; it becomes the candidate's match quality and is cut
//! from the stored text. Lowercase wording is ordinary prose. Lines that don't follow the grammar are ignored.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    error::{AppError, AppResult},
    models::{MatchQuality, MediaType, RawCandidate},
    services::language::detect_language,
};

static RECOMMENDATION_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:\d+[.)][ \t]*)?[*•]+[ \t]*(?P<title>[^()\n]+?)(?:[ \t]*\((?P<secondary>[^()\n]+?)\))?[ \t]*\((?P<year>\d{4})(?:[ \t]*[-–][ \t]*(?:\d{4}|[Pp]resent))?\)[ \t]*[-–—:][ \t]*(?P<description>[^|\n]+?)[ \t]*\|[ \t]*(?i:genres?)[ \t]*:[ \t]*(?P<genres>[^\n]+)",
    )
    .expect("recommendation line pattern")
});

static MATCH_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[ \t]*[-–—][ \t]*)?\b(EXACT|CLOSE)[ \t]+MATCH\b")
        .expect("match marker pattern")
});

const TITLE_TRIM: &[char] = &['*', '_', '"', '\'', ',', ';', ':', '-', '–', '—', ' ', '\t', '\r'];
const SEPARATOR_TRIM: &[char] = &['-', '–', '—', ':', ',', ' ', '\t', '\r'];
const GENRE_TRIM: &[char] = &['*', '_', '.', ';', ' ', '\t', '\r'];

/// Parses every well-formed recommendation line in `text`.
///
/// With `languages` non-empty, candidates whose detected language is not
/// requested are dropped. Fails with [`AppError::ParseFailure`] when nothing
/// survives.
pub fn extract_candidates(
    text: &str,
    languages: &[String],
    media_types: &[MediaType],
) -> AppResult<Vec<RawCandidate>> {
    let mut candidates: Vec<RawCandidate> = Vec::new();
    let mut seen = HashSet::new();

    for caps in RECOMMENDATION_LINE.captures_iter(text) {
        let title = clean_title(&caps["title"]);
        let secondary_title = caps
            .name("secondary")
            .map(|m| clean_title(m.as_str()))
            .filter(|s| !s.is_empty() && *s != title);
        let year = caps["year"].trim().to_string();
        let (description, match_quality) = split_match_marker(&caps["description"]);
        let genres = split_genres(&caps["genres"]);

        if title.is_empty() || year.is_empty() || description.is_empty() || genres.is_empty() {
            tracing::debug!(
                title = %title,
                year = %year,
                genres = genres.len(),
                "Skipping incomplete recommendation line"
            );
            continue;
        }

        let language = detect_language(&title, languages);
        if !languages.is_empty() && !languages.contains(&language) {
            tracing::debug!(
                title = %title,
                language = %language,
                "Skipping recommendation in unrequested language"
            );
            continue;
        }

        let mut candidate = RawCandidate {
            title,
            secondary_title,
            year,
            description,
            genres,
            language,
            match_quality,
            position: candidates.len(),
        };

        if !seen.insert(candidate.dedup_key()) {
            tracing::debug!(title = %candidate.title, "Skipping duplicate recommendation");
            continue;
        }

        candidate.position = candidates.len();
        candidates.push(candidate);
    }

    tracing::info!(
        parsed = candidates.len(),
        languages = ?languages,
        media_types = ?media_types,
        "Extracted candidates from completion text"
    );

    if candidates.is_empty() {
        return Err(AppError::ParseFailure(
            "no well-formed recommendation lines in model output".to_string(),
        ));
    }

    Ok(candidates)
}

fn clean_title(raw: &str) -> String {
    collapse_whitespace(raw.trim_matches(TITLE_TRIM))
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn split_genres(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|g| g.trim_matches(GENRE_TRIM))
        .filter(|g| !g.is_empty())
        .map(collapse_whitespace)
        .collect()
}

/// Separates the EXACT/CLOSE MATCH annotation from a description.
///
/// The annotation opens the "why it matches" part, so the description is cut
/// where it starts. A description that begins with the annotation only loses
/// the marker itself.
fn split_match_marker(raw: &str) -> (String, Option<MatchQuality>) {
    let raw = raw.trim();
    let Some(caps) = MATCH_MARKER.captures(raw) else {
        return (collapse_whitespace(raw), None);
    };

    let quality = if &caps[1] == "EXACT" {
        MatchQuality::Exact
    } else {
        MatchQuality::Close
    };

    let Some(marker) = caps.get(0) else {
        return (collapse_whitespace(raw), Some(quality));
    };

    let before = raw[..marker.start()].trim_end_matches(SEPARATOR_TRIM);
    let description = if before.is_empty() {
        raw[marker.end()..].trim_start_matches(SEPARATOR_TRIM)
    } else {
        before
    };

    (collapse_whitespace(description), Some(quality))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn langs(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    const MIXED_RESPONSE: &str = "Here are my picks:\n\n\
* 올드보이 (Oldboy) (2003) - A man imprisoned for 15 years seeks revenge against his mysterious captor, uncovering shocking truths. EXACT MATCH for revenge theme - the entire plot revolves around revenge. | Genres: Mystery, Thriller, Drama\n\
* Lady Vengeance (2005) - A woman wrongfully imprisoned plots an elaborate revenge. CLOSE MATCH - focuses on meticulous revenge planning. | Genres: Crime, Drama, Thriller\n\
* 기생충 (Parasite) (2019) - A poor family infiltrates a wealthy household. | Genres: Drama, Thriller\n\
Enjoy!";

    #[test]
    fn test_parasite_scenario() {
        let text = "* Parasite (2019) - A poor family infiltrates a wealthy household. | Genres: Drama, Thriller";
        let candidates = extract_candidates(text, &langs(&["ko"]), &[]).unwrap();

        assert_eq!(candidates.len(), 1);
        let parasite = &candidates[0];
        assert_eq!(parasite.title, "Parasite");
        assert_eq!(parasite.secondary_title, None);
        assert_eq!(parasite.year, "2019");
        assert_eq!(parasite.description, "A poor family infiltrates a wealthy household.");
        assert_eq!(parasite.genres, vec!["Drama", "Thriller"]);
        // Latin title, Korean requested: defaults to the requested language
        assert_eq!(parasite.language, "ko");
        assert_eq!(parasite.match_quality, None);
        assert_eq!(parasite.position, 0);
    }

    #[test]
    fn test_native_and_secondary_titles() {
        let candidates = extract_candidates(MIXED_RESPONSE, &[], &[]).unwrap();
        assert_eq!(candidates.len(), 3);

        assert_eq!(candidates[0].title, "올드보이");
        assert_eq!(candidates[0].secondary_title.as_deref(), Some("Oldboy"));
        assert_eq!(candidates[0].language, "ko");

        assert_eq!(candidates[2].title, "기생충");
        assert_eq!(candidates[2].secondary_title.as_deref(), Some("Parasite"));
        assert_eq!(candidates[2].position, 2);
    }

    #[test]
    fn test_match_markers_extracted_and_stripped() {
        let candidates = extract_candidates(MIXED_RESPONSE, &[], &[]).unwrap();

        assert_eq!(candidates[0].match_quality, Some(MatchQuality::Exact));
        assert_eq!(
            candidates[0].description,
            "A man imprisoned for 15 years seeks revenge against his mysterious captor, uncovering shocking truths."
        );

        assert_eq!(candidates[1].match_quality, Some(MatchQuality::Close));
        assert_eq!(
            candidates[1].description,
            "A woman wrongfully imprisoned plots an elaborate revenge."
        );
        assert!(!candidates[1].description.contains("MATCH"));
    }

    #[test]
    fn test_leading_marker_keeps_description() {
        let text = "* Memento (2000) - EXACT MATCH - A man with short-term memory loss hunts his wife's killer. | Genres: Mystery, Thriller";
        let candidates = extract_candidates(text, &[], &[]).unwrap();
        assert_eq!(candidates[0].match_quality, Some(MatchQuality::Exact));
        assert_eq!(
            candidates[0].description,
            "A man with short-term memory loss hunts his wife's killer."
        );
    }

    #[test]
    fn test_lowercase_match_wording_is_prose() {
        let text = "* Memories of Murder (2003) - Two detectives hunt a serial killer and find a close match between the victims. | Genres: Crime, Thriller";
        let candidates = extract_candidates(text, &[], &[]).unwrap();
        assert_eq!(candidates[0].match_quality, None);
        assert_eq!(
            candidates[0].description,
            "Two detectives hunt a serial killer and find a close match between the victims."
        );
    }

    #[test]
    fn test_language_filter_drops_unrequested() {
        let candidates = extract_candidates(MIXED_RESPONSE, &langs(&["ko"]), &[]).unwrap();
        // "Lady Vengeance" is ASCII-only and resolves to the requested language
        assert_eq!(candidates.len(), 3);
        assert!(candidates.iter().all(|c| c.language == "ko"));

        let japanese = extract_candidates(MIXED_RESPONSE, &langs(&["ja"]), &[]).unwrap();
        assert_eq!(japanese.len(), 1);
        assert_eq!(japanese[0].title, "Lady Vengeance");
        assert_eq!(japanese[0].position, 0);
    }

    #[test]
    fn test_duplicate_titles_collapse() {
        let text = "* Inception (2010) - A thief plants ideas in dreams. | Genres: Sci-Fi\n\
* INCEPTION (2010) - Dream heist, again. | Genres: Action\n\
* Inception (2011) - A different year is a different entry. | Genres: Drama";
        let candidates = extract_candidates(text, &[], &[]).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].description, "A thief plants ideas in dreams.");
        assert_eq!(candidates[1].year, "2011");
        assert_eq!(candidates[1].position, 1);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let first = extract_candidates(MIXED_RESPONSE, &[], &[]).unwrap();
        let second = extract_candidates(MIXED_RESPONSE, &[], &[]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_incomplete_lines_skipped() {
        let text = "* Empty Genres (2001) - Has a description. | Genres: , ,\n\
* Solaris (1972) - A psychologist visits a space station orbiting a strange planet. | Genres: Drama, Sci-Fi.";
        let candidates = extract_candidates(text, &[], &[]).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Solaris");
        assert_eq!(candidates[0].genres, vec!["Drama", "Sci-Fi"]);
    }

    #[test]
    fn test_numbered_bold_and_series_years() {
        let text = "1. **Breaking Bad** (2008-2013) - A chemistry teacher turns to making meth. | Genres: Crime, Drama\n\
2. * Dark (2017-present) – A missing child exposes a time-travel conspiracy. | genres: Sci-Fi, Mystery";
        let candidates = extract_candidates(text, &[], &[MediaType::Webseries]).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].title, "Breaking Bad");
        assert_eq!(candidates[0].year, "2008");
        assert_eq!(candidates[1].title, "Dark");
        assert_eq!(candidates[1].year, "2017");
    }

    #[test]
    fn test_unparseable_text_fails() {
        let result = extract_candidates("Sorry, I can't help with that.", &[], &[]);
        assert!(matches!(result, Err(AppError::ParseFailure(_))));
    }

    #[test]
    fn test_everything_filtered_fails() {
        let text = "* 千と千尋の神隠し (Spirited Away) (2001) - A girl works in a spirit bathhouse. | Genres: Animation";
        let result = extract_candidates(text, &langs(&["ko"]), &[]);
        assert!(matches!(result, Err(AppError::ParseFailure(_))));
    }
}
