//! Prompt construction for the completion chain.
//!
//! Every prompt asks for the one-line-per-title grammar the extractor parses,
//! and shows worked examples in that grammar.

use crate::{
    models::{MediaType, PreferenceSpec, PreviousRecommendation, MAX_RESULTS},
    services::language::language_name,
};

/// Worked examples keyed by plot theme; chosen when the plot text mentions a keyword
const PLOT_EXAMPLES: &[(&[&str], &[&str])] = &[
    (
        &["revenge", "vengeance"],
        &[
            "* 올드보이 (Oldboy) (2003) - A man imprisoned for 15 years seeks revenge against his mysterious captor, uncovering shocking truths. EXACT MATCH for revenge theme - the entire plot revolves around revenge and its consequences. | Genres: Mystery, Thriller, Drama",
            "* Lady Vengeance (2005) - A woman wrongfully imprisoned plots an elaborate revenge against the man who framed her. CLOSE MATCH - focuses on meticulous revenge planning and execution. | Genres: Crime, Drama, Thriller",
        ],
    ),
    (
        &["time travel", "time-travel", "time loop"],
        &[
            "* 時をかける少女 (The Girl Who Leapt Through Time) (2006) - A high school girl discovers she can jump through time, but learns that changing the past has consequences. EXACT MATCH - the entire plot revolves around time travel and its effects. | Genres: Animation, Sci-Fi, Romance",
            "* Steins;Gate (2011) - A self-proclaimed mad scientist accidentally invents a way to message the past, with devastating consequences. CLOSE MATCH - explores time travel mechanics and consequences. | Genres: Sci-Fi, Thriller, Drama",
        ],
    ),
    (
        &["coming of age", "coming-of-age", "growing up"],
        &[
            "* Les Quatre Cents Coups (The 400 Blows) (1959) - A troubled young boy in Paris struggles with family and school while seeking his own path. EXACT MATCH - the entire film follows a boy's journey toward adulthood. | Genres: Drama",
            "* 3 Idiots (2009) - Three engineering students challenge the academic system while discovering their passions. CLOSE MATCH - follows young adults finding their place in the world. | Genres: Comedy, Drama",
        ],
    ),
];

/// Worked examples per language code
const LANGUAGE_EXAMPLES: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "* The Godfather (1972) - A crime family's patriarch transfers control to his reluctant son. Similar to 'Goodfellas' in its portrayal of organized crime. | Genres: Crime, Drama",
            "* Inception (2010) - A skilled thief uses dream-sharing technology to plant ideas in people's minds. Similar to 'The Matrix' in its reality-bending concept. | Genres: Sci-Fi, Action, Thriller",
        ],
    ),
    (
        "ko",
        &[
            "* 기생충 (Parasite) (2019) - A poor family infiltrates a wealthy household, setting off events that mirror class inequality. Similar to 'Shoplifters' in examining social disparity. | Genres: Drama, Thriller",
            "* 아가씨 (The Handmaiden) (2016) - A tale of deception and romance in colonial Korea. Its twists recall 'Gone Girl'. | Genres: Drama, Romance, Thriller",
        ],
    ),
    (
        "ja",
        &[
            "* 千と千尋の神隠し (Spirited Away) (2001) - A young girl works in a supernatural bathhouse to save her parents. Explores identity and courage like 'Alice in Wonderland'. | Genres: Animation, Adventure, Fantasy",
            "* 七人の侍 (Seven Samurai) (1954) - Samurai defend a farming village from bandits. It inspired 'The Magnificent Seven'. | Genres: Action, Drama",
        ],
    ),
    (
        "hi",
        &[
            "* दंगल (Dangal) (2016) - A father trains his daughters to become champion wrestlers. Challenges gender norms like 'Million Dollar Baby'. | Genres: Drama, Sport",
            "* लगान (Lagaan) (2001) - A village stakes its future on a cricket match against colonial rulers. Pits sport against authority like 'The Longest Yard'. | Genres: Drama, Sport",
        ],
    ),
    (
        "fr",
        &[
            "* Amélie (2001) - A whimsical woman secretly improves the lives of those around her. Shares its warmth with 'Cinema Paradiso'. | Genres: Comedy, Romance",
            "* La Haine (1995) - Three friends drift through the Paris suburbs the day after a riot. Examines social tension like 'Do the Right Thing'. | Genres: Drama, Crime",
        ],
    ),
    (
        "de",
        &[
            "* Das Leben der Anderen (The Lives of Others) (2006) - A Stasi agent becomes invested in the lives of those he surveils. Similar to 'The Conversation' in its surveillance themes. | Genres: Drama, Thriller",
            "* Lola rennt (Run Lola Run) (1998) - A woman has 20 minutes to save her boyfriend. Its looping structure recalls 'Groundhog Day'. | Genres: Thriller, Action",
        ],
    ),
    (
        "es",
        &[
            "* El laberinto del fauno (Pan's Labyrinth) (2006) - A girl escapes into a dark fantasy world during the Spanish Civil War. Blends fantasy and harsh reality like 'Bridge to Terabithia'. | Genres: Fantasy, Drama, War",
            "* Todo sobre mi madre (All About My Mother) (1999) - A mother's journey after losing her son. Explores grief like 'Terms of Endearment'. | Genres: Drama",
        ],
    ),
    (
        "ur",
        &[
            "* خوبصورت (Khubsoorat) (2014) - A free spirit loosens a royal household's rigid ways. Shares its themes with 'The Sound of Music'. | Genres: Comedy, Romance",
            "* بول (Bol) (2011) - A family's struggle exposes gender inequality in society. Shares its themes with 'Water'. | Genres: Drama",
        ],
    ),
];

/// Kind of follow-up request built from a previous result list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    Different,
    Similar,
}

fn plot_examples(plot: &str) -> &'static [&'static str] {
    let plot = plot.to_lowercase();
    PLOT_EXAMPLES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| plot.contains(k)))
        .map(|(_, examples)| *examples)
        .unwrap_or(&[])
}

fn language_examples(languages: &[String]) -> Vec<&'static str> {
    languages
        .iter()
        .filter_map(|code| {
            LANGUAGE_EXAMPLES
                .iter()
                .find(|(lang, _)| *lang == code.as_str())
                .map(|(_, examples)| *examples)
        })
        .flatten()
        .copied()
        .collect()
}

fn language_list(languages: &[String]) -> String {
    if languages.is_empty() {
        return "Any".to_string();
    }
    languages
        .iter()
        .map(|code| format!("{} ({})", language_name(code), code))
        .collect::<Vec<_>>()
        .join(", ")
}

fn list_or_any(values: &[String]) -> String {
    if values.is_empty() {
        "Any".to_string()
    } else {
        values.join(", ")
    }
}

fn content_noun(spec: &PreferenceSpec) -> &'static str {
    match spec.media_types.as_slice() {
        [MediaType::Webseries] => "series",
        types if types.contains(&MediaType::Webseries) => "movies or series",
        _ => "movies",
    }
}

/// Full recommendation prompt for a preference spec
pub fn recommendation_prompt(spec: &PreferenceSpec) -> String {
    let noun = content_noun(spec);
    let mut sections = vec![format!(
        "You are an expert film curator with deep knowledge of global cinema. Provide EXACTLY {} {} recommendations that match the user's preferences, with special emphasis on plot and thematic elements.",
        MAX_RESULTS, noun
    )];

    let mut preferences = vec!["**User Preferences (In Priority Order):**".to_string()];

    if let Some(plot) = spec.plot_text() {
        preferences.push(format!(
            "- PLOT ELEMENTS (HIGHEST PRIORITY): \"{}\"\n  - Find titles where this plot element is central to the story\n  - Prefer EXACT matches where it is the main focus; otherwise CLOSE matches where it is significant\n  - State for each title whether it is an EXACT MATCH or a CLOSE MATCH",
            plot
        ));
    }

    let media: Vec<&str> = spec.media_types.iter().map(MediaType::as_str).collect();
    if !media.is_empty() {
        preferences.push(format!("- CONTENT TYPE: {}", media.join(", ")));
    }

    preferences.push(format!(
        "- LANGUAGES: {}\n  - Titles MUST be originally made in these languages\n  - Give the original title in its native script and the English title in parentheses",
        language_list(&spec.languages)
    ));
    preferences.push(format!("- GENRES: {}", list_or_any(&spec.genres)));

    if !spec.similar_titles.is_empty() {
        preferences.push(format!(
            "- SIMILAR TO: {}\n  - Consider plot structure, themes, tone and style",
            spec.similar_titles.join(", ")
        ));
    }

    if let Some(year) = &spec.year {
        preferences.push(format!(
            "- PREFERRED YEAR: {}\n  - Consider titles within 5 years if exact matches aren't found",
            year
        ));
    }

    if !spec.cast.is_empty() {
        preferences.push(format!("- NOTABLE CAST/CREW: {}", spec.cast.join(", ")));
    }

    if let Some(rating) = spec.min_rating {
        preferences.push(format!("- MINIMUM RATING: {}", rating));
    }

    preferences.push(format!(
        "- MATURE CONTENT: {}",
        if spec.allow_adult { "Allowed" } else { "Excluded" }
    ));

    let blocked: Vec<&str> = spec.blocked_titles().map(String::as_str).collect();
    if !blocked.is_empty() {
        preferences.push(format!("- DO NOT RECOMMEND: {}", blocked.join(", ")));
    }

    sections.push(preferences.join("\n"));

    sections.push(
        "**STRICT FORMAT RULES:**\n\
1. Each recommendation MUST be one line in this exact format:\n   \
* [Original Title] ([English Title if different]) ([Year]) - [Plot + Similarity Explanation] | Genres: [Genre1, Genre2, ...]\n\
2. Description: first sentence summarizes the plot, second explains why it matches the preferences\n\
3. For plot preferences, write EXACT MATCH or CLOSE MATCH in the description\n\
4. Start every line with \"* \" and put nothing else on the line"
            .to_string(),
    );

    let mut examples: Vec<&str> = spec.plot_text().map(plot_examples).unwrap_or(&[]).to_vec();
    examples.extend(language_examples(&spec.languages));
    if examples.is_empty() {
        examples = language_examples(&["en".to_string()]);
    }
    sections.push(format!(
        "**Examples of Correct Formatting:**\n{}",
        examples.join("\n")
    ));

    sections.push(format!(
        "**Critical Requirements:**\n\
1. Provide EXACTLY {} recommendations\n\
2. ALL recommendations MUST be in the requested languages and genres\n\
3. ALL recommendations MUST be real, existing titles listed on TMDB\n\
4. Prioritize plot and theme matching above everything else\n\
5. Prefer well-known, critically acclaimed titles\n\
6. Prefer EXACT matches over CLOSE matches when both are available",
        MAX_RESULTS
    ));

    sections.push("Begin your recommendations now, following the format exactly:".to_string());

    sections.join("\n\n")
}

/// Prompt for "more like these" / "something different from these"
pub fn follow_up_prompt(
    mode: FollowUp,
    previous: &[PreviousRecommendation],
    spec: &PreferenceSpec,
) -> String {
    let listed: Vec<String> = previous
        .iter()
        .enumerate()
        .map(|(i, movie)| {
            format!(
                "{}. {} ({}) - {}",
                i + 1,
                movie.title,
                movie.year_label(),
                movie.overview.as_deref().unwrap_or_default()
            )
        })
        .collect();

    let (intro, goals, explanation) = match mode {
        FollowUp::Different => (
            "I want recommendations that are different from these titles:",
            "1. Offer a fresh perspective or unique take on the genres\n\
2. Keep similar quality but explore different themes or styles\n\
3. Could appeal to someone who enjoys the titles above but wants something new\n\
4. Are NOT the titles listed above or close variations of them",
            "explaining how it offers a fresh perspective while still appealing to fans of the titles above",
        ),
        FollowUp::Similar => (
            "I want recommendations similar to these titles:",
            "1. Share themes, atmosphere or storytelling style with the titles above\n\
2. Come from the same genres or blend of genres\n\
3. Have similar critical reception\n\
4. Are NOT the titles listed above",
            "explaining why it is similar to the titles above",
        ),
    };

    let mut criteria = vec![
        format!("   - Languages: {}", language_list(&spec.languages)),
        format!("   - Genres: {}", list_or_any(&spec.genres)),
    ];
    if let Some(plot) = spec.plot_text() {
        criteria.push(format!("   - Plot elements: {}", plot));
    }
    if let Some(year) = &spec.year {
        criteria.push(format!("   - Preferred year: {}", year));
    }

    format!(
        "You are an expert film curator. {}\n\n{}\n\nPlease recommend {} DIFFERENT {} that:\n{}\n5. Still match the original preferences:\n{}\n\nFormat each recommendation as one line exactly like:\n* Original Title (English Title) (Year) - Brief description {}. | Genres: Genre1, Genre2",
        intro,
        listed.join("\n"),
        MAX_RESULTS,
        content_noun(spec),
        goals,
        criteria.join("\n"),
        explanation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearPreference;

    fn spec() -> PreferenceSpec {
        PreferenceSpec {
            media_types: vec![MediaType::Movie],
            languages: vec!["ko".to_string(), "en".to_string()],
            genres: vec!["Thriller".to_string()],
            plot: Some("a story of Revenge".to_string()),
            year: Some(YearPreference::Range(2000, 2010)),
            ..Default::default()
        }
    }

    #[test]
    fn test_prompt_includes_preferences() {
        let prompt = recommendation_prompt(&spec());
        assert!(prompt.contains("PLOT ELEMENTS (HIGHEST PRIORITY): \"a story of Revenge\""));
        assert!(prompt.contains("Korean (ko), English (en)"));
        assert!(prompt.contains("PREFERRED YEAR: 2000-2010"));
        assert!(prompt.contains("MATURE CONTENT: Excluded"));
        assert!(!prompt.contains("MINIMUM RATING"));
    }

    #[test]
    fn test_examples_follow_plot_and_languages() {
        let prompt = recommendation_prompt(&spec());
        let oldboy = prompt.find("올드보이 (Oldboy)").unwrap();
        let parasite = prompt.find("기생충 (Parasite)").unwrap();
        let godfather = prompt.find("The Godfather").unwrap();
        assert!(oldboy < parasite && parasite < godfather);
        assert!(!prompt.contains("Spirited Away"));
    }

    #[test]
    fn test_plot_keywords() {
        assert_eq!(plot_examples("Time travel paradox").len(), 2);
        assert_eq!(plot_examples("a COMING-OF-AGE tale").len(), 2);
        assert!(plot_examples("heist").is_empty());
    }

    #[test]
    fn test_blocked_titles_listed() {
        let mut spec = spec();
        spec.exclude_titles = vec!["Oldboy".to_string()];
        let prompt = recommendation_prompt(&spec);
        assert!(prompt.contains("DO NOT RECOMMEND: Oldboy"));
    }

    #[test]
    fn test_follow_up_lists_previous_titles() {
        let previous = vec![
            PreviousRecommendation {
                title: "Oldboy".to_string(),
                release_date: Some("2003-11-21".to_string()),
                overview: Some("A man seeks revenge.".to_string()),
            },
            PreviousRecommendation {
                title: "Mother".to_string(),
                ..Default::default()
            },
        ];

        let prompt = follow_up_prompt(FollowUp::Different, &previous, &spec());
        assert!(prompt.contains("1. Oldboy (2003) - A man seeks revenge."));
        assert!(prompt.contains("2. Mother (N/A) - "));
        assert!(prompt.contains("different from these titles"));
        assert!(prompt.contains("- Plot elements: a story of Revenge"));

        let similar = follow_up_prompt(FollowUp::Similar, &previous, &PreferenceSpec::default());
        assert!(similar.contains("similar to these titles"));
        assert!(similar.contains("- Languages: Any"));
    }
}
