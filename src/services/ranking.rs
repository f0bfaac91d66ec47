//! Final ordering of enriched results.

use std::collections::HashSet;

use crate::models::{EnrichedResult, MatchQuality, MAX_RESULTS};

/// Drops results whose catalog id was already seen; first occurrence wins
pub fn dedupe_by_id(results: Vec<EnrichedResult>) -> Vec<EnrichedResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|result| seen.insert(result.id.clone()))
        .collect()
}

/// Orders results and caps them at [`MAX_RESULTS`].
///
/// Sort keys: match tag (exact, close, none), then whether the result's
/// language was requested, then the model's own ordering. The sort is stable.
/// With several requested languages the list is rebalanced so each language
/// gets a fair share before leftovers fill the remaining slots.
pub fn rank_results(
    mut results: Vec<EnrichedResult>,
    requested_languages: &[String],
) -> Vec<EnrichedResult> {
    results.sort_by_key(|result| {
        (
            MatchQuality::rank(result.match_type),
            !requested_languages.contains(&result.language),
            result.relevance_position,
        )
    });

    if requested_languages.len() > 1 {
        results = rebalance_languages(results, requested_languages);
    }

    results.truncate(MAX_RESULTS);
    results
}

/// Reorders results by title edit distance to a search query; ties keep
/// their current order
pub fn sort_by_title_distance(results: &mut [EnrichedResult], query: &str) {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return;
    }
    results.sort_by_cached_key(|result| strsim::levenshtein(&result.title.to_lowercase(), &query));
}

/// Picks up to `ceil(MAX_RESULTS / n)` results per requested language (in
/// request order), backfills from the highest-ranked leftovers, and keeps
/// the ranked order in the output.
fn rebalance_languages(
    ranked: Vec<EnrichedResult>,
    requested_languages: &[String],
) -> Vec<EnrichedResult> {
    let quota = MAX_RESULTS.div_ceil(requested_languages.len());
    let mut chosen = vec![false; ranked.len()];
    let mut picked = 0;

    for language in requested_languages {
        let mut taken = 0;
        for (index, result) in ranked.iter().enumerate() {
            if picked == MAX_RESULTS || taken == quota {
                break;
            }
            if !chosen[index] && &result.language == language {
                chosen[index] = true;
                taken += 1;
                picked += 1;
            }
        }
    }

    for flag in chosen.iter_mut() {
        if picked == MAX_RESULTS {
            break;
        }
        if !*flag {
            *flag = true;
            picked += 1;
        }
    }

    ranked
        .into_iter()
        .zip(chosen)
        .filter_map(|(result, keep)| keep.then_some(result))
        .collect()
}
