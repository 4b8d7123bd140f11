// src/services/scoring.rs

use std::collections::HashSet;

/// Separators kept between tokens: space, tab, LF, VT, FF, CR. Other Unicode
/// spaces (e.g. U+00A0) are dropped like any other symbol.
fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Folds text into its set of distinct lowercase alphanumeric tokens.
///
/// Everything outside `[a-z0-9]` and the separators is dropped after lowercasing,
/// so "Paris," and "paris" land on the same token.
fn token_set(text: &str) -> HashSet<String> {
    let folded: String = text
        .to_lowercase()
        .chars()
        .filter(|&c| c.is_ascii_lowercase() || c.is_ascii_digit() || is_separator(c))
        .collect();

    folded
        .split(is_separator)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Word-overlap similarity between a reference answer and a submitted one.
///
/// Returns the share of reference tokens present in the candidate, as an
/// integer percentage in `0..=100`. The ratio is taken over the reference
/// set only, so the score is not symmetric in its arguments.
///
/// An empty reference scores 100 against an empty candidate and 0 otherwise.
pub fn similarity_score(reference: &str, candidate: &str) -> u8 {
    let reference_tokens = token_set(reference);
    let candidate_tokens = token_set(candidate);

    if reference_tokens.is_empty() {
        return if candidate_tokens.is_empty() { 100 } else { 0 };
    }

    let shared = reference_tokens.intersection(&candidate_tokens).count();
    let score = (shared as f64 * 100.0) / reference_tokens.len() as f64;

    score.round().clamp(0.0, 100.0) as u8
}
