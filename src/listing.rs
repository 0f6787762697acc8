//! Listing and search policy for the note collection.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use log::debug;

use crate::Note;

/// Selects the notes whose title or content contains `query`, case
/// insensitively, favorites first. An empty query selects every note.
/// The sort is stable, so within each group notes keep their input order.
pub fn filter_notes<'a>(notes: impl Iterator<Item = &'a Note>, query: &str) -> Vec<&'a Note> {
    let needle = query.to_lowercase();

    let mut matched: Vec<&Note> = notes
        .filter(|note| {
            needle.is_empty()
                || note.title.to_lowercase().contains(&needle)
                || note.content.to_lowercase().contains(&needle)
        })
        .collect();

    matched.sort_by(|a, b| b.favorite.cmp(&a.favorite));
    matched
}

/// Collapses content to a single line and truncates it for listings.
/// Truncation counts characters, so multi-byte content is never split.
pub fn preview(content: &str, max_chars: usize) -> String {
    let flat = content.split_whitespace().collect::<Vec<_>>().join(" ");

    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

/// Ranks notes against `query` with fuzzy matching and returns them best
/// match first. Non-matches are dropped.
pub fn search_ranked<'a>(notes: impl Iterator<Item = &'a Note>, query: &str) -> Vec<&'a Note> {
    let matcher = SkimMatcherV2::default();

    struct Scored<'a> {
        note: &'a Note,
        score: i64,
    }

    let mut matched: Vec<Scored> = Vec::new();

    for note in notes {
        // Title matches are weighted more heavily
        let title_score = matcher.fuzzy_match(&note.title, query).unwrap_or(0);
        let content_score = matcher.fuzzy_match(&note.content, query).unwrap_or(0);
        let score = title_score * 2 + content_score;

        if score > 0 {
            matched.push(Scored { note, score });
        }
    }

    debug!("Fuzzy search for '{}' matched {} notes", query, matched.len());

    // Highest score first; the sort is stable so ties keep their order.
    matched.sort_by(|a, b| b.score.cmp(&a.score));

    matched.into_iter().map(|scored| scored.note).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn note(id: &str, title: &str, content: &str, favorite: bool) -> Note {
        let mut note = Note::new(id.to_string(), title.to_string(), content.to_string());
        note.favorite = favorite;
        note
    }

    fn ids(notes: &[&Note]) -> Vec<String> {
        notes.iter().map(|note| note.id.clone()).collect()
    }

    #[test]
    fn empty_query_selects_everything() {
        let notes = vec![
            note("1", "Compras", "pan", false),
            note("2", "Ideas", "leer", false),
        ];

        let listed = filter_notes(notes.iter(), "");
        assert_eq!(ids(&listed), ["1", "2"]);
    }

    #[test]
    fn filter_matches_title_and_content_case_insensitively() {
        let notes = vec![
            note("1", "COMPRAS", "pan", false),
            note("2", "Ideas", "ir de Compras", false),
            note("3", "Viaje", "maleta", false),
        ];

        let listed = filter_notes(notes.iter(), "compras");
        assert_eq!(ids(&listed), ["1", "2"]);
    }

    #[test]
    fn favorites_come_first_without_disturbing_ties() {
        let notes = vec![
            note("a", "uno", "", false),
            note("b", "dos", "", true),
            note("c", "tres", "", false),
            note("d", "cuatro", "", true),
        ];

        let listed = filter_notes(notes.iter(), "");
        assert_eq!(ids(&listed), ["b", "d", "a", "c"]);
    }

    #[test]
    fn preview_flattens_newlines_and_truncates_with_ellipsis() {
        assert_eq!(preview("línea uno\nlínea dos", 40), "línea uno línea dos");
        assert_eq!(preview("línea uno\nlínea dos", 7), "línea u...");
        assert_eq!(preview("", 10), "");
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        // Each ñ is two bytes; byte slicing here would panic.
        assert_eq!(preview("ññññññ", 4), "ññññ...");
    }

    #[test]
    fn search_prefers_title_matches_over_content_matches() {
        let notes = vec![
            note("1", "x", "apuntes de rust", false),
            note("2", "apuntes de rust", "", false),
        ];

        let ranked = search_ranked(notes.iter(), "rust");
        assert_eq!(ids(&ranked), ["2", "1"]);
    }

    #[test]
    fn search_drops_notes_that_do_not_match() {
        let notes = vec![note("1", "Compras", "pan", false)];
        assert!(search_ranked(notes.iter(), "zzzzzz").is_empty());
    }
}
