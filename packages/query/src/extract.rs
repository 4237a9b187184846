//! Query text to [`QueryIntent`] extraction.
//!
//! Locations are resolved longest-name-first by substring, then by fuzzy
//! matching single words against state names, then by substring against
//! rainfall subdivisions. Every accepted match claims its span of the
//! query so that a shorter name (or a single word) inside an already
//! matched longer name can never produce a second hit.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use samarth_query_models::{QueryIntent, YearWindow};
use samarth_vocabulary::{Vocabulary, most_recent_years};
use samarth_vocabulary::casing::title_case;
use samarth_vocabulary::fuzzy::closest_match;

use crate::ExtractionError;

/// A query resolves to at most this many locations.
pub const MAX_LOCATIONS: usize = 2;

/// Minimum similarity ratio for a single word to count as a state name.
pub const STATE_FUZZY_CUTOFF: f64 = 0.75;

/// Minimum similarity ratio for a single word to count as a crop name.
pub const CROP_FUZZY_CUTOFF: f64 = 0.75;

/// Top-N used when the query has no "top <n>" phrase.
pub const DEFAULT_TOP_N: usize = 3;

/// Year window used when the query has no year hint.
pub const DEFAULT_YEAR_WINDOW: usize = 3;

/// Upper clamp for "last N years".
pub const MAX_YEAR_WINDOW: usize = 10;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+").expect("valid regex"));

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:19|20)[0-9]{2}\b").expect("valid regex"));

static LAST_N_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\blast\s+([0-9]+)").expect("valid regex"));

static TOP_N_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\btop\s+([0-9]+)").expect("valid regex"));

/// Question vocabulary that is never fuzzy-matched against entity names.
///
/// "what" would otherwise clear the crop cutoff against "Wheat".
const STOP_WORDS: &[&str] = &[
    "a", "about", "an", "and", "annual", "average", "between", "by", "compare", "crop", "crops",
    "district", "districts", "during", "for", "from", "give", "had", "has", "have", "highest",
    "how", "in", "is", "last", "list", "lowest", "me", "most", "much", "of", "over", "production",
    "rainfall", "show", "tell", "than", "the", "top", "vs", "was", "were", "what", "which",
    "with", "year", "years",
];

/// Parses `query` into a structured intent.
///
/// `available_years` is the union of the years present in both datasets;
/// it drives the default and "last N" year windows.
///
/// # Errors
///
/// * [`ExtractionError::EmptyQuery`] if the query is blank.
/// * [`ExtractionError::NoLocationIdentified`] if no state or subdivision
///   could be matched.
pub fn extract(
    query: &str,
    vocabulary: &Vocabulary,
    available_years: &BTreeSet<i32>,
) -> Result<QueryIntent, ExtractionError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ExtractionError::EmptyQuery);
    }

    let lower = trimmed.to_lowercase();
    let words = words(&lower);
    let mut claims = Claims::default();

    let locations = resolve_locations(&lower, &words, vocabulary, &mut claims);
    if locations.is_empty() {
        log::info!("No location identified in query '{trimmed}'");
        return Err(ExtractionError::NoLocationIdentified {
            query: trimmed.to_string(),
        });
    }

    let crop = resolve_crop(&lower, &words, vocabulary, &claims);
    let (years, year_window) = resolve_years(&lower, available_years);
    let top_n = resolve_top_n(&lower);

    let wants_crops = lower.contains("crop") || crop.is_some();
    let wants_district_extremes = crop.is_some()
        && ["highest", "lowest", "district"]
            .iter()
            .any(|kw| lower.contains(kw));

    let intent = QueryIntent {
        comparison_mode: locations.len() >= MAX_LOCATIONS,
        locations,
        crop,
        years,
        year_window,
        top_n,
        wants_crops,
        wants_district_extremes,
    };

    log::debug!("Extracted intent: {intent:?}");

    Ok(intent)
}

/// A single alphabetic word of the lowercased query and its byte span.
struct Word<'a> {
    start: usize,
    end: usize,
    text: &'a str,
}

fn words(lower: &str) -> Vec<Word<'_>> {
    WORD_RE
        .find_iter(lower)
        .map(|m| Word {
            start: m.start(),
            end: m.end(),
            text: m.as_str(),
        })
        .collect()
}

fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Byte spans of the query already consumed by an accepted location.
#[derive(Default)]
struct Claims(Vec<(usize, usize)>);

impl Claims {
    fn overlaps(&self, start: usize, end: usize) -> bool {
        self.0.iter().any(|&(s, e)| start < e && s < end)
    }

    fn claim(&mut self, start: usize, end: usize) {
        self.0.push((start, end));
    }
}

/// First occurrence of `needle` in `haystack` that does not overlap a claim.
fn find_unclaimed(haystack: &str, needle: &str, claims: &Claims) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    haystack
        .match_indices(needle)
        .map(|(start, m)| (start, start + m.len()))
        .find(|&(start, end)| !claims.overlaps(start, end))
}

fn already_found(found: &[String], name: &str) -> bool {
    found.iter().any(|f| f.eq_ignore_ascii_case(name))
}

fn resolve_locations(
    lower: &str,
    words: &[Word<'_>],
    vocabulary: &Vocabulary,
    claims: &mut Claims,
) -> Vec<String> {
    let mut found = Vec::new();

    scan_substrings(lower, &vocabulary.states_longest_first(), claims, &mut found);

    if found.len() < MAX_LOCATIONS {
        for word in words {
            if found.len() >= MAX_LOCATIONS {
                break;
            }
            if claims.overlaps(word.start, word.end) || is_stop_word(word.text) {
                continue;
            }
            let candidates = vocabulary.states.iter().map(String::as_str);
            if let Some(name) = closest_match(&title_case(word.text), candidates, STATE_FUZZY_CUTOFF)
                && !already_found(&found, name)
            {
                log::debug!("Fuzzy state match '{}' -> '{name}'", word.text);
                claims.claim(word.start, word.end);
                found.push(name.to_string());
            }
        }
    }

    if found.len() < MAX_LOCATIONS {
        scan_substrings(
            lower,
            &vocabulary.subdivisions_longest_first(),
            claims,
            &mut found,
        );
    }

    found
}

/// Accepts each name (in the given order) that occurs in an unclaimed
/// span of `lower`, until [`MAX_LOCATIONS`] names have been found.
fn scan_substrings(lower: &str, names: &[&str], claims: &mut Claims, found: &mut Vec<String>) {
    for name in names {
        if found.len() >= MAX_LOCATIONS {
            return;
        }
        if already_found(found, name) {
            continue;
        }
        if let Some((start, end)) = find_unclaimed(lower, &name.to_lowercase(), claims) {
            log::debug!("Substring location match '{name}'");
            claims.claim(start, end);
            found.push((*name).to_string());
        }
    }
}

fn resolve_crop(
    lower: &str,
    words: &[Word<'_>],
    vocabulary: &Vocabulary,
    claims: &Claims,
) -> Option<String> {
    if let Some(name) = vocabulary
        .crops_longest_first()
        .into_iter()
        .find(|name| find_unclaimed(lower, &name.to_lowercase(), claims).is_some())
    {
        return Some(name.to_string());
    }

    words
        .iter()
        .filter(|w| !claims.overlaps(w.start, w.end) && !is_stop_word(w.text))
        .find_map(|w| {
            let candidates = vocabulary.crops.iter().map(String::as_str);
            closest_match(&title_case(w.text), candidates, CROP_FUZZY_CUTOFF)
        })
        .map(ToString::to_string)
}

/// Resolves the requested years, ascending.
///
/// An explicit year always wins. Otherwise the window ("last N", else the
/// default) is taken from the most recent available years; with no
/// available years at all the set is empty.
fn resolve_years(lower: &str, available_years: &BTreeSet<i32>) -> (Vec<i32>, YearWindow) {
    if let Some(year) = YEAR_RE
        .find(lower)
        .and_then(|m| m.as_str().parse::<i32>().ok())
    {
        return (vec![year], YearWindow::Explicit { year });
    }

    if available_years.is_empty() {
        return (Vec::new(), YearWindow::Unavailable);
    }

    let (n, window) = LAST_N_RE
        .captures(lower)
        .and_then(|c| c.get(1))
        .map_or((DEFAULT_YEAR_WINDOW, YearWindow::Default), |m| {
            let n = m
                .as_str()
                .parse::<usize>()
                .unwrap_or(MAX_YEAR_WINDOW)
                .clamp(1, MAX_YEAR_WINDOW);
            (n, YearWindow::LastN { n })
        });

    (most_recent_years(available_years, n), window)
}

fn resolve_top_n(lower: &str) -> usize {
    TOP_N_RE
        .captures(lower)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .map_or(DEFAULT_TOP_N, |n| n.max(1))
}
