#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Known-entity vocabularies derived from the loaded datasets.
//!
//! The [`Vocabulary`] is computed once per dataset load and then only read.
//! It holds the candidate pools (states, crops, rainfall subdivisions and
//! years) that query extraction matches user text against. Matching
//! itself lives in [`fuzzy`]; building the vocabulary is purely a
//! distinct-values pass with canonical casing.

pub mod casing;
pub mod fuzzy;

use std::collections::BTreeSet;

use samarth_dataset_models::{CropRecord, RainfallRecord};
use serde::{Deserialize, Serialize};

use crate::casing::{subdivision_case, title_case};

/// The distinct entity names and years observed in both datasets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vocabulary {
    /// State names, title-cased.
    pub states: BTreeSet<String>,
    /// Crop names, title-cased.
    pub crops: BTreeSet<String>,
    /// Rainfall subdivision names, upper-cased.
    pub subdivisions: BTreeSet<String>,
    /// Union of the years present in either dataset.
    pub years: BTreeSet<i32>,
}

impl Vocabulary {
    /// Builds the vocabulary from the two canonical datasets.
    ///
    /// Blank names are ignored. The result is fully determined by the
    /// distinct values present; record order does not matter.
    #[must_use]
    pub fn build(crops: &[CropRecord], rainfall: &[RainfallRecord]) -> Self {
        let mut vocab = Self::default();

        for record in crops {
            insert_non_blank(&mut vocab.states, title_case(&record.state));
            insert_non_blank(&mut vocab.crops, title_case(&record.crop));
            vocab.years.insert(record.year);
        }

        for record in rainfall {
            insert_non_blank(&mut vocab.subdivisions, subdivision_case(&record.subdivision));
            vocab.years.insert(record.year);
        }

        log::debug!(
            "Built vocabulary: {} states, {} crops, {} subdivisions, {} years",
            vocab.states.len(),
            vocab.crops.len(),
            vocab.subdivisions.len(),
            vocab.years.len()
        );

        vocab
    }

    /// State names ordered longest first, so that a longer name is always
    /// tried before any shorter name it contains.
    #[must_use]
    pub fn states_longest_first(&self) -> Vec<&str> {
        longest_first(&self.states)
    }

    /// Crop names ordered longest first.
    #[must_use]
    pub fn crops_longest_first(&self) -> Vec<&str> {
        longest_first(&self.crops)
    }

    /// Subdivision names ordered longest first.
    #[must_use]
    pub fn subdivisions_longest_first(&self) -> Vec<&str> {
        longest_first(&self.subdivisions)
    }
}

/// The `n` most recent of `years`, ascending.
#[must_use]
pub fn most_recent_years(years: &BTreeSet<i32>, n: usize) -> Vec<i32> {
    let mut recent: Vec<i32> = years.iter().rev().take(n).copied().collect();
    recent.reverse();
    recent
}

fn insert_non_blank(set: &mut BTreeSet<String>, value: String) {
    if !value.is_empty() {
        set.insert(value);
    }
}

/// Descending by character count; equal lengths keep alphabetical order.
fn longest_first(names: &BTreeSet<String>) -> Vec<&str> {
    let mut sorted: Vec<&str> = names.iter().map(String::as_str).collect();
    sorted.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crop(state: &str, crop: &str, year: i32) -> CropRecord {
        CropRecord {
            state: state.to_string(),
            district: None,
            crop: crop.to_string(),
            year,
            production: Some(1.0),
            area_harvested: None,
        }
    }

    fn rain(subdivision: &str, year: i32) -> RainfallRecord {
        RainfallRecord {
            subdivision: subdivision.to_string(),
            year,
            annual: Some(100.0),
        }
    }

    #[test]
    fn builds_distinct_canonical_sets() {
        let vocab = Vocabulary::build(
            &[
                crop("tamil nadu", "rice", 2019),
                crop("Tamil Nadu", "RICE", 2020),
                crop("Kerala", "Coconut", 2020),
            ],
            &[rain("Kerala", 2021), rain("coastal karnataka", 2018)],
        );

        assert_eq!(
            vocab.states.iter().collect::<Vec<_>>(),
            ["Kerala", "Tamil Nadu"]
        );
        assert_eq!(vocab.crops.iter().collect::<Vec<_>>(), ["Coconut", "Rice"]);
        assert_eq!(
            vocab.subdivisions.iter().collect::<Vec<_>>(),
            ["COASTAL KARNATAKA", "KERALA"]
        );
        assert_eq!(
            vocab.years.iter().copied().collect::<Vec<_>>(),
            [2018, 2019, 2020, 2021]
        );
    }

    #[test]
    fn blank_names_are_skipped() {
        let vocab = Vocabulary::build(&[crop("  ", "", 2020)], &[rain(" ", 2020)]);
        assert!(vocab.states.is_empty());
        assert!(vocab.crops.is_empty());
        assert!(vocab.subdivisions.is_empty());
        assert_eq!(vocab.years.len(), 1);
    }

    #[test]
    fn longest_first_orders_by_length_then_name() {
        let vocab = Vocabulary::build(
            &[
                crop("Goa", "Rice", 2020),
                crop("Andhra Pradesh", "Rice", 2020),
                crop("Assam", "Rice", 2020),
                crop("Bihar", "Rice", 2020),
            ],
            &[],
        );
        assert_eq!(
            vocab.states_longest_first(),
            ["Andhra Pradesh", "Assam", "Bihar", "Goa"]
        );
    }

    #[test]
    fn most_recent_years_are_ascending() {
        let vocab = Vocabulary::build(
            &[crop("Goa", "Rice", 2015), crop("Goa", "Rice", 2017)],
            &[rain("KONKAN & GOA", 2016), rain("KONKAN & GOA", 2018)],
        );
        assert_eq!(most_recent_years(&vocab.years, 3), [2016, 2017, 2018]);
        assert_eq!(most_recent_years(&vocab.years, 10), [2015, 2016, 2017, 2018]);
        assert!(most_recent_years(&BTreeSet::new(), 3).is_empty());
    }
}
