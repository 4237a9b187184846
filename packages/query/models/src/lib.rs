#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Structured query intent.
//!
//! A [`QueryIntent`] is what entity extraction turns free text into: which
//! places, which crop, which years and how many top results the user asked
//! about. Aggregation and answer composition only ever see this type.

use serde::{Deserialize, Serialize};

/// How the year set of an intent was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum YearWindow {
    /// A single explicit year token in the query.
    Explicit {
        /// The year named in the query.
        year: i32,
    },
    /// A "last N years" phrase, with `n` already clamped.
    LastN {
        /// Number of most recent years requested.
        n: usize,
    },
    /// No year hint; the default window of most recent years.
    Default,
    /// Neither dataset has year data and the query named no year, so the
    /// year set is empty and every year-filtered section reports no data.
    Unavailable,
}

/// The structured form of a natural-language question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryIntent {
    /// One or two resolved state or subdivision names, in resolution order.
    pub locations: Vec<String>,
    /// Resolved crop name, if any.
    pub crop: Option<String>,
    /// Requested years, ascending. Empty only for [`YearWindow::Unavailable`].
    pub years: Vec<i32>,
    /// Where `years` came from.
    pub year_window: YearWindow,
    /// Number of top crops to list (always at least 1).
    pub top_n: usize,
    /// `true` iff two locations were resolved.
    pub comparison_mode: bool,
    /// The user asked about crops, or named one.
    pub wants_crops: bool,
    /// The user asked for the highest/lowest district for a named crop.
    pub wants_district_extremes: bool,
}

impl QueryIntent {
    /// The most recent requested year, used for single-year breakdowns.
    #[must_use]
    pub fn latest_year(&self) -> Option<i32> {
        self.years.last().copied()
    }

    /// Comma-separated year list for headings (e.g. `"2019, 2020, 2021"`).
    #[must_use]
    pub fn years_label(&self) -> String {
        self.years
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(years: Vec<i32>) -> QueryIntent {
        QueryIntent {
            locations: vec!["Kerala".to_string()],
            crop: None,
            years,
            year_window: YearWindow::Default,
            top_n: 3,
            comparison_mode: false,
            wants_crops: false,
            wants_district_extremes: false,
        }
    }

    #[test]
    fn latest_year_is_last_entry() {
        assert_eq!(intent(vec![2019, 2020, 2021]).latest_year(), Some(2021));
        assert_eq!(intent(vec![]).latest_year(), None);
    }

    #[test]
    fn years_label_joins_with_commas() {
        assert_eq!(intent(vec![2019, 2020]).years_label(), "2019, 2020");
        assert_eq!(intent(vec![]).years_label(), "");
    }
}
