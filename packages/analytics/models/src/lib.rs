#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation result types, provenance records and settings.
//!
//! Every aggregation returns its value wrapped in an [`Aggregation`] that
//! also carries the [`ProvenanceEntry`] records describing which slice of
//! which dataset produced it.

use std::collections::BTreeMap;

use samarth_dataset_models::DatasetKind;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which rule resolved a rainfall value for a location.
///
/// Tiers are tried in declaration order; the first one that yields rows
/// wins. Anything after [`ResolutionTier::ExactSubdivision`] is a degraded
/// answer and is labelled as such.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ResolutionTier {
    /// The location fuzzy-matched a subdivision and that subdivision had rows.
    ExactSubdivision,
    /// Rows whose subdivision name contains the location text.
    SubstringFallback,
    /// Mean over every subdivision for the year. Only used when enabled in
    /// [`AnalyticsSettings`].
    NationalAverage,
}

impl ResolutionTier {
    /// Returns `true` for tiers that answer with data not specific to the
    /// requested location.
    #[must_use]
    pub const fn is_degraded(self) -> bool {
        matches!(self, Self::NationalAverage)
    }
}

/// One explanation of how an answer value was computed.
///
/// Entries are appended in call order and never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceEntry {
    /// Dataset the rows came from.
    pub dataset_name: String,
    /// Human-readable row predicate.
    pub filter_description: String,
    /// Canonical description of the aggregation performed.
    pub expression: String,
    /// Resolution tier, for tiered lookups.
    pub tier: Option<ResolutionTier>,
}

impl ProvenanceEntry {
    /// Creates an entry for `dataset`.
    #[must_use]
    pub fn new(
        dataset: DatasetKind,
        filter_description: impl Into<String>,
        expression: impl Into<String>,
    ) -> Self {
        Self {
            dataset_name: dataset.to_string(),
            filter_description: filter_description.into(),
            expression: expression.into(),
            tier: None,
        }
    }

    /// Tags the entry with the tier that produced it.
    #[must_use]
    pub const fn with_tier(mut self, tier: ResolutionTier) -> Self {
        self.tier = Some(tier);
        self
    }
}

impl std::fmt::Display for ProvenanceEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{}] -> {}",
            self.dataset_name, self.filter_description, self.expression
        )?;
        if let Some(tier) = self.tier {
            write!(f, " ({tier})")?;
        }
        Ok(())
    }
}

/// An aggregation result plus the provenance of every value in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation<T> {
    /// The computed value.
    pub value: T,
    /// How it was computed, in call order.
    pub provenance: Vec<ProvenanceEntry>,
}

/// Average annual rainfall for one location and year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RainfallReading {
    /// Mean of the `annual` values, in millimetres.
    pub average_mm: f64,
    /// Number of rows averaged.
    pub row_count: usize,
    /// Which rule found the rows.
    pub tier: ResolutionTier,
}

/// Per-year rainfall for one location. A year maps to `None` when no tier
/// found any rows; it is never zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RainfallSeries {
    /// The location as resolved from the query.
    pub location: String,
    /// Readings keyed by year.
    pub readings: BTreeMap<i32, Option<RainfallReading>>,
}

impl RainfallSeries {
    /// The average for `year`, if one was resolved.
    #[must_use]
    pub fn average(&self, year: i32) -> Option<f64> {
        self.readings
            .get(&year)
            .copied()
            .flatten()
            .map(|r| r.average_mm)
    }

    /// Returns `true` if no year resolved to a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readings.values().all(Option::is_none)
    }
}

/// Total production of one crop over the filtered rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropTotal {
    /// Crop name.
    pub crop: String,
    /// Summed production in tonnes.
    pub total_production: f64,
}

/// Total production of a crop in one district.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictTotal {
    /// District name.
    pub district: String,
    /// Summed production in tonnes.
    pub total_production: f64,
}

/// Highest and lowest producing districts for a crop in a year.
///
/// Both are `None` when no rows matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictExtremes {
    /// District with the largest total.
    pub highest: Option<DistrictTotal>,
    /// District with the smallest total.
    pub lowest: Option<DistrictTotal>,
}

/// Tunable aggregation behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct AnalyticsSettings {
    /// When a location has no rainfall rows for a year, fall back to the
    /// mean over all subdivisions, labelled [`ResolutionTier::NationalAverage`].
    /// Off by default.
    pub national_average_fallback: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provenance_display_includes_tier() {
        let entry = ProvenanceEntry::new(
            DatasetKind::Rainfall,
            "SUBDIVISION == 'KERALA' AND YEAR == 2021",
            "mean(ANNUAL) over 1 row",
        )
        .with_tier(ResolutionTier::ExactSubdivision);
        assert_eq!(
            entry.to_string(),
            "rainfall[SUBDIVISION == 'KERALA' AND YEAR == 2021] -> mean(ANNUAL) over 1 row (exact-subdivision)"
        );
    }

    #[test]
    fn series_average_skips_unresolved_years() {
        let series = RainfallSeries {
            location: "Kerala".to_string(),
            readings: BTreeMap::from([
                (
                    2020,
                    Some(RainfallReading {
                        average_mm: 2800.0,
                        row_count: 1,
                        tier: ResolutionTier::ExactSubdivision,
                    }),
                ),
                (2021, None),
            ]),
        };
        assert_eq!(series.average(2020), Some(2800.0));
        assert_eq!(series.average(2021), None);
        assert_eq!(series.average(1999), None);
        assert!(!series.is_empty());
    }

    #[test]
    fn only_national_average_is_degraded() {
        assert!(!ResolutionTier::ExactSubdivision.is_degraded());
        assert!(!ResolutionTier::SubstringFallback.is_degraded());
        assert!(ResolutionTier::NationalAverage.is_degraded());
    }

    #[test]
    fn settings_default_disables_national_average() {
        assert!(!AnalyticsSettings::default().national_average_fallback);
    }
}
