//! Column synonym tables.
//!
//! Each dataset has an ordered list of [`ColumnRule`]s. A header is
//! normalized (trimmed, lower-cased, spaces replaced by `_`) and assigned
//! to the field of the first rule it satisfies. When several headers land
//! on the same field, the leftmost one is used and the rest are ignored.

use std::collections::BTreeMap;

use strum_macros::{AsRefStr, Display};

/// Canonical columns of the crop production dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum CropField {
    State,
    District,
    Crop,
    Year,
    Production,
    AreaHarvested,
}

/// Canonical columns of the rainfall dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum RainfallField {
    Subdivision,
    Year,
    Annual,
}

/// Maps headers onto `field`.
///
/// `patterns` lists alternatives; a header satisfies the rule if it
/// contains every fragment of at least one alternative.
#[derive(Debug, Clone, Copy)]
pub struct ColumnRule<F> {
    pub field: F,
    pub patterns: &'static [&'static [&'static str]],
}

impl<F> ColumnRule<F> {
    fn matches(&self, header: &str) -> bool {
        self.patterns
            .iter()
            .any(|fragments| fragments.iter().all(|f| header.contains(f)))
    }
}

/// Crop rules. `district` precedes `state` so "State_District" style
/// headers are read as the district.
pub const CROP_RULES: &[ColumnRule<CropField>] = &[
    ColumnRule {
        field: CropField::District,
        patterns: &[&["district"]],
    },
    ColumnRule {
        field: CropField::State,
        patterns: &[&["state"]],
    },
    ColumnRule {
        field: CropField::Year,
        patterns: &[&["year"]],
    },
    ColumnRule {
        field: CropField::Production,
        patterns: &[&["production"]],
    },
    ColumnRule {
        field: CropField::AreaHarvested,
        patterns: &[&["area", "harvested"]],
    },
    ColumnRule {
        field: CropField::Crop,
        patterns: &[&["crop"]],
    },
];

pub const CROP_REQUIRED: &[CropField] = &[CropField::State, CropField::Crop, CropField::Year];

pub const RAINFALL_RULES: &[ColumnRule<RainfallField>] = &[
    ColumnRule {
        field: RainfallField::Subdivision,
        patterns: &[&["subdiv"], &["state"]],
    },
    ColumnRule {
        field: RainfallField::Year,
        patterns: &[&["year"]],
    },
    ColumnRule {
        field: RainfallField::Annual,
        patterns: &[&["annual"], &["total"], &["rain"]],
    },
];

pub const RAINFALL_REQUIRED: &[RainfallField] = &[RainfallField::Subdivision, RainfallField::Year];

/// Lower-cases and trims `header`, replacing spaces with underscores.
#[must_use]
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

/// Resolves each field to the index of the header that supplies it.
#[must_use]
pub fn map_columns<F, H>(headers: &[H], rules: &[ColumnRule<F>]) -> BTreeMap<F, usize>
where
    F: Copy + Ord + std::fmt::Display,
    H: AsRef<str>,
{
    let mut columns = BTreeMap::new();

    for (index, raw) in headers.iter().enumerate() {
        let header = normalize_header(raw.as_ref());
        let Some(rule) = rules.iter().find(|r| r.matches(&header)) else {
            log::trace!("Ignoring column '{}'", raw.as_ref());
            continue;
        };

        if let Some(&existing) = columns.get(&rule.field) {
            log::warn!(
                "Column '{}' also maps to '{}'; keeping column {existing}",
                raw.as_ref(),
                rule.field
            );
            continue;
        }
        columns.insert(rule.field, index);
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_headers() {
        assert_eq!(normalize_header("  Area Harvested "), "area_harvested");
        assert_eq!(normalize_header("State_Name"), "state_name");
    }

    #[test]
    fn maps_typical_crop_headers() {
        let headers = [
            "State_Name",
            "District_Name",
            "Crop_Year",
            "Season",
            "Crop",
            "Area Harvested",
            "Production",
        ];
        let columns = map_columns(&headers, CROP_RULES);

        assert_eq!(columns[&CropField::State], 0);
        assert_eq!(columns[&CropField::District], 1);
        assert_eq!(columns[&CropField::Year], 2);
        assert_eq!(columns[&CropField::Crop], 4);
        assert_eq!(columns[&CropField::AreaHarvested], 5);
        assert_eq!(columns[&CropField::Production], 6);
        assert_eq!(columns.len(), 6);
    }

    #[test]
    fn crop_year_is_a_year_not_a_crop() {
        let columns = map_columns(&["crop_year", "crop"], CROP_RULES);
        assert_eq!(columns[&CropField::Year], 0);
        assert_eq!(columns[&CropField::Crop], 1);
    }

    #[test]
    fn first_header_wins_per_field() {
        let columns = map_columns(&["SUBDIVISION", "STATE", "YEAR", "ANNUAL", "Total"], RAINFALL_RULES);
        assert_eq!(columns[&RainfallField::Subdivision], 0);
        assert_eq!(columns[&RainfallField::Annual], 3);
    }

    #[test]
    fn rainfall_accepts_alternative_names() {
        let columns = map_columns(&["State", "Year", "Total Rainfall"], RAINFALL_RULES);
        assert_eq!(columns[&RainfallField::Subdivision], 0);
        assert_eq!(columns[&RainfallField::Year], 1);
        assert_eq!(columns[&RainfallField::Annual], 2);
    }

    #[test]
    fn area_needs_both_fragments() {
        let columns = map_columns(&["Area"], CROP_RULES);
        assert!(columns.is_empty());
    }
}
