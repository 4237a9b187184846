//! Aggregation functions over the crop and rainfall datasets.
//!
//! Location filters are case-insensitive. Production sums treat missing
//! values as zero; rainfall averages skip missing values entirely.

use std::collections::BTreeMap;

use samarth_analytics_models::{
    Aggregation, AnalyticsSettings, CropTotal, DistrictExtremes, DistrictTotal, ProvenanceEntry,
    RainfallReading, RainfallSeries, ResolutionTier,
};
use samarth_dataset_models::{CropRecord, DatasetKind, RainfallRecord};
use samarth_vocabulary::Vocabulary;
use samarth_vocabulary::fuzzy::closest_match;

/// Minimum similarity ratio for a location to resolve to a subdivision.
pub const SUBDIVISION_FUZZY_CUTOFF: f64 = 0.6;

/// Average annual rainfall per requested year for `location`.
///
/// For each year the tiers are tried in order:
///
/// 1. [`ResolutionTier::ExactSubdivision`]: the subdivision that `location`
///    fuzzy-matches (cutoff [`SUBDIVISION_FUZZY_CUTOFF`]).
/// 2. [`ResolutionTier::SubstringFallback`]: subdivisions whose name
///    contains `location`.
/// 3. [`ResolutionTier::NationalAverage`]: every subdivision, only when
///    enabled in `settings`.
///
/// Only rows whose year equals the requested year are ever averaged. A
/// year where no tier finds a value maps to `None`. One provenance entry
/// is appended per resolved year.
#[must_use]
pub fn average_rainfall(
    rainfall: &[RainfallRecord],
    vocabulary: &Vocabulary,
    location: &str,
    years: &[i32],
    settings: &AnalyticsSettings,
) -> Aggregation<RainfallSeries> {
    let subdivision = closest_match(
        location,
        vocabulary.subdivisions.iter().map(String::as_str),
        SUBDIVISION_FUZZY_CUTOFF,
    );
    let location_lower = location.to_lowercase();
    let mut readings = BTreeMap::new();
    let mut provenance = Vec::new();

    for &year in years {
        let mut resolved = None;

        if let Some(sub) = subdivision {
            resolved = mean_annual(rainfall, |r| {
                r.year == year && r.subdivision.eq_ignore_ascii_case(sub)
            })
            .map(|(avg, rows)| {
                (
                    avg,
                    rows,
                    ResolutionTier::ExactSubdivision,
                    format!("SUBDIVISION == '{sub}' AND YEAR == {year}"),
                )
            });
        }

        if resolved.is_none() {
            resolved = mean_annual(rainfall, |r| {
                r.year == year && r.subdivision.to_lowercase().contains(&location_lower)
            })
            .map(|(avg, rows)| {
                (
                    avg,
                    rows,
                    ResolutionTier::SubstringFallback,
                    format!("SUBDIVISION contains '{location}' AND YEAR == {year}"),
                )
            });
        }

        if resolved.is_none() && settings.national_average_fallback {
            resolved = mean_annual(rainfall, |r| r.year == year).map(|(avg, rows)| {
                (
                    avg,
                    rows,
                    ResolutionTier::NationalAverage,
                    format!("YEAR == {year} (all subdivisions)"),
                )
            });
        }

        let reading = resolved.map(|(average_mm, row_count, tier, filter)| {
            log::debug!("Rainfall for '{location}' in {year}: {average_mm:.1} mm via {tier}");
            provenance.push(
                ProvenanceEntry::new(
                    DatasetKind::Rainfall,
                    filter,
                    format!("mean(ANNUAL) over {row_count} row(s)"),
                )
                .with_tier(tier),
            );
            RainfallReading {
                average_mm,
                row_count,
                tier,
            }
        });

        if reading.is_none() {
            log::debug!("No rainfall rows for '{location}' in {year}");
        }

        readings.insert(year, reading);
    }

    Aggregation {
        value: RainfallSeries {
            location: location.to_string(),
            readings,
        },
        provenance,
    }
}

/// Mean of the present `annual` values among rows matching `predicate`,
/// with the number of values averaged. `None` if there are no values.
#[allow(clippy::cast_precision_loss)]
fn mean_annual(
    rainfall: &[RainfallRecord],
    predicate: impl Fn(&RainfallRecord) -> bool,
) -> Option<(f64, usize)> {
    let (sum, count) = rainfall
        .iter()
        .filter(|r| predicate(*r))
        .filter_map(|r| r.annual)
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    (count > 0).then(|| (sum / count as f64, count))
}

/// Top `top_n` crops by summed production for rows whose state contains
/// `location` and whose year is in `years`.
///
/// Sorted descending by total, ties by ascending crop name. An empty
/// result means no rows matched. Always appends exactly one provenance
/// entry.
#[must_use]
pub fn top_crops_by_production(
    crops: &[CropRecord],
    location: &str,
    years: &[i32],
    top_n: usize,
) -> Aggregation<Vec<CropTotal>> {
    let location_lower = location.to_lowercase();
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    let mut rows = 0usize;

    for record in crops
        .iter()
        .filter(|r| years.contains(&r.year) && r.state.to_lowercase().contains(&location_lower))
    {
        rows += 1;
        *totals.entry(record.crop.as_str()).or_insert(0.0) += record.production.unwrap_or(0.0);
    }

    let mut ranked: Vec<CropTotal> = totals
        .into_iter()
        .map(|(crop, total_production)| CropTotal {
            crop: crop.to_string(),
            total_production,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.total_production
            .total_cmp(&a.total_production)
            .then_with(|| a.crop.cmp(&b.crop))
    });
    ranked.truncate(top_n);

    log::debug!(
        "Top crops for '{location}' in {years:?}: {} of {rows} row(s) ranked",
        ranked.len()
    );

    let provenance = vec![ProvenanceEntry::new(
        DatasetKind::Agriculture,
        format!("State contains '{location}' AND Crop_Year in {years:?}"),
        format!("sum(Production) group by Crop, top {top_n} by total desc over {rows} row(s)"),
    )];

    Aggregation {
        value: ranked,
        provenance,
    }
}

/// Highest and lowest producing districts for `crop` in `year`, among rows
/// whose state contains `location`.
///
/// Rows without a district are ignored. Ties keep the district seen first
/// in dataset order. Always appends exactly one provenance entry.
#[must_use]
pub fn district_extremes_for_crop(
    crops: &[CropRecord],
    location: &str,
    crop: &str,
    year: i32,
) -> Aggregation<DistrictExtremes> {
    let location_lower = location.to_lowercase();
    let mut totals: Vec<DistrictTotal> = Vec::new();
    let mut index: BTreeMap<&str, usize> = BTreeMap::new();

    for record in crops.iter().filter(|r| {
        r.year == year
            && r.crop.eq_ignore_ascii_case(crop)
            && r.state.to_lowercase().contains(&location_lower)
    }) {
        let Some(district) = record.district.as_deref().filter(|d| !d.is_empty()) else {
            continue;
        };
        let production = record.production.unwrap_or(0.0);
        if let Some(&i) = index.get(district) {
            totals[i].total_production += production;
        } else {
            index.insert(district, totals.len());
            totals.push(DistrictTotal {
                district: district.to_string(),
                total_production: production,
            });
        }
    }

    let mut highest: Option<&DistrictTotal> = None;
    let mut lowest: Option<&DistrictTotal> = None;
    for total in &totals {
        if highest.is_none_or(|h| total.total_production > h.total_production) {
            highest = Some(total);
        }
        if lowest.is_none_or(|l| total.total_production < l.total_production) {
            lowest = Some(total);
        }
    }

    log::debug!(
        "District extremes for {crop} in '{location}' {year}: {} district(s)",
        totals.len()
    );

    let provenance = vec![ProvenanceEntry::new(
        DatasetKind::Agriculture,
        format!("State contains '{location}' AND Crop == '{crop}' AND Crop_Year == {year}"),
        format!(
            "sum(Production) group by District over {} district(s); max and min by total",
            totals.len()
        ),
    )];

    Aggregation {
        value: DistrictExtremes {
            highest: highest.cloned(),
            lowest: lowest.cloned(),
        },
        provenance,
    }
}
