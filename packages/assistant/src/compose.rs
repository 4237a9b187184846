//! Answer composition.
//!
//! Turns an intent plus its aggregation results into ordered text
//! sections. A requested section is never dropped: when its aggregation
//! found nothing it still appears, with [`NO_DATA_LINE`].

use std::collections::BTreeMap;

use samarth_analytics_models::{CropTotal, DistrictExtremes, DistrictTotal, RainfallSeries};
use samarth_query_models::QueryIntent;

use crate::{AnswerPayload, AnswerSection, TabularData};

/// Line shown for a recognized sub-question with no matching rows.
pub const NO_DATA_LINE: &str = "No data found for this selection.";

/// Placeholder for a missing value inside a comparison row.
const NOT_AVAILABLE: &str = "N/A";

/// Aggregated values for one resolved location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationResults {
    /// The location name as resolved from the query.
    pub location: String,
    /// Average rainfall for every requested year.
    pub rainfall: RainfallSeries,
    /// Top crops, when the intent asked for crops.
    pub top_crops: Option<Vec<CropTotal>>,
    /// District extremes, when the intent asked for them.
    pub district_extremes: Option<DistrictExtremes>,
}

/// All aggregation output for one question.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationResults {
    /// One entry per location, in intent order.
    pub locations: Vec<LocationResults>,
    /// Data availability notices to pass through.
    pub notices: Vec<String>,
}

/// Assembles the answer for `intent` from `results`.
#[must_use]
pub fn compose(intent: &QueryIntent, results: &AggregationResults) -> AnswerPayload {
    let mut payload = AnswerPayload {
        notices: results.notices.clone(),
        ..AnswerPayload::default()
    };

    if intent.comparison_mode && results.locations.len() >= 2 {
        compose_comparison(intent, &results.locations, &mut payload);
    } else if let Some(only) = results.locations.first() {
        compose_single(intent, only, &mut payload);
    }

    payload
}

fn compose_comparison(intent: &QueryIntent, locations: &[LocationResults], payload: &mut AnswerPayload) {
    let mut lines = Vec::new();
    let mut table: TabularData = BTreeMap::new();

    for &year in &intent.years {
        let cells: Vec<String> = locations
            .iter()
            .map(|l| format!("{}: {}", l.location, rainfall_cell(&l.rainfall, year)))
            .collect();
        lines.push(format!("{year}: {}", cells.join(" | ")));

        table.insert(
            year,
            locations
                .iter()
                .map(|l| (l.location.clone(), l.rainfall.average(year)))
                .collect(),
        );
    }
    payload.sections.push(AnswerSection {
        heading: with_years("Rainfall comparison", intent),
        lines: or_no_data(lines),
    });

    if intent.wants_crops {
        let lines = locations
            .iter()
            .map(|l| {
                let crops = l.top_crops.as_deref().unwrap_or_default();
                format!("{}: {}", l.location, crop_list(crops))
            })
            .collect();
        payload.sections.push(AnswerSection {
            heading: with_years(&format!("Top {} crops comparison", intent.top_n), intent),
            lines,
        });
    }

    if intent.wants_district_extremes
        && let Some(crop) = &intent.crop
    {
        for l in locations {
            payload
                .sections
                .push(district_section(intent, crop, &l.location, l.district_extremes.as_ref()));
        }
    }

    payload.tabular_data = Some(table);
}

fn compose_single(intent: &QueryIntent, only: &LocationResults, payload: &mut AnswerPayload) {
    let lines = intent
        .years
        .iter()
        .map(|&year| format!("{year}: {}", rainfall_cell(&only.rainfall, year)))
        .collect();
    payload.sections.push(AnswerSection {
        heading: format!("Average annual rainfall for {}", only.location),
        lines: or_no_data(lines),
    });

    if intent.wants_crops {
        let crops = only.top_crops.as_deref().unwrap_or_default();
        payload.sections.push(AnswerSection {
            heading: with_years(
                &format!("Top {} crops in {}", intent.top_n, only.location),
                intent,
            ),
            lines: vec![crop_list(crops)],
        });
    }

    if intent.wants_district_extremes
        && let Some(crop) = &intent.crop
    {
        payload.sections.push(district_section(
            intent,
            crop,
            &only.location,
            only.district_extremes.as_ref(),
        ));
    }
}

fn district_section(
    intent: &QueryIntent,
    crop: &str,
    location: &str,
    extremes: Option<&DistrictExtremes>,
) -> AnswerSection {
    let heading = intent.latest_year().map_or_else(
        || format!("{crop} production by district in {location}"),
        |year| format!("{crop} production by district in {location} ({year})"),
    );

    let mut lines = Vec::new();
    if let Some(extremes) = extremes {
        if let Some(highest) = &extremes.highest {
            lines.push(format!("Highest: {}", district_cell(highest)));
        }
        if let Some(lowest) = &extremes.lowest {
            lines.push(format!("Lowest: {}", district_cell(lowest)));
        }
    }

    AnswerSection {
        heading,
        lines: or_no_data(lines),
    }
}

fn rainfall_cell(series: &RainfallSeries, year: i32) -> String {
    match series.readings.get(&year).copied().flatten() {
        Some(reading) if reading.tier.is_degraded() => {
            format!("{:.1} mm ({})", reading.average_mm, reading.tier)
        }
        Some(reading) => format!("{:.1} mm", reading.average_mm),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn crop_list(crops: &[CropTotal]) -> String {
    if crops.is_empty() {
        return NO_DATA_LINE.to_string();
    }
    crops
        .iter()
        .map(|c| format!("{} ({:.1} t)", c.crop, c.total_production))
        .collect::<Vec<_>>()
        .join(", ")
}

fn district_cell(total: &DistrictTotal) -> String {
    format!("{} ({:.1} t)", total.district, total.total_production)
}

fn with_years(heading: &str, intent: &QueryIntent) -> String {
    if intent.years.is_empty() {
        heading.to_string()
    } else {
        format!("{heading} ({})", intent.years_label())
    }
}

fn or_no_data(lines: Vec<String>) -> Vec<String> {
    if lines.is_empty() {
        vec![NO_DATA_LINE.to_string()]
    } else {
        lines
    }
}
