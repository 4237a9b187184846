//! The query pipeline: extract, aggregate, compose.
//!
//! A [`QueryEngine`] owns the two base datasets and the vocabulary built
//! from them. Nothing in it is mutated after construction, so one engine
//! can be shared (e.g. behind an `Arc`) by any number of concurrent
//! readers.

use samarth_analytics::tools::{average_rainfall, district_extremes_for_crop, top_crops_by_production};
use samarth_analytics_models::{AnalyticsSettings, ProvenanceEntry};
use samarth_dataset_models::{CropRecord, Dataset, RainfallRecord};
use samarth_query::extract;
use samarth_query_models::{QueryIntent, YearWindow};
use samarth_vocabulary::Vocabulary;

use crate::compose::{AggregationResults, LocationResults, compose};
use crate::{QueryAnswer, QueryError};

/// Notice added when neither dataset has years and the question named none.
pub const EMPTY_YEAR_WINDOW_NOTICE: &str =
    "Neither dataset contains year information and the question named no year.";

/// Answers questions against one immutable pair of datasets.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    crops: Dataset<CropRecord>,
    rainfall: Dataset<RainfallRecord>,
    vocabulary: Vocabulary,
    settings: AnalyticsSettings,
}

impl QueryEngine {
    /// Builds the vocabulary and takes ownership of both datasets.
    #[must_use]
    pub fn new(
        crops: Dataset<CropRecord>,
        rainfall: Dataset<RainfallRecord>,
        settings: AnalyticsSettings,
    ) -> Self {
        let vocabulary = Vocabulary::build(&crops.records, &rainfall.records);

        log::info!(
            "Query engine ready: {} crop rows, {} rainfall rows",
            crops.len(),
            rainfall.len()
        );

        Self {
            crops,
            rainfall,
            vocabulary,
            settings,
        }
    }

    /// The vocabulary derived from the datasets.
    #[must_use]
    pub const fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// The agriculture dataset.
    #[must_use]
    pub const fn crops(&self) -> &Dataset<CropRecord> {
        &self.crops
    }

    /// The rainfall dataset.
    #[must_use]
    pub const fn rainfall(&self) -> &Dataset<RainfallRecord> {
        &self.rainfall
    }

    /// Answers one natural-language question.
    ///
    /// Missing data never fails the query: sections without matching rows
    /// say so, and an unavailable dataset only adds a notice.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Extraction`] if the question is blank or names
    /// no recognizable location. No aggregation runs in that case.
    pub fn answer_query(&self, text: &str) -> Result<QueryAnswer, QueryError> {
        let intent = extract(text, &self.vocabulary, &self.vocabulary.years)?;
        let mut provenance = Vec::new();
        let results = self.aggregate(&intent, &mut provenance);
        let payload = compose(&intent, &results);

        Ok(QueryAnswer {
            intent,
            payload,
            provenance,
        })
    }

    /// Runs every aggregation the intent asks for.
    ///
    /// Provenance is appended phase by phase: rainfall for each location,
    /// then crops for each location, then district extremes.
    fn aggregate(&self, intent: &QueryIntent, provenance: &mut Vec<ProvenanceEntry>) -> AggregationResults {
        let mut locations: Vec<LocationResults> = intent
            .locations
            .iter()
            .map(|location| {
                let rainfall = average_rainfall(
                    &self.rainfall.records,
                    &self.vocabulary,
                    location,
                    &intent.years,
                    &self.settings,
                );
                provenance.extend(rainfall.provenance);
                LocationResults {
                    location: location.clone(),
                    rainfall: rainfall.value,
                    top_crops: None,
                    district_extremes: None,
                }
            })
            .collect();

        if intent.wants_crops {
            for l in &mut locations {
                let top = top_crops_by_production(
                    &self.crops.records,
                    &l.location,
                    &intent.years,
                    intent.top_n,
                );
                provenance.extend(top.provenance);
                l.top_crops = Some(top.value);
            }
        }

        if intent.wants_district_extremes
            && let (Some(crop), Some(year)) = (&intent.crop, intent.latest_year())
        {
            for l in &mut locations {
                let extremes = district_extremes_for_crop(&self.crops.records, &l.location, crop, year);
                provenance.extend(extremes.provenance);
                l.district_extremes = Some(extremes.value);
            }
        }

        AggregationResults {
            locations,
            notices: self.notices(intent),
        }
    }

    fn notices(&self, intent: &QueryIntent) -> Vec<String> {
        let mut notices = Vec::new();

        if let Some(error) = &self.crops.load_error {
            notices.push(format!("{} unavailable: {error}", self.crops.kind.label()));
        }
        if let Some(error) = &self.rainfall.load_error {
            notices.push(format!("{} unavailable: {error}", self.rainfall.kind.label()));
        }
        if intent.year_window == YearWindow::Unavailable {
            notices.push(EMPTY_YEAR_WINDOW_NOTICE.to_string());
        }

        notices
    }
}

#[cfg(test)]
mod tests {
    use samarth_dataset_models::DatasetKind;
    use samarth_query::ExtractionError;

    use super::*;
    use crate::compose::NO_DATA_LINE;

    fn crop(state: &str, district: &str, name: &str, year: i32, t: f64) -> CropRecord {
        CropRecord {
            state: state.to_string(),
            district: Some(district.to_string()),
            crop: name.to_string(),
            year,
            production: Some(t),
            area_harvested: None,
        }
    }

    fn rain(subdivision: &str, year: i32, annual: f64) -> RainfallRecord {
        RainfallRecord {
            subdivision: subdivision.to_string(),
            year,
            annual: Some(annual),
        }
    }

    fn crops() -> Dataset<CropRecord> {
        Dataset::new(
            DatasetKind::Agriculture,
            vec![
                crop("Tamil Nadu", "Thanjavur", "Rice", 2021, 3000.0),
                crop("Tamil Nadu", "Madurai", "Rice", 2021, 2000.0),
                crop("Tamil Nadu", "Madurai", "Banana", 2021, 800.0),
                crop("Kerala", "Kozhikode", "Coconut", 2021, 9000.0),
                crop("Andhra Pradesh", "Guntur", "Rice", 2019, 700.0),
                crop("Andhra Pradesh", "Krishna", "Rice", 2019, 900.0),
            ],
        )
    }

    fn rainfall() -> Dataset<RainfallRecord> {
        Dataset::new(
            DatasetKind::Rainfall,
            vec![
                rain("TAMIL NADU", 2019, 1000.0),
                rain("TAMIL NADU", 2020, 1010.0),
                rain("TAMIL NADU", 2021, 950.0),
                rain("KERALA", 2019, 3000.0),
                rain("KERALA", 2020, 2900.0),
                rain("KERALA", 2021, 2800.0),
            ],
        )
    }

    fn engine() -> QueryEngine {
        QueryEngine::new(crops(), rainfall(), AnalyticsSettings::default())
    }

    fn all_lines(answer: &QueryAnswer) -> Vec<String> {
        answer
            .payload
            .sections
            .iter()
            .flat_map(|s| s.lines.iter().cloned())
            .collect()
    }

    #[test]
    fn compare_two_states_with_crops() {
        let answer = engine()
            .answer_query(
                "Compare rainfall in Tamil Nadu and Kerala for the last 3 years and list top 3 crops",
            )
            .unwrap();

        assert_eq!(answer.intent.years, [2019, 2020, 2021]);
        let lines = all_lines(&answer);
        assert!(lines.contains(&"2021: Tamil Nadu: 950.0 mm | Kerala: 2800.0 mm".to_string()));
        assert!(lines.contains(&"Tamil Nadu: Rice (5000.0 t), Banana (800.0 t)".to_string()));
        assert!(lines.contains(&"Kerala: Coconut (9000.0 t)".to_string()));
        assert!(answer.payload.tabular_data.is_some());
        // 3 years of rainfall for each state, then one crops entry each.
        assert_eq!(answer.provenance.len(), 8);
        assert_eq!(answer.provenance[6].dataset_name, "agriculture");
    }

    #[test]
    fn unknown_location_short_circuits() {
        let err = engine()
            .answer_query("Rainfall in Gondwanaland for 2020")
            .unwrap_err();
        assert!(matches!(
            err,
            QueryError::Extraction(ExtractionError::NoLocationIdentified { .. })
        ));
        assert!(!err.guidance().is_empty());
    }

    #[test]
    fn empty_crop_dataset_reports_no_data() {
        let engine = QueryEngine::new(
            Dataset::unavailable(DatasetKind::Agriculture, "crop.csv: not found"),
            rainfall(),
            AnalyticsSettings::default(),
        );
        let answer = engine.answer_query("Top 5 crops in Kerala for 2019").unwrap();

        assert_eq!(answer.payload.sections[0].lines, ["2019: 3000.0 mm"]);
        assert_eq!(answer.payload.sections[1].lines, [NO_DATA_LINE]);
        assert_eq!(
            answer.payload.notices,
            ["Crop production dataset unavailable: crop.csv: not found"]
        );
    }

    #[test]
    fn both_datasets_empty_still_answers() {
        let engine = QueryEngine::new(
            Dataset::unavailable(DatasetKind::Agriculture, "missing"),
            Dataset::unavailable(DatasetKind::Rainfall, "missing"),
            AnalyticsSettings::default(),
        );
        // No vocabulary at all, so no location can be identified.
        assert!(engine.answer_query("Rainfall in Kerala").is_err());
    }

    #[test]
    fn empty_year_window_adds_notice() {
        let mut engine = QueryEngine::new(
            Dataset::new(DatasetKind::Agriculture, vec![]),
            Dataset::new(DatasetKind::Rainfall, vec![]),
            AnalyticsSettings::default(),
        );
        engine.vocabulary.states.insert("Kerala".to_string());

        let answer = engine.answer_query("Rainfall in Kerala").unwrap();
        assert!(answer.intent.years.is_empty());
        assert_eq!(answer.payload.sections[0].lines, [NO_DATA_LINE]);
        assert_eq!(answer.payload.notices, [EMPTY_YEAR_WINDOW_NOTICE]);
        assert!(answer.provenance.is_empty());
    }

    #[test]
    fn district_extremes_use_latest_requested_year() {
        let answer = engine()
            .answer_query("Which district in Andhra Pradesh had the highest production of Rice in 2019?")
            .unwrap();
        let section = answer.payload.sections.last().unwrap();
        assert_eq!(section.heading, "Rice production by district in Andhra Pradesh (2019)");
        assert_eq!(
            section.lines,
            ["Highest: Krishna (900.0 t)", "Lowest: Guntur (700.0 t)"]
        );
    }

    #[test]
    fn answers_are_idempotent() {
        let engine = engine();
        let q = "Compare Tamil Nadu and Kerala rainfall and top 2 crops";
        assert_eq!(engine.answer_query(q).unwrap(), engine.answer_query(q).unwrap());
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QueryEngine>();
    }
}
