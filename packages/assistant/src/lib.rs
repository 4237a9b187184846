#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Natural-language question answering over crop and rainfall data.
//!
//! [`QueryEngine::answer_query`] is the single entry point: it extracts a
//! [`QueryIntent`] from the question, runs the aggregations the intent
//! asks for, and composes an [`AnswerPayload`] together with the
//! provenance of every number in it. Rendering the payload is left to the
//! caller.

pub mod compose;
pub mod engine;

use std::collections::BTreeMap;

use samarth_analytics_models::ProvenanceEntry;
use samarth_query::ExtractionError;
use samarth_query_models::QueryIntent;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use compose::compose;
pub use engine::QueryEngine;

/// Errors that end a query before any aggregation runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The question could not be turned into an intent.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl QueryError {
    /// A user-facing message explaining how to rephrase the question.
    #[must_use]
    pub const fn guidance(&self) -> &'static str {
        match self {
            Self::Extraction(e) => e.guidance(),
        }
    }
}

/// One titled block of answer text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSection {
    /// Section title.
    pub heading: String,
    /// Lines of plain text, in display order.
    pub lines: Vec<String>,
}

/// Rainfall values keyed by year, then by location name. `None` marks a
/// location with no value for that year.
pub type TabularData = BTreeMap<i32, BTreeMap<String, Option<f64>>>;

/// The structured answer to one question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerPayload {
    /// Answer sections in display order.
    pub sections: Vec<AnswerSection>,
    /// Per-year rainfall table for two-location comparisons.
    pub tabular_data: Option<TabularData>,
    /// Data availability notices (unavailable datasets, empty year window).
    pub notices: Vec<String>,
}

/// Everything produced for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryAnswer {
    /// The interpreted question.
    pub intent: QueryIntent,
    /// The answer to render.
    pub payload: AnswerPayload,
    /// How each value was computed, in computation order.
    pub provenance: Vec<ProvenanceEntry>,
}
