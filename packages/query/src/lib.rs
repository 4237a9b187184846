#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rule-based entity extraction for crop and rainfall questions.
//!
//! Turns free text such as *"Compare rainfall in Tamil Nadu and Kerala for
//! the last 3 years"* into a [`QueryIntent`](samarth_query_models::QueryIntent)
//! by substring and similarity-ratio matching against a
//! [`Vocabulary`](samarth_vocabulary::Vocabulary). There is no language
//! model involved: exact substring hits are always preferred and fuzzy
//! matching is a second-tier fallback.

pub mod extract;

use thiserror::Error;

pub use extract::extract;

/// Why a query could not be turned into an intent.
///
/// Both variants are terminal: the caller shows [`guidance`](Self::guidance)
/// to the user and no aggregation runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    /// The query was blank.
    #[error("Empty query")]
    EmptyQuery,

    /// No state or rainfall subdivision could be matched in the query.
    #[error("No location identified in query: {query}")]
    NoLocationIdentified {
        /// The query text as given.
        query: String,
    },
}

impl ExtractionError {
    /// A user-facing message explaining how to rephrase the question.
    #[must_use]
    pub const fn guidance(&self) -> &'static str {
        match self {
            Self::EmptyQuery => "Please type a question.",
            Self::NoLocationIdentified { .. } => {
                "Please include at least one state or rainfall subdivision name in your \
                 question, for example \"Average rainfall in Kerala for the last 3 years\"."
            }
        }
    }
}
