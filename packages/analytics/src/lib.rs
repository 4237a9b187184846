#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation engine for crop production and rainfall questions.
//!
//! Each public function in [`tools`] is a pure, bounded scan over one of
//! the immutable base datasets. Every function returns its value together
//! with the provenance entries that explain it. Empty results are values,
//! not errors: a year with no rainfall rows maps to `None` and a location
//! with no crop rows yields an empty ranking.

pub mod tools;
