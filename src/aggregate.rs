//! Aggregation types and value reduction.
//!
//! Every output column other than the identity column carries an
//! [`AggregationType`]. During a rebuild the values contributing to one output
//! cell are collected into a [`ValueSet`] and collapsed into a single cell by
//! [`reduce()`].
//!
//! Numeric aggregations use leading-integer parsing (`"12kg"` reads as 12,
//! `"3.7"` as 3). Digit runs too large for an `i64` count as unparseable
//! rather than being widened to a float. Date aggregations accept ISO dates,
//! RFC 3339 timestamps, ISO date-times, US `MM/DD/YYYY` and English month-name
//! forms. Values that do not parse are left out of the aggregate rather than
//! reported.

use std::{fmt, str::FromStr};

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexSet;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

/// Distinct collected values for one output cell, in the order they were found.
pub type ValueSet = IndexSet<String>;

pub const DISTINCT_SEPARATOR: &str = "; ";

const DATE_OUTPUT_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AggregationType {
    #[default]
    DistinctValues,
    DistinctCount,
    MinNumber,
    MaxNumber,
    NumberRange,
    MinDate,
    MaxDate,
    DateRange,
    /// A label that names none of the supported aggregations. Kept verbatim so
    /// presets round-trip; cells using it stay empty.
    Unknown(String),
}

impl AggregationType {
    pub const KNOWN: [AggregationType; 8] = [
        AggregationType::DistinctValues,
        AggregationType::DistinctCount,
        AggregationType::MinNumber,
        AggregationType::MaxNumber,
        AggregationType::NumberRange,
        AggregationType::MinDate,
        AggregationType::MaxDate,
        AggregationType::DateRange,
    ];

    pub fn label(&self) -> &str {
        match self {
            AggregationType::DistinctValues => "Distinct values",
            AggregationType::DistinctCount => "Distinct count",
            AggregationType::MinNumber => "Min number",
            AggregationType::MaxNumber => "Max number",
            AggregationType::NumberRange => "Number range",
            AggregationType::MinDate => "Min date",
            AggregationType::MaxDate => "Max date",
            AggregationType::DateRange => "Date range",
            AggregationType::Unknown(label) => label,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, AggregationType::Unknown(_))
    }

    fn from_exact_label(label: &str) -> Option<Self> {
        Self::KNOWN.into_iter().find(|kind| kind.label() == label)
    }
}

impl From<String> for AggregationType {
    fn from(label: String) -> Self {
        Self::from_exact_label(&label).unwrap_or(AggregationType::Unknown(label))
    }
}

impl From<AggregationType> for String {
    fn from(kind: AggregationType) -> Self {
        match kind {
            AggregationType::Unknown(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lenient parsing for command-line input: accepts the display label in any
/// case as well as kebab/snake forms such as `min-number`.
impl FromStr for AggregationType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let wanted = simplify_label(value);
        Self::KNOWN
            .into_iter()
            .find(|kind| simplify_label(kind.label()) == wanted)
            .ok_or_else(|| {
                anyhow!(
                    "Unknown aggregation type '{value}'. Expected one of: {}",
                    Self::KNOWN.iter().map(|kind| kind.label()).join(", ")
                )
            })
    }
}

fn simplify_label(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            '-' | '_' => ' ',
            other => other.to_ascii_lowercase(),
        })
        .collect::<String>()
        .split_whitespace()
        .join(" ")
}

/// Collapses the collected values of one output cell according to `kind`.
///
/// Returns `None` when nothing survives the aggregation. `DistinctCount` is the
/// exception and always reports a count, `"0"` for an empty set.
///
/// `DistinctValues` keeps collection order, so `["20", "10"]` renders as
/// `"20; 10"`. Integer-like values are not sorted ahead of the rest.
pub fn reduce(values: &ValueSet, kind: &AggregationType) -> Option<String> {
    match kind {
        AggregationType::DistinctValues => {
            (!values.is_empty()).then(|| values.iter().join(DISTINCT_SEPARATOR))
        }
        AggregationType::DistinctCount => Some(values.len().to_string()),
        AggregationType::MinNumber => number_bounds(values).min.map(|n| n.to_string()),
        AggregationType::MaxNumber => number_bounds(values).max.map(|n| n.to_string()),
        AggregationType::NumberRange => {
            let bounds = number_bounds(values);
            render_range(bounds.min, bounds.max, |n| n.to_string())
        }
        AggregationType::MinDate => date_bounds(values).min.map(format_date),
        AggregationType::MaxDate => date_bounds(values).max.map(format_date),
        AggregationType::DateRange => {
            let bounds = date_bounds(values);
            render_range(bounds.min, bounds.max, format_date)
        }
        AggregationType::Unknown(_) => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds<T> {
    min: Option<T>,
    max: Option<T>,
}

impl<T: Ord + Copy> Bounds<T> {
    fn empty() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    fn observe(&mut self, value: T) {
        self.min = Some(self.min.map_or(value, |current| current.min(value)));
        self.max = Some(self.max.map_or(value, |current| current.max(value)));
    }
}

fn number_bounds(values: &ValueSet) -> Bounds<i64> {
    let mut bounds = Bounds::empty();
    for value in values {
        match parse_leading_integer(value) {
            Some(number) => bounds.observe(number),
            None => debug!("Ignoring non-numeric value '{value}'"),
        }
    }
    bounds
}

fn date_bounds(values: &ValueSet) -> Bounds<NaiveDate> {
    let mut bounds = Bounds::empty();
    for value in values {
        match parse_calendar_date(value) {
            Some(date) => bounds.observe(date),
            None => debug!("Ignoring value '{value}' that is not a date"),
        }
    }
    bounds
}

fn render_range<T>(min: Option<T>, max: Option<T>, render: impl Fn(T) -> String) -> Option<String> {
    if min.is_none() && max.is_none() {
        return None;
    }
    Some(format!(
        "{}-{}",
        min.map(&render).unwrap_or_default(),
        max.map(&render).unwrap_or_default()
    ))
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_OUTPUT_FORMAT).to_string()
}

/// Reads the base-10 integer at the start of `value`, ignoring anything after
/// the last leading digit. Leading whitespace and a sign are allowed.
pub fn parse_leading_integer(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['-', '+']));
    let digit_len = trimmed[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digit_len == 0 {
        return None;
    }
    trimmed[..sign_len + digit_len].parse().ok()
}

/// Parses a calendar date from the textual forms commonly found in
/// spreadsheets. Timestamps with an offset are normalized to UTC before the
/// date is taken.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%B %d, %Y", "%d %B %Y"];
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];

    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}
