use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use crate::error::AppError;

/// Fields the backend understands as search filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    /// Free text, matched by the backend
    Title,
    Genre,
    Director,
    Actor,
    YearStart,
    YearEnd,
}

impl FilterField {
    pub const ALL: [FilterField; 6] = [
        FilterField::Title,
        FilterField::Genre,
        FilterField::Director,
        FilterField::Actor,
        FilterField::YearStart,
        FilterField::YearEnd,
    ];

    /// Query parameter name sent to the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Title => "title",
            FilterField::Genre => "genre",
            FilterField::Director => "director",
            FilterField::Actor => "actor",
            FilterField::YearStart => "year_start",
            FilterField::YearEnd => "year_end",
        }
    }

    /// Whether the field can be re-seeded from a name shown inside a result
    pub fn is_person(&self) -> bool {
        matches!(self, FilterField::Director | FilterField::Actor)
    }
}

impl Display for FilterField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown filter field: {}", s)))
    }
}

/// Immutable snapshot of the filter selections submitted with one search
///
/// Only fields holding a non-blank value are present, so the snapshot can be
/// turned into query parameters without any special-casing downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterSet(BTreeMap<FilterField, String>);

impl FilterSet {
    pub fn get(&self, field: FilterField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterField, &str)> {
        self.0.iter().map(|(field, value)| (*field, value.as_str()))
    }

    /// Backend query parameters, values forwarded verbatim
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        self.iter().map(|(field, value)| (field.as_str(), value)).collect()
    }
}

/// Mutable filter state built up by user input
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    values: BTreeMap<FilterField, String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the value for `field`. A blank value clears the field.
    ///
    /// No validation happens here: malformed years or unknown option values
    /// are forwarded to the backend as-is.
    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            self.values.remove(&field);
        } else {
            self.values.insert(field, value);
        }
    }

    pub fn clear(&mut self, field: FilterField) {
        self.values.remove(&field);
    }

    pub fn snapshot(&self) -> FilterSet {
        FilterSet(self.values.clone())
    }
}
