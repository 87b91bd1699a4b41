use serde::{Deserialize, Serialize};

use super::FilterField;

/// Backend-canonical names use underscores in place of spaces.
/// Decode only for presentation; filter values keep the encoded form.
pub fn display_name(encoded: &str) -> String {
    encoded.replace('_', " ")
}

/// A movie record as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieResult {
    /// Stable identifier, unique within one response
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub directors: Vec<String>,
    #[serde(default)]
    pub actors: Vec<String>,
    /// Only meaningful on items returned by a similarity lookup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

impl MovieResult {
    pub fn display_directors(&self) -> Vec<String> {
        self.directors.iter().map(|d| display_name(d)).collect()
    }

    pub fn display_actors(&self) -> Vec<String> {
        self.actors.iter().map(|a| display_name(a)).collect()
    }

    /// Label for the similarity decoration, shown only for positive scores
    pub fn similarity_label(&self) -> Option<String> {
        self.similarity
            .filter(|score| *score > 0.0)
            .map(|score| format!("Similarity: {}", score))
    }
}

/// The selectable universe for the dropdown-style filter fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterOptions {
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub directors: Vec<String>,
    #[serde(default)]
    pub actors: Vec<String>,
}

/// One entry of a dropdown: the encoded value and its display label
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OptionChoice {
    pub value: String,
    pub label: String,
}

impl FilterOptions {
    pub fn values(&self, field: FilterField) -> &[String] {
        match field {
            FilterField::Genre => &self.genres,
            FilterField::Director => &self.directors,
            FilterField::Actor => &self.actors,
            _ => &[],
        }
    }

    /// Dropdown entries for `field`; free-form fields have none
    pub fn choices(&self, field: FilterField) -> Vec<OptionChoice> {
        self.values(field)
            .iter()
            .map(|value| OptionChoice {
                value: value.clone(),
                label: display_name(value),
            })
            .collect()
    }
}
