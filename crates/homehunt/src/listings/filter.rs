use std::str::FromStr;

use super::domain::{Category, GenderPreference, Listing};

/// Exact-match constraint over a closed enumeration.
///
/// Raw input that names no known value is kept as [`ExactMatch::Unrecognized`] and
/// matches nothing, so a stale or mistyped filter narrows the view instead of
/// silently widening it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExactMatch<T> {
    Any,
    Only(T),
    Unrecognized(String),
}

impl<T> Default for ExactMatch<T> {
    fn default() -> Self {
        Self::Any
    }
}

impl<T: FromStr> ExactMatch<T> {
    /// Empty input means "match all".
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::Any;
        }
        match raw.parse() {
            Ok(value) => Self::Only(value),
            Err(_) => Self::Unrecognized(raw.to_string()),
        }
    }
}

impl<T: PartialEq> ExactMatch<T> {
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    pub fn matches(&self, value: Option<&T>) -> bool {
        match self {
            Self::Any => true,
            Self::Only(expected) => value == Some(expected),
            Self::Unrecognized(_) => false,
        }
    }
}

/// Field addressed by a single criterion update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Location,
    Category,
    GenderPreference,
}

/// Client-held constraints narrowing the displayed listings. Criteria combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub location: String,
    pub category: ExactMatch<Category>,
    pub gender_preference: ExactMatch<GenderPreference>,
}

impl FilterCriteria {
    pub fn from_raw(location: &str, category: &str, gender_preference: &str) -> Self {
        Self {
            location: location.to_string(),
            category: ExactMatch::parse(category),
            gender_preference: ExactMatch::parse(gender_preference),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.location.is_empty() && self.category.is_any() && self.gender_preference.is_any()
    }

    /// Replace one criterion from raw user input.
    pub fn set(&mut self, field: FilterField, value: &str) {
        match field {
            FilterField::Location => self.location = value.to_string(),
            FilterField::Category => self.category = ExactMatch::parse(value),
            FilterField::GenderPreference => self.gender_preference = ExactMatch::parse(value),
        }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        self.matches_location(listing)
            && self.category.matches(listing.category.as_ref())
            && self
                .gender_preference
                .matches(listing.gender_preference.as_ref())
    }

    fn matches_location(&self, listing: &Listing) -> bool {
        self.location.is_empty()
            || listing
                .location
                .to_lowercase()
                .contains(&self.location.to_lowercase())
    }
}

/// Derive the displayed subset of `dataset`, keeping its relative order.
pub fn filter(dataset: &[Listing], criteria: &FilterCriteria) -> Vec<Listing> {
    if criteria.is_empty() {
        return dataset.to_vec();
    }

    dataset
        .iter()
        .filter(|listing| criteria.matches(listing))
        .cloned()
        .collect()
}
