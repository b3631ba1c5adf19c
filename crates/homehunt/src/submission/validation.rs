use crate::listings::{Category, GenderPreference, UnknownCategory, UnknownGenderPreference};

use super::domain::{OwnerInfo, PropertyInfo};

/// Guard failure raised before any I/O; the workflow state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("owner details incomplete, missing: {}", .0.join(", "))]
    IncompleteOwner(Vec<&'static str>),
    #[error("property details incomplete, missing: {}", .0.join(", "))]
    IncompleteProperty(Vec<&'static str>),
    #[error("price '{0}' is not a whole number of taka")]
    InvalidPrice(String),
    #[error(transparent)]
    UnknownCategory(#[from] UnknownCategory),
    #[error(transparent)]
    UnknownGenderPreference(#[from] UnknownGenderPreference),
}

/// Property fields after the submit guard has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProperty {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub location: String,
    pub price: u32,
    pub gender_preference: GenderPreference,
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn check_owner(owner: &OwnerInfo) -> Result<(), ValidationError> {
    let missing: Vec<&'static str> = [
        ("name", &owner.name),
        ("email", &owner.email),
        ("phone", &owner.phone),
    ]
    .into_iter()
    .filter(|(_, value)| blank(value))
    .map(|(field, _)| field)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::IncompleteOwner(missing))
    }
}

pub fn check_property(property: &PropertyInfo) -> Result<ValidatedProperty, ValidationError> {
    let mut missing = Vec::new();
    if blank(&property.title) {
        missing.push("title");
    }
    if blank(&property.description) {
        missing.push("description");
    }
    if property.category.is_none() {
        missing.push("category");
    }
    if blank(&property.location) {
        missing.push("location");
    }
    if blank(&property.price) {
        missing.push("price");
    }
    if property.gender_preference.is_none() {
        missing.push("gender preference");
    }

    let (Some(category), Some(gender_preference)) =
        (property.category, property.gender_preference)
    else {
        return Err(ValidationError::IncompleteProperty(missing));
    };
    if !missing.is_empty() {
        return Err(ValidationError::IncompleteProperty(missing));
    }

    let price = parse_price(&property.price)?;

    Ok(ValidatedProperty {
        title: property.title.trim().to_string(),
        description: property.description.trim().to_string(),
        category,
        location: property.location.trim().to_string(),
        price,
        gender_preference,
    })
}

fn parse_price(raw: &str) -> Result<u32, ValidationError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidPrice(raw.to_string()))
}
