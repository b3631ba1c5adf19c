use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier for a persisted listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub u64);

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier of the account that posted a listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of housing unit on offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Seat in a Flat")]
    SeatInFlat,
    #[serde(rename = "Full Flat Rent")]
    FullFlatRent,
    #[serde(rename = "Sublet")]
    Sublet,
}

impl Category {
    pub const fn ordered() -> [Self; 3] {
        [Self::SeatInFlat, Self::FullFlatRent, Self::Sublet]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::SeatInFlat => "Seat in a Flat",
            Self::FullFlatRent => "Full Flat Rent",
            Self::Sublet => "Sublet",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|category| category.label() == value)
            .ok_or_else(|| UnknownCategory(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown listing category '{0}'")]
pub struct UnknownCategory(pub String);

/// Tenant gender the owner is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenderPreference {
    Male,
    Female,
    Other,
}

impl GenderPreference {
    pub const fn ordered() -> [Self; 3] {
        [Self::Male, Self::Female, Self::Other]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for GenderPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GenderPreference {
    type Err = UnknownGenderPreference;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|preference| preference.label() == value)
            .ok_or_else(|| UnknownGenderPreference(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown gender preference '{0}'")]
pub struct UnknownGenderPreference(pub String);

/// A persisted rental listing. Only the store hands these out; they are never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub posted_by: UserId,
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub location: String,
    pub price: u32,
    pub gender_preference: Option<GenderPreference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: String,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    pub fn price_label(&self) -> String {
        format!("{} BDT/month", self.price)
    }
}

/// Fully assembled record handed to the store for insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewListing {
    pub posted_by: UserId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub location: String,
    pub price: u32,
    pub gender_preference: GenderPreference,
    pub image_ref: Option<String>,
    pub owner_name: String,
    pub owner_email: String,
    pub owner_phone: String,
}

/// Identity the store assigns when it accepts a [`NewListing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertReceipt {
    pub id: ListingId,
    pub created_at: DateTime<Utc>,
}

impl NewListing {
    pub fn into_listing(self, receipt: InsertReceipt) -> Listing {
        Listing {
            id: receipt.id,
            posted_by: self.posted_by,
            title: self.title,
            description: self.description,
            category: Some(self.category),
            location: self.location,
            price: self.price,
            gender_preference: Some(self.gender_preference),
            image_ref: self.image_ref,
            owner_name: self.owner_name,
            owner_email: self.owner_email,
            owner_phone: self.owner_phone,
            created_at: receipt.created_at,
        }
    }
}
