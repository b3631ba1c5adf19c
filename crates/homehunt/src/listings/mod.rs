//! Read side: listing model, filter engine, repository contract, and view model.

pub mod domain;
pub mod filter;
pub(crate) mod handlers;
pub mod repository;
pub mod view_model;

pub use domain::{
    Category, GenderPreference, InsertReceipt, Listing, ListingId, NewListing, UnknownCategory,
    UnknownGenderPreference, UserId,
};
pub use filter::{filter, ExactMatch, FilterCriteria, FilterField};
pub use repository::{FetchError, ListingRepository, PersistError};
pub use view_model::ListingViewModel;
