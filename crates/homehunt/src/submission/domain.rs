use std::fmt;

use mime::Mime;
use serde::{Deserialize, Serialize};

use crate::listings::{Category, GenderPreference, UserId};

/// Step one of the draft: how prospective tenants reach the owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Step two of the draft, held as entered. `price` stays raw until the submit guard parses it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyInfo {
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub location: String,
    pub price: String,
    pub gender_preference: Option<GenderPreference>,
    pub image: Option<AssetPayload>,
}

/// In-progress owner and property data, discarded once the listing is committed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionDraft {
    pub owner: OwnerInfo,
    pub property: PropertyInfo,
}

/// A single local image that has not been uploaded yet.
#[derive(Clone, PartialEq)]
pub struct AssetPayload {
    pub file_name: String,
    pub content_type: Mime,
    pub bytes: Vec<u8>,
}

impl AssetPayload {
    pub fn new(file_name: impl Into<String>, content_type: Mime, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for AssetPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetPayload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type.essence_str())
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Caller identity handed to the workflow at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    Authenticated(UserId),
    Anonymous,
}

impl AuthContext {
    /// Blank or missing identifiers are treated as anonymous.
    pub fn from_user_id(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(id) if !id.is_empty() => Self::Authenticated(UserId(id.to_string())),
            _ => Self::Anonymous,
        }
    }

    pub fn current_user_id(&self) -> Option<&UserId> {
        match self {
            Self::Authenticated(id) => Some(id),
            Self::Anonymous => None,
        }
    }
}
