//! Write side: the owner/property submission workflow and its collaborators.
//!
//! A [`SubmissionWorkflow`] walks `CollectingOwnerInfo -> CollectingPropertyInfo ->
//! Submitting -> Committed | Failed`. Guards run before any I/O; the image upload, when
//! present, always resolves before the listing insert is issued.

pub mod domain;
pub(crate) mod handlers;
pub mod uploader;
pub mod validation;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use domain::{AssetPayload, AuthContext, OwnerInfo, PropertyInfo, SubmissionDraft};
pub use handlers::{
    ImageSubmission, ListingSubmissionRequest, PropertySubmission, USER_ID_HEADER,
};
pub use uploader::{AssetReference, AssetUploader, PublicBucket, UploadError};
pub use validation::{ValidatedProperty, ValidationError};
pub use workflow::{
    FailureCause, OwnerField, PropertyField, SubmissionFailure, SubmissionWorkflow,
    SubmitOutcome, WorkflowError, WorkflowStage,
};
