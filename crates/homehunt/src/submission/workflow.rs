use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::domain::{AssetPayload, AuthContext, OwnerInfo, SubmissionDraft};
use super::uploader::{AssetReference, AssetUploader, UploadError};
use super::validation::{self, ValidatedProperty, ValidationError};
use crate::listings::{
    Category, GenderPreference, Listing, ListingRepository, NewListing, PersistError, UserId,
};

/// Externally visible position of a [`SubmissionWorkflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    CollectingOwnerInfo,
    CollectingPropertyInfo,
    Submitting,
    Committed,
    Failed,
}

impl WorkflowStage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::CollectingOwnerInfo => "collecting owner details",
            Self::CollectingPropertyInfo => "collecting property details",
            Self::Submitting => "submitting",
            Self::Committed => "committed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for WorkflowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerField {
    Name,
    Email,
    Phone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyField {
    Title,
    Description,
    Category,
    Location,
    Price,
    GenderPreference,
}

/// External step that ended an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    Upload(UploadError),
    Persist(PersistError),
}

/// Terminal failure record. `orphaned_asset` is set when the image was stored but the
/// listing was not; nothing removes that object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFailure {
    pub cause: FailureCause,
    pub orphaned_asset: Option<AssetReference>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Committed(Listing),
    /// Another attempt was already in flight; no call was issued.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("sign in before posting a listing")]
    Authentication,
    #[error("cannot {action} while {stage}")]
    InvalidState {
        stage: WorkflowStage,
        action: &'static str,
    },
    #[error("image upload failed: {0}")]
    Upload(UploadError),
    #[error("listing could not be saved: {0}")]
    Persist(PersistError),
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    CollectingOwnerInfo,
    CollectingPropertyInfo,
    Submitting,
    Committed(Listing),
    Failed(SubmissionFailure),
}

impl State {
    fn stage(&self) -> WorkflowStage {
        match self {
            State::CollectingOwnerInfo => WorkflowStage::CollectingOwnerInfo,
            State::CollectingPropertyInfo => WorkflowStage::CollectingPropertyInfo,
            State::Submitting => WorkflowStage::Submitting,
            State::Committed(_) => WorkflowStage::Committed,
            State::Failed(_) => WorkflowStage::Failed,
        }
    }
}

struct Inner {
    state: State,
    draft: SubmissionDraft,
}

/// Snapshot taken when an attempt starts; the draft itself stays in place for retries.
struct Attempt {
    user_id: UserId,
    owner: OwnerInfo,
    property: ValidatedProperty,
    image: Option<AssetPayload>,
}

/// Two-step owner/property intake that uploads an optional image and then persists
/// the assembled listing.
///
/// The workflow is shared by reference: the `Submitting` state doubles as the gate that
/// turns overlapping `submit` calls into no-ops. The internal lock is never held across
/// an upload or insert.
pub struct SubmissionWorkflow<R, U> {
    repository: Arc<R>,
    uploader: Arc<U>,
    inner: Mutex<Inner>,
}

impl<R, U> SubmissionWorkflow<R, U>
where
    R: ListingRepository + 'static,
    U: AssetUploader + 'static,
{
    pub fn new(repository: Arc<R>, uploader: Arc<U>) -> Self {
        Self::with_state(
            repository,
            uploader,
            State::CollectingOwnerInfo,
            SubmissionDraft::default(),
        )
    }

    /// Start a fresh attempt from a preserved draft, skipping step one when it is complete.
    pub fn resume(repository: Arc<R>, uploader: Arc<U>, draft: SubmissionDraft) -> Self {
        let state = match validation::check_owner(&draft.owner) {
            Ok(()) => State::CollectingPropertyInfo,
            Err(_) => State::CollectingOwnerInfo,
        };
        Self::with_state(repository, uploader, state, draft)
    }

    fn with_state(
        repository: Arc<R>,
        uploader: Arc<U>,
        state: State,
        draft: SubmissionDraft,
    ) -> Self {
        Self {
            repository,
            uploader,
            inner: Mutex::new(Inner { state, draft }),
        }
    }

    pub fn stage(&self) -> WorkflowStage {
        self.lock().state.stage()
    }

    pub fn draft(&self) -> SubmissionDraft {
        self.lock().draft.clone()
    }

    pub fn committed(&self) -> Option<Listing> {
        match &self.lock().state {
            State::Committed(listing) => Some(listing.clone()),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<SubmissionFailure> {
        match &self.lock().state {
            State::Failed(failure) => Some(failure.clone()),
            _ => None,
        }
    }

    /// Draft captured by a failed attempt, for seeding [`SubmissionWorkflow::resume`].
    pub fn retry_draft(&self) -> Option<SubmissionDraft> {
        let inner = self.lock();
        match inner.state {
            State::Failed(_) => Some(inner.draft.clone()),
            _ => None,
        }
    }

    pub fn set_owner_field(&self, field: OwnerField, value: &str) -> Result<(), WorkflowError> {
        let mut inner = self.lock();
        expect_stage(&inner, WorkflowStage::CollectingOwnerInfo, "edit owner details")?;
        let slot = match field {
            OwnerField::Name => &mut inner.draft.owner.name,
            OwnerField::Email => &mut inner.draft.owner.email,
            OwnerField::Phone => &mut inner.draft.owner.phone,
        };
        *slot = value.to_string();
        Ok(())
    }

    pub fn set_owner(&self, owner: OwnerInfo) -> Result<(), WorkflowError> {
        let mut inner = self.lock();
        expect_stage(&inner, WorkflowStage::CollectingOwnerInfo, "edit owner details")?;
        inner.draft.owner = owner;
        Ok(())
    }

    /// Apply raw input to one property field. Selections must name a known value or be empty.
    pub fn set_property_field(
        &self,
        field: PropertyField,
        value: &str,
    ) -> Result<(), WorkflowError> {
        let mut inner = self.lock();
        expect_stage(
            &inner,
            WorkflowStage::CollectingPropertyInfo,
            "edit property details",
        )?;
        let property = &mut inner.draft.property;
        match field {
            PropertyField::Title => property.title = value.to_string(),
            PropertyField::Description => property.description = value.to_string(),
            PropertyField::Location => property.location = value.to_string(),
            PropertyField::Price => property.price = value.to_string(),
            PropertyField::Category => {
                property.category = parse_selection::<Category>(value)?;
            }
            PropertyField::GenderPreference => {
                property.gender_preference = parse_selection::<GenderPreference>(value)?;
            }
        }
        Ok(())
    }

    pub fn attach_image(&self, payload: AssetPayload) -> Result<(), WorkflowError> {
        let mut inner = self.lock();
        expect_stage(&inner, WorkflowStage::CollectingPropertyInfo, "attach an image")?;
        inner.draft.property.image = Some(payload);
        Ok(())
    }

    pub fn clear_image(&self) -> Result<(), WorkflowError> {
        let mut inner = self.lock();
        expect_stage(&inner, WorkflowStage::CollectingPropertyInfo, "remove the image")?;
        inner.draft.property.image = None;
        Ok(())
    }

    /// Move from owner details to property details once name, email, and phone are set.
    pub fn advance(&self) -> Result<(), WorkflowError> {
        let mut inner = self.lock();
        expect_stage(&inner, WorkflowStage::CollectingOwnerInfo, "advance")?;
        validation::check_owner(&inner.draft.owner)?;
        inner.state = State::CollectingPropertyInfo;
        debug!("owner details accepted");
        Ok(())
    }

    /// Upload the image if one is attached, then persist the listing.
    ///
    /// Calls made while an attempt is in flight return [`SubmitOutcome::Ignored`].
    pub async fn submit(&self, auth: &AuthContext) -> Result<SubmitOutcome, WorkflowError> {
        let Some(attempt) = self.begin_attempt(auth)? else {
            return Ok(SubmitOutcome::Ignored);
        };

        let image_ref = match &attempt.image {
            Some(payload) => match self.uploader.upload(payload).await {
                Ok(reference) => {
                    debug!(asset = %reference, "listing image uploaded");
                    Some(reference)
                }
                Err(err) => {
                    warn!(error = %err, "listing image upload failed");
                    self.settle(State::Failed(SubmissionFailure {
                        cause: FailureCause::Upload(err.clone()),
                        orphaned_asset: None,
                    }));
                    return Err(WorkflowError::Upload(err));
                }
            },
            None => None,
        };

        let record = assemble(attempt, image_ref.as_ref());
        match self.repository.insert(record.clone()).await {
            Ok(receipt) => {
                let listing = record.into_listing(receipt);
                info!(
                    listing_id = %listing.id,
                    has_image = listing.image_ref.is_some(),
                    "listing committed"
                );
                self.settle(State::Committed(listing.clone()));
                Ok(SubmitOutcome::Committed(listing))
            }
            Err(err) => {
                if let Some(asset) = &image_ref {
                    warn!(
                        asset = %asset,
                        error = %err,
                        "listing not saved; uploaded image left orphaned"
                    );
                } else {
                    warn!(error = %err, "listing not saved");
                }
                self.settle(State::Failed(SubmissionFailure {
                    cause: FailureCause::Persist(err.clone()),
                    orphaned_asset: image_ref,
                }));
                Err(WorkflowError::Persist(err))
            }
        }
    }

    fn begin_attempt(&self, auth: &AuthContext) -> Result<Option<Attempt>, WorkflowError> {
        let mut inner = self.lock();
        match inner.state {
            State::CollectingPropertyInfo => {}
            State::Submitting => {
                debug!("submit ignored; attempt already in flight");
                return Ok(None);
            }
            ref other => {
                return Err(WorkflowError::InvalidState {
                    stage: other.stage(),
                    action: "submit",
                })
            }
        }

        let user_id = auth
            .current_user_id()
            .cloned()
            .ok_or(WorkflowError::Authentication)?;
        let property = validation::check_property(&inner.draft.property)?;

        inner.state = State::Submitting;
        info!(user_id = %user_id, "listing submission started");
        Ok(Some(Attempt {
            user_id,
            owner: inner.draft.owner.clone(),
            property,
            image: inner.draft.property.image.clone(),
        }))
    }

    fn settle(&self, state: State) {
        self.lock().state = state;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn expect_stage(
    inner: &Inner,
    expected: WorkflowStage,
    action: &'static str,
) -> Result<(), WorkflowError> {
    let stage = inner.state.stage();
    if stage == expected {
        Ok(())
    } else {
        Err(WorkflowError::InvalidState { stage, action })
    }
}

fn parse_selection<T>(value: &str) -> Result<Option<T>, ValidationError>
where
    T: std::str::FromStr,
    ValidationError: From<T::Err>,
{
    if value.is_empty() {
        return Ok(None);
    }
    Ok(Some(value.parse::<T>()?))
}

fn assemble(attempt: Attempt, image_ref: Option<&AssetReference>) -> NewListing {
    let Attempt {
        user_id,
        owner,
        property,
        ..
    } = attempt;

    NewListing {
        posted_by: user_id,
        title: property.title,
        description: property.description,
        category: property.category,
        location: property.location,
        price: property.price,
        gender_preference: property.gender_preference,
        image_ref: image_ref.map(|reference| reference.0.clone()),
        owner_name: owner.name.trim().to_string(),
        owner_email: owner.email.trim().to_string(),
        owner_phone: owner.phone.trim().to_string(),
    }
}
