use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;
use tokio::sync::Notify;

use crate::listings::{
    Category, FetchError, GenderPreference, InsertReceipt, Listing, ListingId, ListingRepository,
    NewListing, PersistError, UserId,
};
use crate::submission::{
    AssetPayload, AssetReference, AssetUploader, AuthContext, OwnerInfo, PropertyField,
    SubmissionWorkflow, UploadError,
};

/// Ordered record of collaborator calls shared between fakes.
#[derive(Default, Clone)]
pub(super) struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub(super) fn push(&self, event: impl Into<String>) {
        self.events.lock().expect("log mutex poisoned").push(event.into());
    }

    pub(super) fn events(&self) -> Vec<String> {
        self.events.lock().expect("log mutex poisoned").clone()
    }
}

pub(super) struct MemoryRepository {
    listings: Mutex<Vec<Listing>>,
    next_id: AtomicU64,
    inserts: Mutex<Vec<NewListing>>,
    fail_insert: Option<PersistError>,
    log: EventLog,
}

impl MemoryRepository {
    pub(super) fn new(log: EventLog) -> Self {
        Self {
            listings: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            inserts: Mutex::new(Vec::new()),
            fail_insert: None,
            log,
        }
    }

    pub(super) fn failing(log: EventLog, error: PersistError) -> Self {
        Self {
            fail_insert: Some(error),
            ..Self::new(log)
        }
    }

    pub(super) fn inserts(&self) -> Vec<NewListing> {
        self.inserts.lock().expect("insert mutex poisoned").clone()
    }
}

#[async_trait]
impl ListingRepository for MemoryRepository {
    async fn fetch_all(&self) -> Result<Vec<Listing>, FetchError> {
        let mut listings = self.listings.lock().expect("listing mutex poisoned").clone();
        listings.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(listings)
    }

    async fn insert(&self, record: NewListing) -> Result<InsertReceipt, PersistError> {
        self.log.push("insert");
        self.inserts
            .lock()
            .expect("insert mutex poisoned")
            .push(record.clone());
        if let Some(error) = &self.fail_insert {
            return Err(error.clone());
        }

        let receipt = InsertReceipt {
            id: ListingId(self.next_id.fetch_add(1, Ordering::Relaxed)),
            created_at: Utc
                .with_ymd_and_hms(2025, 4, 1, 12, 0, 0)
                .single()
                .expect("valid timestamp"),
        };
        self.listings
            .lock()
            .expect("listing mutex poisoned")
            .push(record.into_listing(receipt));
        Ok(receipt)
    }
}

pub(super) struct RecordingUploader {
    outcome: Result<AssetReference, UploadError>,
    calls: AtomicUsize,
    log: EventLog,
}

impl RecordingUploader {
    pub(super) fn succeeding(log: EventLog) -> Self {
        Self {
            outcome: Ok(AssetReference(
                "https://cdn.example.test/storage/v1/object/public/property-images/property-1"
                    .to_string(),
            )),
            calls: AtomicUsize::new(0),
            log,
        }
    }

    pub(super) fn failing(log: EventLog, error: UploadError) -> Self {
        Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
            log,
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetUploader for RecordingUploader {
    async fn upload(&self, _payload: &AssetPayload) -> Result<AssetReference, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.push("upload");
        self.outcome.clone()
    }
}

/// Holds every upload open until [`GatedUploader::release`] is called.
pub(super) struct GatedUploader {
    gate: Notify,
    calls: AtomicUsize,
    log: EventLog,
}

impl GatedUploader {
    pub(super) fn new(log: EventLog) -> Self {
        Self {
            gate: Notify::new(),
            calls: AtomicUsize::new(0),
            log,
        }
    }

    pub(super) fn release(&self) {
        self.gate.notify_one();
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetUploader for GatedUploader {
    async fn upload(&self, payload: &AssetPayload) -> Result<AssetReference, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.push("upload:start");
        self.gate.notified().await;
        self.log.push("upload:end");
        Ok(AssetReference(format!(
            "https://cdn.example.test/storage/v1/object/public/property-images/{}",
            payload.file_name
        )))
    }
}

pub(super) fn owner() -> OwnerInfo {
    OwnerInfo {
        name: "Alice".to_string(),
        email: "a@x.com".to_string(),
        phone: "01712345678".to_string(),
    }
}

pub(super) fn signed_in() -> AuthContext {
    AuthContext::Authenticated(UserId("user-42".to_string()))
}

pub(super) fn image() -> AssetPayload {
    AssetPayload::new("balcony.jpg", mime::IMAGE_JPEG, vec![0xFF, 0xD8, 0xFF, 0xE0])
}

pub(super) fn fill_property<R, U>(workflow: &SubmissionWorkflow<R, U>)
where
    R: ListingRepository + 'static,
    U: AssetUploader + 'static,
{
    let fields = [
        (PropertyField::Title, "Seat near Dhanmondi 27"),
        (PropertyField::Description, "Shared room, meals included"),
        (PropertyField::Category, Category::SeatInFlat.label()),
        (PropertyField::Location, "Dhanmondi"),
        (PropertyField::Price, "5500"),
        (PropertyField::GenderPreference, GenderPreference::Female.label()),
    ];
    for (field, value) in fields {
        workflow
            .set_property_field(field, value)
            .expect("property field accepted");
    }
}

/// Workflow positioned at step two with a complete, valid draft.
pub(super) fn ready_workflow<R, U>(
    repository: Arc<R>,
    uploader: Arc<U>,
) -> SubmissionWorkflow<R, U>
where
    R: ListingRepository + 'static,
    U: AssetUploader + 'static,
{
    let workflow = SubmissionWorkflow::new(repository, uploader);
    workflow.set_owner(owner()).expect("owner accepted");
    workflow.advance().expect("owner guard passes");
    fill_property(&workflow);
    workflow
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
