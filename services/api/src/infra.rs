use async_trait::async_trait;
use chrono::{Duration, Utc};
use homehunt::listings::{
    Category, FetchError, GenderPreference, InsertReceipt, Listing, ListingId, ListingRepository,
    NewListing, PersistError, UserId,
};
use homehunt::submission::{
    AssetPayload, AssetReference, AssetUploader, PublicBucket, UploadError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local listing table. Ids are assigned sequentially.
pub(crate) struct InMemoryListingRepository {
    records: Mutex<Vec<Listing>>,
    next_id: AtomicU64,
}

impl Default for InMemoryListingRepository {
    fn default() -> Self {
        Self::with_listings(Vec::new())
    }
}

impl InMemoryListingRepository {
    pub(crate) fn with_listings(listings: Vec<Listing>) -> Self {
        let next_id = listings
            .iter()
            .map(|listing| listing.id.0)
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            records: Mutex::new(listings),
            next_id: AtomicU64::new(next_id),
        }
    }
}

#[async_trait]
impl ListingRepository for InMemoryListingRepository {
    async fn fetch_all(&self) -> Result<Vec<Listing>, FetchError> {
        let guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let mut listings = guard.clone();
        listings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(listings)
    }

    async fn insert(&self, record: NewListing) -> Result<InsertReceipt, PersistError> {
        if record.owner_email.trim().is_empty() {
            return Err(PersistError::Constraint(
                "owner_email must not be empty".to_string(),
            ));
        }
        let receipt = InsertReceipt {
            id: ListingId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            created_at: Utc::now(),
        };
        let mut guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        guard.push(record.into_listing(receipt));
        debug!(listing_id = %receipt.id, "listing stored");
        Ok(receipt)
    }
}

/// Object store double that addresses images the same way the hosted bucket does.
pub(crate) struct InMemoryObjectStore {
    bucket: PublicBucket,
    objects: Mutex<HashMap<String, AssetPayload>>,
}

impl InMemoryObjectStore {
    pub(crate) fn new(bucket: PublicBucket) -> Self {
        Self {
            bucket,
            objects: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl AssetUploader for InMemoryObjectStore {
    async fn upload(&self, payload: &AssetPayload) -> Result<AssetReference, UploadError> {
        if payload.is_empty() {
            return Err(UploadError::EmptyPayload);
        }
        let key = PublicBucket::object_key(Utc::now());
        let mut guard = self.objects.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.contains_key(&key) {
            return Err(UploadError::Rejected(format!(
                "object {key} already exists in {}",
                self.bucket.bucket()
            )));
        }
        guard.insert(key.clone(), payload.clone());
        debug!(
            %key,
            bytes = payload.len(),
            content_type = %payload.content_type,
            "object stored"
        );
        Ok(self.bucket.public_reference(&key))
    }
}

struct Seed {
    title: &'static str,
    location: &'static str,
    category: Category,
    price: u32,
    gender: GenderPreference,
    owner: &'static str,
}

const SEEDS: [Seed; 5] = [
    Seed {
        title: "Furnished seat near Mirpur 10 circle",
        location: "Mirpur 10",
        category: Category::SeatInFlat,
        price: 4500,
        gender: GenderPreference::Male,
        owner: "Rahim",
    },
    Seed {
        title: "Family flat with two balconies",
        location: "Dhanmondi 27",
        category: Category::FullFlatRent,
        price: 32000,
        gender: GenderPreference::Other,
        owner: "Nasrin",
    },
    Seed {
        title: "Quiet sublet room for students",
        location: "Mirpur 2",
        category: Category::Sublet,
        price: 9000,
        gender: GenderPreference::Female,
        owner: "Shila",
    },
    Seed {
        title: "Shared flat close to North South University",
        location: "Bashundhara R/A",
        category: Category::SeatInFlat,
        price: 6000,
        gender: GenderPreference::Female,
        owner: "Tania",
    },
    Seed {
        title: "Sublet with attached bath",
        location: "Uttara Sector 7",
        category: Category::Sublet,
        price: 11000,
        gender: GenderPreference::Male,
        owner: "Karim",
    },
];

/// Starter catalogue for the local service and the CLI demo, newest first.
pub(crate) fn seed_listings() -> Vec<Listing> {
    let now = Utc::now();
    let count = SEEDS.len() as u64;
    SEEDS
        .iter()
        .enumerate()
        .map(|(index, seed)| {
            let id = count - index as u64;
            Listing {
                id: ListingId(id),
                posted_by: UserId(format!("seed-owner-{id}")),
                title: seed.title.to_string(),
                description: format!("{} in {}", seed.category, seed.location),
                category: Some(seed.category),
                location: seed.location.to_string(),
                price: seed.price,
                gender_preference: Some(seed.gender),
                image_ref: None,
                owner_name: seed.owner.to_string(),
                owner_email: format!("{}@homehunt.test", seed.owner.to_lowercase()),
                owner_phone: format!("0171100000{id}"),
                created_at: now - Duration::days(index as i64 + 1),
            }
        })
        .collect()
}
