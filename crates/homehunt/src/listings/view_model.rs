use std::sync::Arc;

use tracing::{debug, info, warn};

use super::domain::{Listing, ListingId};
use super::filter::{filter, FilterCriteria, FilterField};
use super::repository::{FetchError, ListingRepository};

/// Owns the cached dataset, the active criteria, and the filtered projection of both.
///
/// Every mutating call recomputes the projection before returning, so
/// [`ListingViewModel::filtered`] is always current and never computed lazily.
pub struct ListingViewModel<R: ?Sized> {
    repository: Arc<R>,
    dataset: Vec<Listing>,
    criteria: FilterCriteria,
    filtered: Vec<Listing>,
    last_error: Option<FetchError>,
}

impl<R> ListingViewModel<R>
where
    R: ListingRepository + ?Sized,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            dataset: Vec::new(),
            criteria: FilterCriteria::default(),
            filtered: Vec::new(),
            last_error: None,
        }
    }

    /// Refresh the dataset from the repository.
    ///
    /// On failure the previously loaded dataset is kept and the error is retained for
    /// [`ListingViewModel::last_error`].
    pub async fn load(&mut self) -> Result<(), FetchError> {
        let outcome = self.repository.fetch_all().await;
        match outcome {
            Ok(listings) => {
                info!(count = listings.len(), "listing dataset loaded");
                self.dataset = listings;
                self.last_error = None;
                self.recompute();
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, kept = self.dataset.len(), "listing dataset load failed");
                self.last_error = Some(err.clone());
                self.recompute();
                Err(err)
            }
        }
    }

    pub fn set_criterion(&mut self, field: FilterField, value: &str) {
        debug!(?field, value, "filter criterion updated");
        self.criteria.set(field, value);
        self.recompute();
    }

    pub fn clear(&mut self) {
        self.criteria = FilterCriteria::default();
        self.recompute();
    }

    pub fn filtered(&self) -> &[Listing] {
        &self.filtered
    }

    pub fn dataset(&self) -> &[Listing] {
        &self.dataset
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    /// Cached listing for the detail view.
    pub fn detail(&self, id: ListingId) -> Option<&Listing> {
        self.dataset.iter().find(|listing| listing.id == id)
    }

    fn recompute(&mut self) {
        let next = filter(&self.dataset, &self.criteria);
        self.filtered = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listings::domain::{
        Category, GenderPreference, InsertReceipt, ListingId, NewListing, UserId,
    };
    use crate::listings::repository::PersistError;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays queued fetch outcomes in order.
    #[derive(Default)]
    struct ScriptedRepository {
        fetches: Mutex<VecDeque<Result<Vec<Listing>, FetchError>>>,
    }

    impl ScriptedRepository {
        fn with(outcomes: Vec<Result<Vec<Listing>, FetchError>>) -> Arc<Self> {
            Arc::new(Self {
                fetches: Mutex::new(outcomes.into()),
            })
        }
    }

    #[async_trait]
    impl ListingRepository for ScriptedRepository {
        async fn fetch_all(&self) -> Result<Vec<Listing>, FetchError> {
            self.fetches
                .lock()
                .expect("fetch script poisoned")
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Transport("script exhausted".to_string())))
        }

        async fn insert(&self, _record: NewListing) -> Result<InsertReceipt, PersistError> {
            Err(PersistError::Unavailable("read only".to_string()))
        }
    }

    fn listing(id: u64, location: &str, category: Category) -> Listing {
        Listing {
            id: ListingId(id),
            posted_by: UserId("owner-9".to_string()),
            title: format!("Flat {id}"),
            description: "Two rooms, gas line".to_string(),
            category: Some(category),
            location: location.to_string(),
            price: 12000,
            gender_preference: Some(GenderPreference::Female),
            image_ref: None,
            owner_name: "Nadia".to_string(),
            owner_email: "nadia@example.com".to_string(),
            owner_phone: "01822222222".to_string(),
            created_at: Utc
                .with_ymd_and_hms(2025, 3, 1, 8, 0, 0)
                .single()
                .expect("valid timestamp"),
        }
    }

    fn sample() -> Vec<Listing> {
        vec![
            listing(3, "Banani", Category::FullFlatRent),
            listing(2, "Dhanmondi", Category::Sublet),
            listing(1, "Gulshan", Category::Sublet),
        ]
    }

    #[tokio::test]
    async fn load_populates_dataset_and_projection() {
        let mut view = ListingViewModel::new(ScriptedRepository::with(vec![Ok(sample())]));
        assert!(view.filtered().is_empty());

        view.load().await.expect("load succeeds");

        assert_eq!(view.dataset().len(), 3);
        assert_eq!(view.filtered(), view.dataset());
        assert!(view.last_error().is_none());
    }

    #[tokio::test]
    async fn criteria_updates_recompute_synchronously() {
        let mut view = ListingViewModel::new(ScriptedRepository::with(vec![Ok(sample())]));
        view.load().await.expect("load succeeds");

        view.set_criterion(FilterField::Category, "Sublet");
        let ids: Vec<u64> = view.filtered().iter().map(|l| l.id.0).collect();
        assert_eq!(ids, vec![2, 1]);

        view.set_criterion(FilterField::Location, "GUL");
        let ids: Vec<u64> = view.filtered().iter().map(|l| l.id.0).collect();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn clear_restores_full_dataset_and_is_idempotent() {
        let mut view = ListingViewModel::new(ScriptedRepository::with(vec![Ok(sample())]));
        view.load().await.expect("load succeeds");
        view.set_criterion(FilterField::Location, "banani");
        view.set_criterion(FilterField::GenderPreference, "Male");
        assert!(view.filtered().is_empty());

        view.clear();
        let once = view.filtered().to_vec();
        view.clear();

        assert_eq!(view.filtered(), once.as_slice());
        assert_eq!(once, sample());
        assert!(view.criteria().is_empty());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_dataset() {
        let mut view = ListingViewModel::new(ScriptedRepository::with(vec![
            Ok(sample()),
            Err(FetchError::Transport("connection reset".to_string())),
        ]));
        view.load().await.expect("first load succeeds");
        view.set_criterion(FilterField::Category, "Full Flat Rent");

        let err = view.load().await.expect_err("second load fails");

        assert_eq!(err, FetchError::Transport("connection reset".to_string()));
        assert_eq!(view.last_error(), Some(&err));
        assert_eq!(view.dataset().len(), 3);
        assert_eq!(view.filtered().len(), 1);
    }

    #[tokio::test]
    async fn failed_first_load_leaves_empty_state() {
        let mut view = ListingViewModel::new(ScriptedRepository::with(vec![
            Err(FetchError::Unauthorized("expired key".to_string())),
            Ok(sample()),
        ]));

        assert!(view.load().await.is_err());
        assert!(view.dataset().is_empty());
        assert!(view.filtered().is_empty());

        view.load().await.expect("retry succeeds");
        assert!(view.last_error().is_none());
        assert_eq!(view.filtered().len(), 3);
    }

    #[tokio::test]
    async fn detail_looks_up_cached_listing() {
        let mut view = ListingViewModel::new(ScriptedRepository::with(vec![Ok(sample())]));
        view.load().await.expect("load succeeds");
        view.set_criterion(FilterField::Location, "Banani");

        let found = view.detail(ListingId(1)).expect("cached listing");
        assert_eq!(found.location, "Gulshan");
        assert!(view.detail(ListingId(99)).is_none());
    }
}
