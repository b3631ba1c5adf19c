use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::listings::handlers::{detail_handler, list_handler};
use crate::listings::ListingRepository;
use crate::submission::handlers::submit_handler;
use crate::submission::AssetUploader;

/// Collaborators shared by every listing route.
pub struct ApiState<R, U> {
    pub repository: Arc<R>,
    pub uploader: Arc<U>,
}

impl<R, U> ApiState<R, U> {
    pub fn new(repository: Arc<R>, uploader: Arc<U>) -> Self {
        Self {
            repository,
            uploader,
        }
    }
}

impl<R, U> Clone for ApiState<R, U> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            uploader: Arc::clone(&self.uploader),
        }
    }
}

/// Router builder exposing browse, detail, and submission endpoints.
pub fn api_router<R, U>(state: ApiState<R, U>) -> Router
where
    R: ListingRepository + 'static,
    U: AssetUploader + 'static,
{
    Router::new()
        .route(
            "/api/v1/listings",
            get(list_handler::<R, U>).post(submit_handler::<R, U>),
        )
        .route(
            "/api/v1/listings/:listing_id",
            get(detail_handler::<R, U>),
        )
        .with_state(state)
}
