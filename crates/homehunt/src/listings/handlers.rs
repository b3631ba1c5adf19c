use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{Listing, ListingId};
use super::filter::FilterField;
use super::repository::ListingRepository;
use super::view_model::ListingViewModel;
use crate::error::AppError;
use crate::router::ApiState;
use crate::submission::AssetUploader;

/// Browse query; absent parameters match everything.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ListingQuery {
    pub(crate) location: String,
    pub(crate) category: String,
    pub(crate) gender: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ListingPage {
    pub(crate) total: usize,
    pub(crate) matched: usize,
    pub(crate) listings: Vec<Listing>,
}

pub(crate) async fn list_handler<R, U>(
    State(state): State<ApiState<R, U>>,
    Query(query): Query<ListingQuery>,
) -> Response
where
    R: ListingRepository + 'static,
    U: AssetUploader + 'static,
{
    let mut view = ListingViewModel::new(state.repository);
    if let Err(err) = view.load().await {
        return AppError::from(err).into_response();
    }

    view.set_criterion(FilterField::Location, &query.location);
    view.set_criterion(FilterField::Category, &query.category);
    view.set_criterion(FilterField::GenderPreference, &query.gender);

    let page = ListingPage {
        total: view.dataset().len(),
        matched: view.filtered().len(),
        listings: view.filtered().to_vec(),
    };
    (StatusCode::OK, Json(page)).into_response()
}

pub(crate) async fn detail_handler<R, U>(
    State(state): State<ApiState<R, U>>,
    Path(listing_id): Path<u64>,
) -> Response
where
    R: ListingRepository + 'static,
    U: AssetUploader + 'static,
{
    let mut view = ListingViewModel::new(state.repository);
    if let Err(err) = view.load().await {
        return AppError::from(err).into_response();
    }

    let id = ListingId(listing_id);
    match view.detail(id) {
        Some(listing) => (StatusCode::OK, Json(listing.clone())).into_response(),
        None => {
            let payload = json!({
                "error": format!("listing {id} not found"),
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
    }
}
