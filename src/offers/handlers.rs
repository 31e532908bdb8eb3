use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::accounts::dto::AccountSummary;
use crate::accounts::extractors::AuthAccount;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

use super::dto::{OfferResponse, PublishFields, SearchResponse};
use super::query::{OfferQuery, SearchParams};
use super::repo::Offer;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/offers", get(search))
        .route("/offers/:id", get(get_offer))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/offer/publish", post(publish))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

/// POST /offer/publish (protected, multipart)
/// Text fields: title, description, price, condition, city, brand, size,
/// color. Optional binary field: picture.
#[instrument(skip(state, account, multipart))]
pub async fn publish(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<OfferResponse>)> {
    let mut fields = PublishFields::default();
    let mut picture: Option<(Bytes, String)> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let Some(name) = field.name().map(|s| s.to_string()) else {
            continue;
        };
        if name == "picture" {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".into());
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(e.to_string()))?;
            picture = Some((data, content_type));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::Validation(e.to_string()))?;
            fields.set(&name, value);
        }
    }

    if fields.title.trim().is_empty() {
        return Err(ApiError::Validation("title is required".into()));
    }
    let price: f64 = fields
        .price
        .trim()
        .parse()
        .ok()
        .filter(|p: &f64| p.is_finite() && *p >= 0.0)
        .ok_or_else(|| ApiError::Validation("price must be a non-negative number".into()))?;

    // upload before touching the database, so a failed upload leaves no
    // half-written offer behind
    let image = match picture {
        Some((data, content_type)) => {
            let uploaded = state
                .media
                .upload(data, &content_type)
                .await
                .map_err(|e| ApiError::Upload(e.to_string()))?;
            Some(serde_json::to_value(uploaded).map_err(anyhow::Error::new)?)
        }
        None => None,
    };

    let offer = Offer::create(
        &state.db,
        account.id,
        fields.title.trim(),
        &fields.description,
        price,
        fields.details(),
        image,
    )
    .await?;

    info!(offer_id = %offer.id, "offer published");
    Ok((
        StatusCode::CREATED,
        Json(OfferResponse::published(offer, AccountSummary::from(&account))),
    ))
}

/// GET /offers — filtered, sorted, paginated search.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    let query = OfferQuery::from_params(&params);
    let (page, count) = Offer::search(&state.db, &query).await?;
    Ok(Json(SearchResponse {
        count,
        matched_offers: page.into_iter().map(Into::into).collect(),
    }))
}

/// GET /offers/:id
#[instrument(skip(state))]
pub async fn get_offer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<OfferResponse>> {
    let offer = Offer::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("No offer found with this id".into()))?;
    Ok(Json(offer.into()))
}
