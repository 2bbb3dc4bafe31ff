//! Cafe route handlers.

use axum::extract::{Path, Query, State};
use axum::{Form, Json};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult, CAFE_NOT_FOUND};
use crate::models::{form_bool, Cafe, NewCafe};
use crate::AppState;

/// Highest id in the seeded dataset; ids above it were submitted through the API.
const SEEDED_MAX_ID: i64 = 22;

const LOCATION_NOT_FOUND: &str = "Sorry, we don't have a cafe at that location.";
const STORE_EMPTY: &str = "Sorry, there are no cafes in the database.";
const WRONG_API_KEY: &str = "Sorry, that's not allowed. Make sure you have the correct api_key";

#[derive(Debug, Serialize)]
pub struct CafeResponse {
    cafe: Cafe,
}

#[derive(Debug, Serialize)]
pub struct CafeListResponse {
    cafes: Vec<Cafe>,
}

fn success(message: &str) -> Json<Value> {
    Json(json!({ "response": { "success": message } }))
}

/// GET /random — one cafe drawn uniformly from the whole table.
pub async fn random(State(state): State<AppState>) -> ApiResult<Json<CafeResponse>> {
    let cafes = state.db.list_cafes().await?;
    let cafe = cafes
        .choose(&mut rand::thread_rng())
        .cloned()
        .ok_or_else(|| ApiError::NotFound(STORE_EMPTY.to_string()))?;
    Ok(Json(CafeResponse { cafe }))
}

/// GET /all
pub async fn all(State(state): State<AppState>) -> ApiResult<Json<CafeListResponse>> {
    let cafes = state.db.list_cafes().await?;
    Ok(Json(CafeListResponse { cafes }))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    loc: Option<String>,
}

/// GET /search?loc=...
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<CafeListResponse>> {
    let cafes = match params.loc {
        Some(loc) => state.db.find_cafes_by_location(&loc).await?,
        // An absent `loc` matches nothing, like any unknown location.
        None => Vec::new(),
    };

    if cafes.is_empty() {
        return Err(ApiError::NotFound(LOCATION_NOT_FOUND.to_string()));
    }
    Ok(Json(CafeListResponse { cafes }))
}

#[derive(Debug, Deserialize)]
pub struct AddCafeForm {
    name: Option<String>,
    map_url: Option<String>,
    img_url: Option<String>,
    location: Option<String>,
    seats: Option<String>,
    has_toilet: Option<String>,
    has_wifi: Option<String>,
    has_sockets: Option<String>,
    can_take_calls: Option<String>,
    coffee_price: Option<String>,
}

impl AddCafeForm {
    fn into_new_cafe(self) -> ApiResult<NewCafe> {
        Ok(NewCafe {
            name: required(self.name, "name")?,
            map_url: required(self.map_url, "map_url")?,
            img_url: required(self.img_url, "img_url")?,
            location: required(self.location, "location")?,
            seats: required(self.seats, "seats")?,
            has_toilet: form_bool(&required(self.has_toilet, "has_toilet")?),
            has_wifi: form_bool(&required(self.has_wifi, "has_wifi")?),
            has_sockets: form_bool(&required(self.has_sockets, "has_sockets")?),
            can_take_calls: form_bool(&required(self.can_take_calls, "can_take_calls")?),
            coffee_price: self.coffee_price,
        })
    }
}

fn required(field: Option<String>, name: &str) -> ApiResult<String> {
    field.ok_or_else(|| ApiError::BadRequest(format!("missing required field: {name}")))
}

/// POST /add — create a cafe from form fields.
pub async fn add(
    State(state): State<AppState>,
    Form(form): Form<AddCafeForm>,
) -> ApiResult<Json<Value>> {
    let cafe = form.into_new_cafe()?;
    let id = state.db.create_cafe(&cafe).await?;
    tracing::info!("Added cafe: id={}, name={}", id, cafe.name);
    Ok(success("Successfully added the new cafe."))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePriceParams {
    new_price: Option<String>,
}

/// GET /update-price/:id?new_price=...
pub async fn update_price(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<UpdatePriceParams>,
) -> ApiResult<Json<Value>> {
    let new_price = params
        .new_price
        .ok_or_else(|| ApiError::NotFound(CAFE_NOT_FOUND.to_string()))?;

    state.db.update_coffee_price(id, &new_price).await?;
    tracing::info!("Updated price: id={}, new_price={}", id, new_price);
    Ok(success("Successfully updated the price."))
}

#[derive(Debug, Deserialize)]
pub struct ReportClosedParams {
    #[serde(rename = "api-key")]
    api_key: Option<String>,
}

/// DELETE /report-closed/:id?api-key=...
pub async fn report_closed(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<ReportClosedParams>,
) -> ApiResult<Json<Value>> {
    if params.api_key.as_deref() != Some(state.api_key.as_str()) {
        // Don't admit that user-submitted ids exist to callers without the key.
        if id > SEEDED_MAX_ID {
            return Err(ApiError::NotFound(CAFE_NOT_FOUND.to_string()));
        }
        return Err(ApiError::Forbidden(WRONG_API_KEY.to_string()));
    }

    state.db.delete_cafe(id).await?;
    tracing::info!("Deleted cafe: id={}", id);
    Ok(success("Successfully deleted the coffee shop."))
}
