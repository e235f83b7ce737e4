//! Record Routes
//!
//! CRUD handlers shared by every collection. Each route is instantiated
//! per record type in `build_router`.
//!
//! - GET /api/v1/{collection}?q=&status= - Search and filter
//! - POST /api/v1/{collection} - Create from a form
//! - GET /api/v1/{collection}/:id - Fetch one
//! - PUT /api/v1/{collection}/:id - Update from a form
//! - DELETE /api/v1/{collection}/:id - Delete

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::api::dto::{ListParams, ListResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::entity::{Entity, RecordForm};

pub(crate) fn not_found<E: Entity>(id: &str) -> ApiError {
    ApiError::NotFound(format!("{} with id {} not found", E::LABEL, id))
}

pub(crate) fn find<E: Entity>(state: &AppState, id: &str) -> ApiResult<E> {
    state.list::<E>().get(id).ok_or_else(|| not_found::<E>(id))
}

pub(crate) fn create_record<F: RecordForm>(state: &AppState, form: F) -> ApiResult<F::Record> {
    let record = form.compose(None)?;
    Ok(state.list::<F::Record>().create(record)?)
}

/// The stored record keeps its id; the form replaces the editable fields
pub(crate) fn update_record<F: RecordForm>(
    state: &AppState,
    id: &str,
    form: F,
) -> ApiResult<F::Record> {
    let list = state.list::<F::Record>();
    let existing = list.get(id).ok_or_else(|| not_found::<F::Record>(id))?;
    let record = form.compose(Some(&existing))?;
    Ok(list.update(record)?)
}

/// GET /api/v1/{collection}
pub async fn list<E: Entity>(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Json<ListResponse<E>> {
    let items = state
        .list::<E>()
        .query(params.q.as_deref(), params.status.as_deref());
    Json(ListResponse::new(items))
}

/// GET /api/v1/{collection}/:id
pub async fn get_one<E: Entity>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<E>> {
    find::<E>(&state, &id).map(Json)
}

/// POST /api/v1/{collection}
pub async fn create<F>(
    State(state): State<Arc<AppState>>,
    Json(form): Json<F>,
) -> ApiResult<(StatusCode, Json<F::Record>)>
where
    F: RecordForm + DeserializeOwned + Send + 'static,
{
    let record = create_record(&state, form)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/v1/{collection}/:id
pub async fn update<F>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(form): Json<F>,
) -> ApiResult<Json<F::Record>>
where
    F: RecordForm + DeserializeOwned + Send + 'static,
{
    update_record(&state, &id, form).map(Json)
}

/// DELETE /api/v1/{collection}/:id
pub async fn remove<E: Entity>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.list::<E>().delete(&id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found::<E>(&id))
    }
}
