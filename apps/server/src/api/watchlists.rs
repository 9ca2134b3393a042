use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};
use flipwatch_core::watchlists::{NewWatchlistItem, Watchlist, WatchlistError, WatchlistItem};

#[derive(Deserialize)]
struct NameBody {
    name: String,
}

#[derive(Deserialize)]
struct ActiveBody {
    id: String,
}

#[derive(Deserialize)]
struct NotesBody {
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoveItemBody {
    from_id: String,
    to_id: String,
    item_id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportResult {
    imported_ids: Vec<String>,
}

fn fetch(state: &AppState, id: &str) -> ApiResult<Watchlist> {
    state
        .watchlist_service
        .get_watchlist(id)?
        .ok_or_else(|| WatchlistError::WatchlistNotFound(id.to_string()).into())
}

async fn list_watchlists(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Watchlist>>> {
    Ok(Json(state.watchlist_service.get_all_watchlists()?))
}

async fn create_watchlist(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NameBody>,
) -> ApiResult<(StatusCode, Json<Watchlist>)> {
    let id = state.watchlist_service.create_watchlist(&body.name)?;
    Ok((StatusCode::CREATED, Json(fetch(&state, &id)?)))
}

async fn get_watchlist(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Watchlist>> {
    Ok(Json(fetch(&state, &id)?))
}

async fn delete_watchlist(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state.watchlist_service.delete_watchlist(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn rename_watchlist(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<NameBody>,
) -> ApiResult<Json<Watchlist>> {
    state.watchlist_service.rename_watchlist(&id, &body.name)?;
    Ok(Json(fetch(&state, &id)?))
}

async fn clear_watchlist(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Watchlist>> {
    state.watchlist_service.clear_watchlist(&id)?;
    Ok(Json(fetch(&state, &id)?))
}

async fn get_default_watchlist(State(state): State<Arc<AppState>>) -> ApiResult<Json<Watchlist>> {
    Ok(Json(state.watchlist_service.get_default_watchlist()?))
}

async fn get_active_watchlist(State(state): State<Arc<AppState>>) -> ApiResult<Json<Watchlist>> {
    Ok(Json(state.watchlist_service.get_active_watchlist()?))
}

async fn set_active_watchlist(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ActiveBody>,
) -> ApiResult<Json<Watchlist>> {
    state.watchlist_service.set_active_watchlist(&body.id)?;
    Ok(Json(state.watchlist_service.get_active_watchlist()?))
}

async fn add_item(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(item): Json<NewWatchlistItem>,
) -> ApiResult<(StatusCode, Json<WatchlistItem>)> {
    let added = state.watchlist_service.add_item_to_watchlist(&id, item)?;
    Ok((StatusCode::CREATED, Json(added)))
}

async fn remove_item(
    Path((id, item_id)): Path<(String, i64)>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    state
        .watchlist_service
        .remove_item_from_watchlist(&id, item_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_item_notes(
    Path((id, item_id)): Path<(String, i64)>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<NotesBody>,
) -> ApiResult<Json<WatchlistItem>> {
    state
        .watchlist_service
        .update_item_notes(&id, item_id, body.notes.as_deref())?;
    let watchlist = fetch(&state, &id)?;
    let item = watchlist
        .find_item(item_id)
        .cloned()
        .ok_or(ApiError::NotFound)?;
    Ok(Json(item))
}

async fn move_item(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MoveItemBody>,
) -> ApiResult<StatusCode> {
    state
        .watchlist_service
        .move_item_between_watchlists(&body.from_id, &body.to_id, body.item_id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_item_watchlists(
    Path(item_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Watchlist>>> {
    Ok(Json(state.watchlist_service.get_item_watchlists(item_id)?))
}

async fn export_watchlist(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Watchlist>> {
    state
        .watchlist_service
        .export_watchlist(&id)?
        .map(Json)
        .ok_or_else(|| WatchlistError::WatchlistNotFound(id).into())
}

async fn export_watchlists(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let json = state.watchlist_service.export_all_watchlists_json()?;
    Ok(([(header::CONTENT_TYPE, "application/json")], json))
}

async fn import_watchlists(
    State(state): State<Arc<AppState>>,
    body: String,
) -> ApiResult<Json<ImportResult>> {
    let imported_ids = state.watchlist_service.import_watchlists_json(&body)?;
    Ok(Json(ImportResult { imported_ids }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/watchlists", get(list_watchlists).post(create_watchlist))
        .route("/watchlists/default", get(get_default_watchlist))
        .route(
            "/watchlists/active",
            get(get_active_watchlist).put(set_active_watchlist),
        )
        .route("/watchlists/export", get(export_watchlists))
        .route("/watchlists/import", post(import_watchlists))
        .route("/watchlists/move-item", post(move_item))
        .route(
            "/watchlists/{id}",
            get(get_watchlist).delete(delete_watchlist),
        )
        .route("/watchlists/{id}/name", put(rename_watchlist))
        .route("/watchlists/{id}/clear", post(clear_watchlist))
        .route("/watchlists/{id}/export", get(export_watchlist))
        .route("/watchlists/{id}/items", post(add_item))
        .route("/watchlists/{id}/items/{item_id}", delete(remove_item))
        .route("/watchlists/{id}/items/{item_id}/notes", put(update_item_notes))
        .route("/items/{item_id}/watchlists", get(get_item_watchlists))
}
