use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::{error::ApiResult, main_lib::AppState};
use flipwatch_core::share::{
    extract_share_token, is_valid_share_token, share_expiry_hint, share_url, CancellationToken,
    ShareError, WatchlistShare,
};
use flipwatch_core::watchlists::{Watchlist, WatchlistError};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateShareBody {
    watchlist_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareView {
    #[serde(flatten)]
    share: WatchlistShare,
    url: String,
    expiry_hint: String,
}

#[derive(Deserialize)]
struct OpenShareBody {
    link: String,
}

/// Cancels the share call once the deadline passes or the request is dropped.
struct ShareDeadline {
    token: CancellationToken,
    timer: JoinHandle<()>,
}

impl ShareDeadline {
    fn start(timeout: Duration) -> Self {
        let token = CancellationToken::new();
        let expired = token.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            tracing::warn!("Share call exceeded {:?}, cancelling", timeout);
            expired.cancel();
        });
        Self { token, timer }
    }
}

impl Drop for ShareDeadline {
    fn drop(&mut self) {
        self.timer.abort();
        self.token.cancel();
    }
}

fn checked_token(token: String) -> ApiResult<String> {
    if is_valid_share_token(&token) {
        Ok(token)
    } else {
        Err(ShareError::InvalidToken(token).into())
    }
}

fn view(state: &AppState, share: WatchlistShare) -> ShareView {
    ShareView {
        url: share_url(&state.public_url, &share.token),
        expiry_hint: share_expiry_hint(),
        share,
    }
}

async fn fetch_share(state: &AppState, token: &str) -> ApiResult<WatchlistShare> {
    let deadline = ShareDeadline::start(state.share_timeout);
    Ok(state
        .share_service
        .retrieve_share(token, &deadline.token)
        .await?)
}

async fn create_share(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateShareBody>,
) -> ApiResult<(StatusCode, Json<ShareView>)> {
    let watchlist = state
        .watchlist_service
        .get_watchlist(&body.watchlist_id)?
        .ok_or(WatchlistError::WatchlistNotFound(body.watchlist_id))?;

    let deadline = ShareDeadline::start(state.share_timeout);
    let share = state
        .share_service
        .create_share(&watchlist, &deadline.token)
        .await?;
    tracing::info!("Shared watchlist {} as {}", watchlist.id, share.token);
    Ok((StatusCode::CREATED, Json(view(&state, share))))
}

async fn get_share(
    Path(token): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ShareView>> {
    let token = checked_token(token)?;
    let share = fetch_share(&state, &token).await?;
    Ok(Json(view(&state, share)))
}

/// Opens a pasted share link or bare token.
async fn open_share(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OpenShareBody>,
) -> ApiResult<Json<ShareView>> {
    let token = extract_share_token(&body.link)
        .ok_or_else(|| ShareError::InvalidToken(body.link.trim().to_string()))?;
    let share = fetch_share(&state, &token).await?;
    Ok(Json(view(&state, share)))
}

async fn import_share(
    Path(token): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<(StatusCode, Json<Watchlist>)> {
    let token = checked_token(token)?;
    let share = fetch_share(&state, &token).await?;
    let id = state.watchlist_service.import_watchlist(&share.watchlist)?;
    let imported = state
        .watchlist_service
        .get_watchlist(&id)?
        .ok_or(WatchlistError::WatchlistNotFound(id))?;
    Ok((StatusCode::CREATED, Json(imported)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/shares", post(create_share))
        .route("/shares/open", post(open_share))
        .route("/shares/{token}", get(get_share))
        .route("/shares/{token}/import", post(import_share))
}
