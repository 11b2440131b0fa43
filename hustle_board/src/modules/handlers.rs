use crate::modules::models::{
    request::{FetchParameters, ValidatedQuery},
    response::HustleResponse,
};
use axum::{extract::Extension, http::StatusCode, Json};
use hustle_board_libs::{LeaderboardRefresher, RefreshError, RefreshOutcome};
use std::sync::Arc;

type ApiResponse = (StatusCode, Json<HustleResponse>);

/// Merge the newest contest into the leaderboard.
pub async fn refresh_leaderboard(
    Extension(refresher): Extension<Arc<LeaderboardRefresher>>,
) -> ApiResponse {
    match refresher.refresh().await {
        Ok(RefreshOutcome::UpToDate { contest_id }) => (
            StatusCode::OK,
            Json(HustleResponse::message(format!(
                "Leaderboard is already up-to-date with contest {}",
                contest_id
            ))),
        ),
        Ok(RefreshOutcome::Updated(summary)) => (
            StatusCode::OK,
            Json(HustleResponse::with_data(
                "Leaderboard updated successfully",
                &summary,
            )),
        ),
        Err(RefreshError::NoContest) => {
            tracing::warn!("no contest id found in the contest list");
            (
                StatusCode::BAD_REQUEST,
                Json(HustleResponse::message("Contest ID not found")),
            )
        }
        Err(e) if e.is_conflict() => {
            tracing::warn!("refresh lost the race: {}", e);
            (
                StatusCode::CONFLICT,
                Json(HustleResponse::error(
                    "Leaderboard was updated by another request",
                    e,
                )),
            )
        }
        Err(e) => {
            tracing::error!("refresh failed cause: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HustleResponse::error("Internal server error", e)),
            )
        }
    }
}

pub async fn fetch_hustle(
    ValidatedQuery(params): ValidatedQuery<FetchParameters>,
    Extension(refresher): Extension<Arc<LeaderboardRefresher>>,
) -> ApiResponse {
    let limit = params.limit.map(|limit| limit as usize);
    match refresher.fetch(limit).await {
        Ok(data) => (
            StatusCode::OK,
            Json(HustleResponse::with_data(
                "Hustle data fetched successfully",
                &data,
            )),
        ),
        Err(e) => {
            tracing::error!("fetch failed cause: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HustleResponse::error("Internal server error", e)),
            )
        }
    }
}

pub async fn liveness() -> StatusCode {
    StatusCode::OK
}
