//! Routes for the Gamification bounded context.

use axum::extract::{Path, State};
use axum::{
    Json, Router,
    routing::{get, post},
};
use chrono::NaiveDate;
use fittrack_core::kinds::RewardKind;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use fittrack_gamification::application::command_handlers::{self, RecordOutcome};
use fittrack_gamification::application::query_handlers::{
    self, GamificationStatusView, RewardEventView,
};
use fittrack_gamification::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /{user_id}/events.
#[derive(Debug, Deserialize)]
pub struct RecordRewardRequest {
    /// Kind of activity being rewarded.
    pub kind: RewardKind,
    /// Identifier of the occurrence, e.g. the saved progress record id.
    pub source_id: String,
    /// Date the caller associates with the activity. Accepted but not used
    /// for dating the reward.
    #[serde(default)]
    pub activity_date: Option<NaiveDate>,
}

/// Response body returned after a reward command is handled.
#[derive(Debug, Serialize)]
pub struct RecordRewardResponse {
    /// Whether this request granted the reward.
    pub recorded: bool,
    /// The stored event, when one was created.
    pub event_id: Option<Uuid>,
    /// Status after the request.
    pub status: GamificationStatusView,
}

/// Response body for GET /{user_id}/daily-challenge.
#[derive(Debug, Serialize)]
pub struct DailyChallengeResponse {
    /// Whether today's challenge has been rewarded.
    pub completed_today: bool,
}

async fn into_response(
    user_id: Uuid,
    outcome: RecordOutcome,
    state: &AppState,
) -> Result<RecordRewardResponse, ApiError> {
    match outcome {
        RecordOutcome::Recorded { event, profile } => Ok(RecordRewardResponse {
            recorded: true,
            event_id: Some(event.id),
            status: GamificationStatusView::from(profile),
        }),
        RecordOutcome::AlreadyRecorded => {
            let status =
                query_handlers::get_gamification_status(user_id, &*state.reward_repository)
                    .await?;
            Ok(RecordRewardResponse {
                recorded: false,
                event_id: None,
                status,
            })
        }
    }
}

/// POST /{user_id}/events
#[instrument(
    skip(state, request),
    fields(kind = %request.kind, source_id = %request.source_id)
)]
async fn record_reward(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<RecordRewardRequest>,
) -> Result<Json<RecordRewardResponse>, ApiError> {
    let command = commands::RecordReward {
        correlation_id: Uuid::new_v4(),
        user_id,
        kind: request.kind,
        source_id: request.source_id,
        activity_date: request.activity_date,
    };

    info!(correlation_id = %command.correlation_id, "handling record_reward command");

    let outcome = command_handlers::handle_record_reward(
        &command,
        state.clock.as_ref(),
        &*state.reward_repository,
    )
    .await?;

    Ok(Json(into_response(user_id, outcome, &state).await?))
}

/// POST /{user_id}/daily-challenge
#[instrument(skip(state))]
async fn complete_daily_challenge(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<RecordRewardResponse>, ApiError> {
    let command = commands::CompleteDailyChallenge {
        correlation_id: Uuid::new_v4(),
        user_id,
    };

    info!(correlation_id = %command.correlation_id, "handling complete_daily_challenge command");

    let outcome = command_handlers::handle_complete_daily_challenge(
        &command,
        state.clock.as_ref(),
        &*state.reward_repository,
    )
    .await?;

    Ok(Json(into_response(user_id, outcome, &state).await?))
}

/// GET /{user_id}/daily-challenge
#[instrument(skip(state))]
async fn daily_challenge_status(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<DailyChallengeResponse>, ApiError> {
    let completed_today = query_handlers::is_daily_challenge_completed_today(
        user_id,
        state.clock.as_ref(),
        &*state.reward_repository,
    )
    .await?;

    Ok(Json(DailyChallengeResponse { completed_today }))
}

/// GET /{user_id}/status
#[instrument(skip(state))]
async fn status(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<GamificationStatusView>, ApiError> {
    let view =
        query_handlers::get_gamification_status(user_id, &*state.reward_repository).await?;
    Ok(Json(view))
}

/// GET /{user_id}/events
#[instrument(skip(state))]
async fn list_events(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<RewardEventView>>, ApiError> {
    let views = query_handlers::list_reward_events(user_id, &*state.reward_repository).await?;
    Ok(Json(views))
}

/// Returns the router for the gamification context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}/events", post(record_reward).get(list_events))
        .route(
            "/{user_id}/daily-challenge",
            post(complete_daily_challenge).get(daily_challenge_status),
        )
        .route("/{user_id}/status", get(status))
}
