//! Time entry handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use hb_core::traits::Id;
use hb_db::TimeEntryRepository;
use hb_models::{Entity, Permission, TimeEntry};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser};

/// POST /api/time_entries/:id/rebate
///
/// Books the negated hours of an entry on the same work item, dated today.
pub async fn rebate_time_entry(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<(StatusCode, Json<TimeEntry>)> {
    if !user.allowed(Permission::EditTimeEntry) {
        return Err(ApiError::forbidden("You are not allowed to edit time entries"));
    }

    let entry = state
        .store
        .find_time_entry(id)
        .await?
        .ok_or_else(|| ApiError::not_found(TimeEntry::TYPE_NAME, id))?;

    let rebate = state
        .store
        .create_time_entry(entry.rebate(user.id(), Local::now().date_naive()))
        .await?;
    tracing::info!(entry_id = id, rebate_id = rebate.id, hours = rebate.hours, "Time entry rebated");

    Ok((StatusCode::CREATED, Json(rebate)))
}
