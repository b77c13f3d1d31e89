//! Project handlers

use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use hb_auth::ProjectVisibility;
use hb_contracts::parse_date;
use hb_core::error::ValidationErrors;
use hb_core::traits::Id;
use hb_core::types::DateRange;
use hb_db::{ProjectRepository, UserRepository, WorkItemRepository};
use hb_models::User;
use hb_reports::{ChartSeries, HourBucketer, ProjectLog};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser};

/// Where users are sent when they may not open a project
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPage {
    pub project_id: Id,
    pub project_name: String,
    pub title: String,
}

/// GET /api/projects/:id
///
/// Redirects to the dashboard when the project is missing or not accessible.
pub async fn show_project(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Response> {
    let Some(project) = state.store.find_project(id).await? else {
        tracing::debug!(project_id = id, "Project not found, redirecting");
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    };

    let allowed = ProjectVisibility::new(state.store.as_ref())
        .can_access_project(&user.user, id)
        .await?;
    if !allowed {
        tracing::debug!(project_id = id, user_id = user.id(), "Project access denied");
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    }

    Ok(Json(ProjectPage {
        project_id: project.id,
        project_name: project.name,
        title: state.config.app_title.clone(),
    })
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub project_id: Id,
    pub start: String,
    pub end: String,
}

/// POST /api/projects/chart
pub async fn chart(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(query): Json<ChartQuery>,
) -> ApiResult<Json<ChartSeries>> {
    let mut errors = ValidationErrors::new();
    let start = parse_date(&query.start);
    if start.is_none() {
        errors.add("start", "is not a valid date");
    }
    let end = parse_date(&query.end);
    if end.is_none() {
        errors.add("end", "is not a valid date");
    }
    let (Some(start), Some(end)) = (start, end) else {
        return Err(errors.into());
    };

    let Some(project) = state.store.find_project(query.project_id).await? else {
        return Ok(Json(ChartSeries::default()));
    };

    let chart = HourBucketer::new(state.store.as_ref())
        .with_policy(state.config.chart_unmatched)
        .chart_hours(&project, DateRange::new(start, end))
        .await?;

    Ok(Json(chart.series()))
}

/// GET /api/projects/:id/log
pub async fn project_log(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Response> {
    let project = state
        .store
        .find_project(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("This project does not exists".into()))?;

    let csv = ProjectLog::new(state.store.as_ref()).csv(&project).await?;
    let disposition = format!("attachment; filename=\"project-{}-log.csv\"", project.id);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

/// GET /api/projects/:id/non_project_users
///
/// Users that have no tie to the project yet: not attached, not owning one of its work items,
/// and neither its manager nor its customer.
pub async fn non_project_users(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<Json<Vec<User>>> {
    let Some(project) = state.store.find_project(id).await? else {
        return Ok(Json(Vec::new()));
    };

    let mut excluded: HashSet<Id> = state
        .store
        .project_user_ids(project.id)
        .await?
        .into_iter()
        .collect();
    excluded.extend(
        state
            .store
            .work_items_for_project(project.id)
            .await?
            .iter()
            .map(|wi| wi.owner_id),
    );
    excluded.insert(project.project_manager_id);
    excluded.insert(project.customer_id);

    let users = state
        .store
        .all_users()
        .await?
        .into_iter()
        .filter(|u| !excluded.contains(&u.id))
        .collect();

    Ok(Json(users))
}
