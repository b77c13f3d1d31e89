//! Dashboard handler

use axum::{
    extract::{Query, State},
    Json,
};
use hb_auth::ProjectVisibility;
use hb_db::{OrderRepository, TimeEntryRepository};
use hb_models::Project;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    /// Include inactive projects
    #[serde(default)]
    pub in_active: bool,
    #[serde(default)]
    pub with_hours: bool,
}

#[derive(Debug, Serialize)]
pub struct DashboardProject {
    #[serde(flatten)]
    pub project: Project,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_ordered: Option<f64>,
    /// Logged hours, rebates included
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_used: Option<f64>,
}

/// GET /api/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<DashboardParams>,
) -> ApiResult<Json<Vec<DashboardProject>>> {
    let projects = ProjectVisibility::new(state.store.as_ref())
        .get_projects(&user.user, params.in_active)
        .await?;

    let mut rows = Vec::with_capacity(projects.len());
    for project in projects {
        let (hours_ordered, hours_used) = if params.with_hours {
            let ordered: f64 = state
                .store
                .orders_for_project(project.id)
                .await?
                .iter()
                .map(|o| o.hours)
                .sum();
            let used: f64 = state
                .store
                .time_entries_for_project(project.id)
                .await?
                .iter()
                .map(|e| e.hours)
                .sum();
            (Some(ordered), Some(used))
        } else {
            (None, None)
        };

        rows.push(DashboardProject {
            project,
            hours_ordered,
            hours_used,
        });
    }

    Ok(Json(rows))
}
