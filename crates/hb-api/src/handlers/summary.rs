//! Project summary handlers

use axum::{
    extract::{Path, State},
    response::Html,
    Json,
};
use chrono::Local;
use hb_contracts::{EmailProjectSummaryInput, EmailProjectSummaryRequest, ViewProjectSummaryRequest};
use hb_core::types::DateRange;
use hb_db::{ProjectRepository, UserRepository};
use hb_models::{Entity, Permission, Project};
use hb_notifications::EmailAddress;
use hb_reports::{ProjectSummary, SummaryGenerator};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser};

fn require_reports(user: &AuthenticatedUser) -> ApiResult<()> {
    if user.allowed(Permission::RunReports) {
        Ok(())
    } else {
        Err(ApiError::forbidden("You are not allowed to run reports"))
    }
}

async fn summarize(state: &AppState, project: &Project, range: DateRange) -> ApiResult<ProjectSummary> {
    Ok(SummaryGenerator::new(state.store.as_ref())
        .with_policy(state.config.chart_unmatched)
        .generate(project, range)
        .await?)
}

async fn render_view(
    state: AppState,
    user: AuthenticatedUser,
    request: ViewProjectSummaryRequest,
) -> ApiResult<Html<String>> {
    require_reports(&user)?;

    let project = state
        .store
        .find_project(request.id)
        .await?
        .ok_or_else(|| ApiError::not_found(Project::TYPE_NAME, request.id))?;

    let summary = summarize(&state, &project, request.range(Local::now().date_naive())).await?;
    Ok(Html(state.config.renderer().render_html(&summary)))
}

/// GET /api/projects/:id/summary
pub async fn view_summary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Html<String>> {
    let request = ViewProjectSummaryRequest::parse(&id, None, None)?;
    render_view(state, user, request).await
}

/// GET /api/projects/:id/summary/:start/:end
pub async fn view_summary_between(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, start, end)): Path<(String, String, String)>,
) -> ApiResult<Html<String>> {
    let request = ViewProjectSummaryRequest::parse(&id, Some(&start), Some(&end))?;
    render_view(state, user, request).await
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySent {
    pub message_id: String,
    pub recipients: Vec<String>,
}

/// POST /api/projects/summary
///
/// Mails the summary to the project's customer and to every listed address.
pub async fn email_summary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(input): Json<EmailProjectSummaryInput>,
) -> ApiResult<Json<SummarySent>> {
    require_reports(&user)?;

    let request = EmailProjectSummaryRequest::try_from(input)?;
    tracing::debug!(?request, "Email project summary");

    let project = state
        .store
        .find_project(request.id)
        .await?
        .ok_or_else(|| ApiError::not_found(Project::TYPE_NAME, request.id))?;

    let summary = summarize(&state, &project, request.range()).await?;
    tracing::debug!(
        project_id = project.id,
        total = summary.total,
        rebated = summary.rebated,
        "Summary generated"
    );

    let mut recipients = Vec::new();
    if let Some(customer) = state.store.find_user(project.customer_id).await? {
        recipients.push(EmailAddress::new(customer.email.clone()).with_name(customer.full_name()));
    }
    for address in request.email {
        if !recipients.iter().any(|r| r.email.eq_ignore_ascii_case(&address)) {
            recipients.push(EmailAddress::new(address));
        }
    }

    let message = state.config.renderer().render(&summary, recipients);
    let message_id = state.mailer.send(&message).await?;
    tracing::info!(
        project_id = project.id,
        message_id = %message_id,
        recipients = %message.recipients(),
        "Project summary mailed"
    );

    Ok(Json(SummarySent {
        message_id,
        recipients: message.to.iter().map(|r| r.email.clone()).collect(),
    }))
}
