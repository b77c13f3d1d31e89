//! Application state and axum extractors

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use hb_auth::CurrentUser;
use hb_core::config::AppConfig;
use hb_core::traits::Id;
use hb_core::types::UnmatchedEntries;
use hb_db::{Store, UserRepository};
use hb_notifications::{EmailAddress, EmailSender, SummaryMailRenderer};

use crate::error::ApiError;

/// Header carrying the id of the user authenticated upstream
pub const USER_ID_HEADER: &str = "x-user-id";

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub mailer: Arc<dyn EmailSender>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, mailer: Arc<dyn EmailSender>, config: ApiConfig) -> Self {
        Self {
            store,
            mailer,
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub app_title: String,
    pub base_url: String,
    pub from_address: EmailAddress,
    pub chart_unmatched: UnmatchedEntries,
}

impl ApiConfig {
    pub fn renderer(&self) -> SummaryMailRenderer {
        SummaryMailRenderer::new(self.base_url.clone(), self.from_address.clone())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for ApiConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            app_title: config.instance.app_title.clone(),
            base_url: config.instance.base_url.trim_end_matches('/').to_string(),
            from_address: EmailAddress::new(config.email.from_address.clone())
                .with_name(config.email.from_name.clone()),
            chart_unmatched: config.instance.chart_unmatched,
        }
    }
}

/// The user named by the `X-User-Id` header, loaded from the store
pub struct AuthenticatedUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<Id>().ok())
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

        let user = app_state
            .store
            .find_user(id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Unknown user"))?;

        Ok(AuthenticatedUser(CurrentUser::new(user)))
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = CurrentUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
