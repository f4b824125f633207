//! Application state shared by every handler.

use std::sync::Arc;

use axum::http::HeaderValue;
use canvass_ai::SummaryGenerator;
use canvass_config::Config;
use canvass_core::{Error, Repositories, Result};

use crate::auth::{AuthService, TokenCodec};
use crate::services::{ResponseService, SummaryService, SurveyService};

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    pub name: String,
    pub secure: bool,
    pub max_age_secs: u64,
}

pub struct AppState {
    pub surveys: SurveyService,
    pub responses: ResponseService,
    pub summaries: SummaryService,
    pub auth: AuthService,
    pub session: SessionCookie,
    pub frontend_origin: HeaderValue,
    pub api_prefix: String,
}

impl AppState {
    pub fn new(
        config: &Config,
        repos: Repositories,
        generator: SummaryGenerator,
    ) -> Result<Arc<Self>> {
        let frontend_origin = HeaderValue::from_str(&config.server.frontend_url).map_err(|e| {
            Error::Internal(format!(
                "invalid frontend_url {}: {e}",
                config.server.frontend_url
            ))
        })?;

        let surveys = SurveyService::new(repos.surveys.clone(), repos.responses.clone());
        let responses = ResponseService::new(repos.surveys.clone(), repos.responses.clone());
        let summaries = SummaryService::new(
            surveys.clone(),
            responses.clone(),
            generator,
            config.ai.max_responses,
        );
        let tokens = TokenCodec::new(&config.auth.jwt_secret, config.auth.token_ttl_secs);
        let auth = AuthService::new(repos.users.clone(), repos.connections.clone(), tokens);

        Ok(Arc::new(Self {
            surveys,
            responses,
            summaries,
            auth,
            session: SessionCookie {
                name: config.auth.cookie_name.clone(),
                secure: config.auth.secure_cookie,
                max_age_secs: config.auth.token_ttl_secs,
            },
            frontend_origin,
            api_prefix: config.api_prefix().to_string(),
        }))
    }
}
