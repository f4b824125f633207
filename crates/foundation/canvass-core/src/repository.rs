//! Repository traits, one per entity.
//!
//! Implementations own persistence; entities stay plain structs. Ids and
//! timestamps are assigned by the entity constructors before `insert`, so every
//! backend stores exactly what it is given.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::model::{Response, SocialConnection, Survey, SurveyPatch, User};
use crate::page::PageRequest;
use crate::Result;

/// Selection criteria for surveys. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveyFilter {
    pub creator_id: Option<String>,
    /// Case-insensitive substring match on the title.
    pub search: Option<String>,
    pub active: Option<bool>,
}

impl SurveyFilter {
    pub fn owned_by(creator_id: &str) -> Self {
        Self {
            creator_id: Some(creator_id.to_string()),
            ..Self::default()
        }
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    pub fn matches(&self, survey: &Survey) -> bool {
        if let Some(creator) = &self.creator_id {
            if &survey.creator_id != creator {
                return false;
            }
        }
        if let Some(active) = self.active {
            if survey.is_active != active {
                return false;
            }
        }
        if let Some(needle) = &self.search {
            if !survey.title.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseFilter {
    pub survey_id: Option<String>,
}

impl ResponseFilter {
    pub fn for_survey(survey_id: &str) -> Self {
        Self {
            survey_id: Some(survey_id.to_string()),
        }
    }

    pub fn matches(&self, response: &Response) -> bool {
        self.survey_id
            .as_ref()
            .map_or(true, |id| &response.survey_id == id)
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Error::Conflict` when the email is already registered.
    async fn insert(&self, user: User) -> Result<User>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait SocialConnectionRepository: Send + Sync {
    async fn insert(&self, connection: SocialConnection) -> Result<SocialConnection>;

    async fn find_by_provider(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<SocialConnection>>;
}

#[async_trait]
pub trait SurveyRepository: Send + Sync {
    async fn insert(&self, survey: Survey) -> Result<Survey>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Survey>>;

    /// One page ordered by `updated_at` DESC, then id DESC, plus the total
    /// number of matches.
    async fn list(&self, filter: &SurveyFilter, page: &PageRequest) -> Result<(Vec<Survey>, u64)>;

    async fn count(&self, filter: &SurveyFilter) -> Result<u64>;

    async fn ids(&self, filter: &SurveyFilter) -> Result<Vec<String>>;

    /// Newest first by `created_at`.
    async fn recent(&self, filter: &SurveyFilter, limit: u64) -> Result<Vec<Survey>>;

    /// Apply a patch. When `creator_id` is given the survey must also belong to
    /// that user. Returns `None` when nothing matched.
    async fn update(
        &self,
        id: &str,
        creator_id: Option<&str>,
        patch: SurveyPatch,
    ) -> Result<Option<Survey>>;

    /// Same scoping rules as `update`. Returns whether a survey was removed.
    async fn delete(&self, id: &str, creator_id: Option<&str>) -> Result<bool>;
}

#[async_trait]
pub trait ResponseRepository: Send + Sync {
    async fn insert(&self, response: Response) -> Result<Response>;

    /// One page ordered by `created_at` DESC, then id DESC, plus the total.
    async fn list(
        &self,
        filter: &ResponseFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Response>, u64)>;

    /// Count responses belonging to the given surveys, or all responses for `None`.
    async fn count_for_surveys(&self, survey_ids: Option<&[String]>) -> Result<u64>;

    /// Response count per survey id. Surveys without responses may be absent.
    async fn count_by_survey(&self, survey_ids: &[String]) -> Result<HashMap<String, u64>>;

    async fn delete(&self, id: &str) -> Result<bool>;

    /// Remove every response of a survey; returns how many were removed.
    async fn delete_by_survey(&self, survey_id: &str) -> Result<u64>;
}

/// The full set of repository handles a service layer needs.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub connections: Arc<dyn SocialConnectionRepository>,
    pub surveys: Arc<dyn SurveyRepository>,
    pub responses: Arc<dyn ResponseRepository>,
}

impl Repositories {
    /// Build from one store that implements every trait.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository
            + SocialConnectionRepository
            + SurveyRepository
            + ResponseRepository
            + 'static,
    {
        Self {
            users: store.clone(),
            connections: store.clone(),
            surveys: store.clone(),
            responses: store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewSurvey;
    use serde_json::Map;

    fn survey(title: &str) -> Survey {
        Survey::new(
            NewSurvey {
                title: title.into(),
                description: None,
                questions: Vec::new(),
                json: Map::new(),
                is_active: true,
            },
            "alice",
        )
    }

    #[test]
    fn search_is_case_insensitive() {
        let filter = SurveyFilter::default().with_search(Some("  CUSTOMER ".into()));
        assert_eq!(filter.search.as_deref(), Some("CUSTOMER"));
        assert!(filter.matches(&survey("Customer satisfaction")));
        assert!(!filter.matches(&survey("Employee pulse")));
    }

    #[test]
    fn blank_search_is_dropped() {
        let filter = SurveyFilter::owned_by("alice").with_search(Some("   ".into()));
        assert!(filter.search.is_none());
        assert!(filter.matches(&survey("anything")));
        assert!(!SurveyFilter::owned_by("bob").matches(&survey("anything")));
    }

    #[test]
    fn active_flag_filters() {
        let mut s = survey("draft");
        s.is_active = false;
        let filter = SurveyFilter {
            active: Some(true),
            ..SurveyFilter::default()
        };
        assert!(!filter.matches(&s));
    }
}
