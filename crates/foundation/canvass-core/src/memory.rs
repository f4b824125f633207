//! In-process store implementing every repository trait.
//!
//! Backs the `memory` database backend and the test suites. Each entity lives
//! in its own `RwLock<HashMap>`; no lock is held across an await point of
//! another lock.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::model::{Response, SocialConnection, Survey, SurveyPatch, User};
use crate::page::PageRequest;
use crate::repository::{
    Repositories, ResponseFilter, ResponseRepository, SocialConnectionRepository, SurveyFilter,
    SurveyRepository, UserRepository,
};
use crate::{Error, Result};

#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<String, User>>,
    connections: RwLock<HashMap<String, SocialConnection>>,
    surveys: RwLock<HashMap<String, Survey>>,
    responses: RwLock<HashMap<String, Response>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository bundle backed by a fresh store.
    pub fn repositories() -> Repositories {
        Repositories::from_store(Arc::new(Self::new()))
    }
}

fn newest_updated(a: &Survey, b: &Survey) -> Ordering {
    b.updated_at.cmp(&a.updated_at).then_with(|| b.id.cmp(&a.id))
}

fn newest_created(a: &Survey, b: &Survey) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
}

fn owned(survey: &Survey, creator_id: Option<&str>) -> bool {
    creator_id.map_or(true, |c| survey.creator_id == c)
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: User) -> Result<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(Error::Conflict(format!(
                "User with email {} already exists",
                user.email
            )));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[async_trait]
impl SocialConnectionRepository for InMemoryStore {
    async fn insert(&self, connection: SocialConnection) -> Result<SocialConnection> {
        self.connections
            .write()
            .await
            .insert(connection.id.clone(), connection.clone());
        Ok(connection)
    }

    async fn find_by_provider(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<SocialConnection>> {
        Ok(self
            .connections
            .read()
            .await
            .values()
            .find(|c| c.provider == provider && c.provider_id == provider_id)
            .cloned())
    }
}

#[async_trait]
impl SurveyRepository for InMemoryStore {
    async fn insert(&self, survey: Survey) -> Result<Survey> {
        self.surveys
            .write()
            .await
            .insert(survey.id.clone(), survey.clone());
        Ok(survey)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Survey>> {
        Ok(self.surveys.read().await.get(id).cloned())
    }

    async fn list(&self, filter: &SurveyFilter, page: &PageRequest) -> Result<(Vec<Survey>, u64)> {
        let surveys = self.surveys.read().await;
        let mut matched: Vec<Survey> = surveys
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        matched.sort_by(newest_updated);
        let total = matched.len() as u64;
        Ok((page.slice(matched), total))
    }

    async fn count(&self, filter: &SurveyFilter) -> Result<u64> {
        let surveys = self.surveys.read().await;
        Ok(surveys.values().filter(|s| filter.matches(s)).count() as u64)
    }

    async fn ids(&self, filter: &SurveyFilter) -> Result<Vec<String>> {
        let surveys = self.surveys.read().await;
        Ok(surveys
            .values()
            .filter(|s| filter.matches(s))
            .map(|s| s.id.clone())
            .collect())
    }

    async fn recent(&self, filter: &SurveyFilter, limit: u64) -> Result<Vec<Survey>> {
        let surveys = self.surveys.read().await;
        let mut matched: Vec<Survey> = surveys
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        matched.sort_by(newest_created);
        matched.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(matched)
    }

    async fn update(
        &self,
        id: &str,
        creator_id: Option<&str>,
        patch: SurveyPatch,
    ) -> Result<Option<Survey>> {
        let mut surveys = self.surveys.write().await;
        match surveys.get_mut(id).filter(|s| owned(s, creator_id)) {
            Some(survey) => {
                survey.apply(patch);
                Ok(Some(survey.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &str, creator_id: Option<&str>) -> Result<bool> {
        let mut surveys = self.surveys.write().await;
        if !surveys.get(id).is_some_and(|s| owned(s, creator_id)) {
            return Ok(false);
        }
        surveys.remove(id);
        Ok(true)
    }
}

#[async_trait]
impl ResponseRepository for InMemoryStore {
    async fn insert(&self, response: Response) -> Result<Response> {
        self.responses
            .write()
            .await
            .insert(response.id.clone(), response.clone());
        Ok(response)
    }

    async fn list(
        &self,
        filter: &ResponseFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Response>, u64)> {
        let responses = self.responses.read().await;
        let mut matched: Vec<Response> = responses
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        let total = matched.len() as u64;
        Ok((page.slice(matched), total))
    }

    async fn count_for_surveys(&self, survey_ids: Option<&[String]>) -> Result<u64> {
        let responses = self.responses.read().await;
        let count = match survey_ids {
            Some(ids) => responses.values().filter(|r| ids.contains(&r.survey_id)).count(),
            None => responses.len(),
        };
        Ok(count as u64)
    }

    async fn count_by_survey(&self, survey_ids: &[String]) -> Result<HashMap<String, u64>> {
        let responses = self.responses.read().await;
        Ok(responses
            .values()
            .filter(|r| survey_ids.contains(&r.survey_id))
            .fold(HashMap::new(), |mut acc, r| {
                *acc.entry(r.survey_id.clone()).or_default() += 1;
                acc
            }))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.responses.write().await.remove(id).is_some())
    }

    async fn delete_by_survey(&self, survey_id: &str) -> Result<u64> {
        let mut responses = self.responses.write().await;
        let before = responses.len();
        responses.retain(|_, r| r.survey_id != survey_id);
        let removed = (before - responses.len()) as u64;
        tracing::debug!(survey_id, removed, "removed survey responses");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewResponse, NewSurvey, NewUser};
    use chrono::Utc;
    use serde_json::Map;

    fn survey(title: &str, creator: &str) -> Survey {
        Survey::new(
            NewSurvey {
                title: title.into(),
                description: None,
                questions: Vec::new(),
                json: Map::new(),
                is_active: true,
            },
            creator,
        )
    }

    fn response(survey_id: &str) -> Response {
        Response::new(
            NewResponse {
                survey_id: survey_id.into(),
                answers: Map::new(),
                ai_summary: None,
            },
            None,
        )
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = InMemoryStore::new();
        let new = NewUser {
            email: "a@example.com".into(),
            name: None,
            picture: None,
            provider: "google".into(),
            provider_id: "g1".into(),
        };
        UserRepository::insert(&store, User::new(new.clone())).await.unwrap();
        let err = UserRepository::insert(&store, User::new(new)).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn pages_do_not_overlap() {
        let store = InMemoryStore::new();
        for i in 0..6 {
            SurveyRepository::insert(&store, survey(&format!("S{i}"), "alice")).await.unwrap();
        }
        let filter = SurveyFilter::owned_by("alice");
        let (first, total) =
            SurveyRepository::list(&store, &filter, &PageRequest::new(1, 3).unwrap())
                .await
                .unwrap();
        let (second, _) = SurveyRepository::list(&store, &filter, &PageRequest::new(2, 3).unwrap())
            .await
            .unwrap();
        let (third, _) = SurveyRepository::list(&store, &filter, &PageRequest::new(3, 3).unwrap())
            .await
            .unwrap();
        assert_eq!(total, 6);
        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 3);
        assert!(third.is_empty());
        assert!(first.iter().all(|a| second.iter().all(|b| a.id != b.id)));
    }

    #[tokio::test]
    async fn list_orders_by_last_update() {
        let store = InMemoryStore::new();
        let mut old = survey("old", "alice");
        old.updated_at = Utc::now() - chrono::Duration::hours(1);
        let old = SurveyRepository::insert(&store, old).await.unwrap();
        SurveyRepository::insert(&store, survey("new", "alice")).await.unwrap();

        SurveyRepository::update(&store, &old.id, None, SurveyPatch::ai_summary("fresh"))
            .await
            .unwrap();
        let all = SurveyFilter::default();
        let (page, _) = SurveyRepository::list(&store, &all, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page[0].id, old.id);
    }

    #[tokio::test]
    async fn scoped_update_and_delete() {
        let store = InMemoryStore::new();
        let s = SurveyRepository::insert(&store, survey("mine", "alice")).await.unwrap();
        let patch = SurveyPatch {
            title: Some("stolen".into()),
            ..SurveyPatch::default()
        };
        assert!(SurveyRepository::update(&store, &s.id, Some("bob"), patch)
            .await
            .unwrap()
            .is_none());
        assert!(!SurveyRepository::delete(&store, &s.id, Some("bob")).await.unwrap());
        assert!(SurveyRepository::delete(&store, &s.id, Some("alice")).await.unwrap());
        assert!(SurveyRepository::find_by_id(&store, &s.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn response_counts_and_cascade() {
        let store = InMemoryStore::new();
        for _ in 0..2 {
            ResponseRepository::insert(&store, response("s1")).await.unwrap();
        }
        ResponseRepository::insert(&store, response("s2")).await.unwrap();

        let ids = vec!["s1".to_string(), "s3".to_string()];
        let counts = store.count_by_survey(&ids).await.unwrap();
        assert_eq!(counts.get("s1"), Some(&2));
        assert_eq!(counts.get("s3"), None);
        assert_eq!(store.count_for_surveys(Some(ids.as_slice())).await.unwrap(), 2);
        assert_eq!(store.count_for_surveys(None).await.unwrap(), 3);

        assert_eq!(store.delete_by_survey("s1").await.unwrap(), 2);
        let only_s1 = ResponseFilter::for_survey("s1");
        let (left, total) = ResponseRepository::list(&store, &only_s1, &PageRequest::default())
            .await
            .unwrap();
        assert!(left.is_empty());
        assert_eq!(total, 0);
    }
}
