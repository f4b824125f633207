use std::sync::Arc;

use canvass_core::stats::{self, DashboardStats};
use canvass_core::{
    Error, NewSurvey, Page, PageRequest, ResponseRepository, Result, Survey, SurveyFilter,
    SurveyPatch, SurveyRepository,
};

#[derive(Clone)]
pub struct SurveyService {
    surveys: Arc<dyn SurveyRepository>,
    responses: Arc<dyn ResponseRepository>,
}

impl SurveyService {
    pub fn new(surveys: Arc<dyn SurveyRepository>, responses: Arc<dyn ResponseRepository>) -> Self {
        Self { surveys, responses }
    }

    pub async fn create(&self, input: NewSurvey, creator_id: &str) -> Result<Survey> {
        let survey = self.surveys.insert(Survey::new(input, creator_id)).await?;
        tracing::info!(survey_id = %survey.id, creator_id, "survey created");
        Ok(survey)
    }

    pub async fn find_one(&self, id: &str) -> Result<Survey> {
        self.surveys
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::survey_not_found(id))
    }

    pub async fn list(&self, filter: &SurveyFilter, page: &PageRequest) -> Result<Page<Survey>> {
        let (data, total) = self.surveys.list(filter, page).await?;
        Ok(Page::new(data, total, page))
    }

    /// Patch a survey owned by `creator_id`. Surveys owned by someone else
    /// are reported as missing.
    pub async fn update(&self, id: &str, creator_id: &str, patch: SurveyPatch) -> Result<Survey> {
        self.surveys
            .update(id, Some(creator_id), patch)
            .await?
            .ok_or_else(|| Error::survey_not_found(id))
    }

    /// Delete a survey owned by `creator_id` together with its responses.
    pub async fn remove(&self, id: &str, creator_id: &str) -> Result<()> {
        let survey = self.find_one(id).await?;
        if !survey.is_owned_by(creator_id) {
            return Err(Error::survey_not_found(id));
        }
        // Survey goes first: submissions check it still exists.
        if !self.surveys.delete(id, Some(creator_id)).await? {
            return Err(Error::survey_not_found(id));
        }
        let removed = self.responses.delete_by_survey(id).await?;
        tracing::info!(survey_id = id, responses = removed, "survey deleted");
        Ok(())
    }

    pub async fn store_summary(&self, id: &str, summary: &str) -> Result<Survey> {
        self.surveys
            .update(id, None, SurveyPatch::ai_summary(summary))
            .await?
            .ok_or_else(|| Error::survey_not_found(id))
    }

    pub async fn dashboard_stats(&self, creator_id: &str) -> Result<DashboardStats> {
        stats::dashboard_stats(
            self.surveys.as_ref(),
            self.responses.as_ref(),
            Some(creator_id),
        )
        .await
    }
}
