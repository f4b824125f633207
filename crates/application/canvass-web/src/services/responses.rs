use std::sync::Arc;

use canvass_core::{
    Error, NewResponse, Page, PageRequest, Response, ResponseFilter, ResponseRepository, Result,
    SurveyRepository,
};

#[derive(Clone)]
pub struct ResponseService {
    surveys: Arc<dyn SurveyRepository>,
    responses: Arc<dyn ResponseRepository>,
}

impl ResponseService {
    pub fn new(surveys: Arc<dyn SurveyRepository>, responses: Arc<dyn ResponseRepository>) -> Self {
        Self { surveys, responses }
    }

    async fn ensure_survey(&self, survey_id: &str) -> Result<()> {
        match self.surveys.find_by_id(survey_id).await? {
            Some(_) => Ok(()),
            None => Err(Error::survey_not_found(survey_id)),
        }
    }

    /// Record a submission. `user_id` is `None` for anonymous submitters.
    pub async fn create(&self, input: NewResponse, user_id: Option<&str>) -> Result<Response> {
        self.ensure_survey(&input.survey_id).await?;
        let response = self.responses.insert(Response::new(input, user_id)).await?;
        tracing::info!(
            response_id = %response.id,
            survey_id = %response.survey_id,
            anonymous = user_id.is_none(),
            "response recorded"
        );
        Ok(response)
    }

    pub async fn list(
        &self,
        filter: &ResponseFilter,
        page: &PageRequest,
    ) -> Result<Page<Response>> {
        if let Some(survey_id) = &filter.survey_id {
            self.ensure_survey(survey_id).await?;
        }
        let (data, total) = self.responses.list(filter, page).await?;
        Ok(Page::new(data, total, page))
    }

    /// Most recent responses of one survey, at most `limit`.
    pub async fn latest_for_survey(&self, survey_id: &str, limit: u64) -> Result<Vec<Response>> {
        let page = PageRequest::new(1, limit.max(1))?;
        let (data, _) = self
            .responses
            .list(&ResponseFilter::for_survey(survey_id), &page)
            .await?;
        Ok(data)
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        if self.responses.delete(id).await? {
            Ok(())
        } else {
            Err(Error::response_not_found(id))
        }
    }
}
