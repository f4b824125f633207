use canvass_ai::SummaryGenerator;
use canvass_core::{Error, Result};

use super::{ResponseService, SurveyService};

/// Returned instead of calling the model when a survey has no responses.
pub const NO_DATA_SUMMARY: &str = "No data available to generate a summary";

pub const SUMMARY_FAILED: &str = "Unable to generate an AI summary. Please try again later.";

#[derive(Clone)]
pub struct SummaryService {
    surveys: SurveyService,
    responses: ResponseService,
    generator: SummaryGenerator,
    max_responses: u64,
}

impl SummaryService {
    pub fn new(
        surveys: SurveyService,
        responses: ResponseService,
        generator: SummaryGenerator,
        max_responses: u64,
    ) -> Self {
        Self {
            surveys,
            responses,
            generator,
            max_responses,
        }
    }

    /// Summarize a survey's responses and cache the result on the survey.
    pub async fn generate(&self, survey_id: &str) -> Result<String> {
        let survey = self.surveys.find_one(survey_id).await?;
        let responses = self
            .responses
            .latest_for_survey(survey_id, self.max_responses)
            .await?;
        if responses.is_empty() {
            return Ok(NO_DATA_SUMMARY.to_string());
        }

        let summary = self
            .generator
            .generate(&survey, &responses)
            .await
            .ok_or_else(|| Error::Upstream(SUMMARY_FAILED.to_string()))?;

        self.surveys.store_summary(survey_id, &summary).await?;
        tracing::info!(survey_id, responses = responses.len(), "AI summary stored");
        Ok(summary)
    }
}
