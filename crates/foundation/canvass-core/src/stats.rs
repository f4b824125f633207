//! Dashboard aggregation
//!
//! Counts come from the repositories; the arithmetic lives here so every
//! backend produces identical numbers.
//!
//! Note: `completion_rate` is active surveys over total surveys. It is a
//! usage-health figure, not a response completion rate.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::Survey;
use crate::repository::{ResponseRepository, SurveyFilter, SurveyRepository};
use crate::Result;

/// How many surveys the dashboard lists under "recent".
pub const RECENT_SURVEYS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SurveyStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyStatItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub response_count: u64,
    pub status: SurveyStatus,
    pub created_at: DateTime<Utc>,
}

impl SurveyStatItem {
    pub fn from_survey(survey: &Survey, response_count: u64) -> Self {
        Self {
            id: survey.id.clone(),
            title: survey.title.clone(),
            description: survey.description.clone(),
            response_count,
            status: survey.status(),
            created_at: survey.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_surveys: u64,
    pub active_surveys: u64,
    pub total_responses: u64,
    pub average_responses: f64,
    pub completion_rate: u32,
    pub recent_surveys: Vec<SurveyStatItem>,
}

impl DashboardStats {
    pub fn new(
        total_surveys: u64,
        active_surveys: u64,
        total_responses: u64,
        recent_surveys: Vec<SurveyStatItem>,
    ) -> Self {
        Self {
            total_surveys,
            active_surveys,
            total_responses,
            average_responses: average_responses(total_responses, total_surveys),
            completion_rate: completion_rate(active_surveys, total_surveys),
            recent_surveys,
        }
    }
}

/// `round(active / total * 100)`, or 0 when there are no surveys.
pub fn completion_rate(active: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((active as f64 / total as f64) * 100.0).round() as u32
}

/// `responses / surveys`, or 0 when there are no surveys.
pub fn average_responses(responses: u64, surveys: u64) -> f64 {
    if surveys == 0 {
        return 0.0;
    }
    responses as f64 / surveys as f64
}

/// Compute dashboard statistics for one creator, or for every survey when
/// `creator_id` is `None`.
pub async fn dashboard_stats(
    surveys: &dyn SurveyRepository,
    responses: &dyn ResponseRepository,
    creator_id: Option<&str>,
) -> Result<DashboardStats> {
    let scope = SurveyFilter {
        creator_id: creator_id.map(str::to_string),
        ..SurveyFilter::default()
    };

    let total_surveys = surveys.count(&scope).await?;
    if total_surveys == 0 {
        return Ok(DashboardStats::new(0, 0, 0, Vec::new()));
    }

    let active_surveys = surveys
        .count(&SurveyFilter {
            active: Some(true),
            ..scope.clone()
        })
        .await?;

    let total_responses = match creator_id {
        Some(_) => {
            let owned = surveys.ids(&scope).await?;
            responses.count_for_surveys(Some(owned.as_slice())).await?
        }
        None => responses.count_for_surveys(None).await?,
    };

    let recent = surveys.recent(&scope, RECENT_SURVEYS).await?;
    let recent_ids: Vec<String> = recent.iter().map(|s| s.id.clone()).collect();
    let counts = responses.count_by_survey(&recent_ids).await?;
    let recent_surveys = recent
        .iter()
        .map(|s| SurveyStatItem::from_survey(s, counts.get(&s.id).copied().unwrap_or(0)))
        .collect();

    tracing::debug!(
        total_surveys,
        active_surveys,
        total_responses,
        "computed dashboard stats"
    );

    Ok(DashboardStats::new(
        total_surveys,
        active_surveys,
        total_responses,
        recent_surveys,
    ))
}
