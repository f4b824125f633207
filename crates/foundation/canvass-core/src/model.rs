//! Entities
//!
//! Plain data structs. Relations are held as ids; loading related records is the
//! service layer's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::stats::SurveyStatus;

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------
//  Users
// ---------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub provider: String,
    pub provider_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub provider: String,
    pub provider_id: String,
}

impl User {
    pub fn new(input: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            email: input.email,
            name: input.name,
            picture: input.picture,
            provider: input.provider,
            provider_id: input.provider_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Identity handed over by an OAuth provider after a successful login.
#[derive(Debug, Clone)]
pub struct SocialProfile {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub provider: String,
    pub provider_id: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SocialProfile {
    pub fn google(provider_id: &str, email: &str, name: Option<&str>) -> Self {
        Self {
            email: email.to_string(),
            name: name.map(str::to_string),
            picture: None,
            provider: "google".to_string(),
            provider_id: provider_id.to_string(),
            access_token: None,
            refresh_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialConnection {
    pub id: String,
    pub provider: String,
    pub provider_id: String,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SocialConnection {
    pub fn link(profile: &SocialProfile, user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            provider: profile.provider.clone(),
            provider_id: profile.provider_id.clone(),
            access_token: profile.access_token.clone(),
            refresh_token: profile.refresh_token.clone(),
            user_id: user_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------
//  Surveys
// ---------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Question list fragment of the builder schema.
    pub questions: Value,
    /// Full builder document.
    pub json: Value,
    pub is_active: bool,
    /// Cached AI summary, overwritten on every regeneration.
    pub ai_summary: Option<String>,
    pub creator_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSurvey {
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<Value>,
    pub json: Map<String, Value>,
    pub is_active: bool,
}

/// Partial update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub questions: Option<Vec<Value>>,
    pub json: Option<Map<String, Value>>,
    pub is_active: Option<bool>,
    pub ai_summary: Option<String>,
}

impl SurveyPatch {
    pub fn ai_summary(summary: impl Into<String>) -> Self {
        Self {
            ai_summary: Some(summary.into()),
            ..Self::default()
        }
    }
}

impl Survey {
    pub fn new(input: NewSurvey, creator_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            title: input.title,
            description: input.description,
            questions: Value::Array(input.questions),
            json: Value::Object(input.json),
            is_active: input.is_active,
            ai_summary: None,
            creator_id: creator_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a patch and bump `updated_at`.
    pub fn apply(&mut self, patch: SurveyPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(questions) = patch.questions {
            self.questions = Value::Array(questions);
        }
        if let Some(json) = patch.json {
            self.json = Value::Object(json);
        }
        if let Some(active) = patch.is_active {
            self.is_active = active;
        }
        if let Some(summary) = patch.ai_summary {
            self.ai_summary = Some(summary);
        }
        self.updated_at = Utc::now();
    }

    pub fn status(&self) -> SurveyStatus {
        if self.is_active {
            SurveyStatus::Active
        } else {
            SurveyStatus::Inactive
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.creator_id == user_id
    }
}

// ---------------------------------------------------------------
//  Responses
// ---------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: String,
    pub answers: Value,
    pub ai_summary: Option<String>,
    pub survey_id: String,
    /// `None` for anonymous submissions.
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewResponse {
    pub survey_id: String,
    pub answers: Map<String, Value>,
    pub ai_summary: Option<String>,
}

impl Response {
    pub fn new(input: NewResponse, user_id: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            answers: Value::Object(input.answers),
            ai_summary: input.ai_summary,
            survey_id: input.survey_id,
            user_id: user_id.map(str::to_string),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_survey() -> Survey {
        Survey::new(
            NewSurvey {
                title: "Onboarding".into(),
                description: None,
                questions: vec![json!({"type": "text", "name": "q1"})],
                json: Map::new(),
                is_active: true,
            },
            "creator-1",
        )
    }

    #[test]
    fn survey_serializes_camel_case() {
        let value = serde_json::to_value(sample_survey()).unwrap();
        assert!(value.get("isActive").is_some());
        assert!(value.get("creatorId").is_some());
        assert!(value.get("aiSummary").is_some());
        assert!(value.get("is_active").is_none());
    }

    #[test]
    fn apply_patch_touches_only_given_fields() {
        let mut survey = sample_survey();
        let before = survey.updated_at;
        survey.apply(SurveyPatch {
            is_active: Some(false),
            ..SurveyPatch::default()
        });
        assert_eq!(survey.title, "Onboarding");
        assert!(!survey.is_active);
        assert_eq!(survey.status(), SurveyStatus::Inactive);
        assert!(survey.updated_at >= before);
    }

    #[test]
    fn anonymous_response_has_no_user() {
        let response = Response::new(
            NewResponse {
                survey_id: "s1".into(),
                answers: Map::new(),
                ai_summary: None,
            },
            None,
        );
        let value = serde_json::to_value(&response).unwrap();
        assert!(value["userId"].is_null());
    }

    #[test]
    fn social_tokens_are_not_serialized() {
        let mut profile = SocialProfile::google("g-1", "a@example.com", Some("A"));
        profile.access_token = Some("secret".into());
        let conn = SocialConnection::link(&profile, "u1");
        let value = serde_json::to_value(&conn).unwrap();
        assert!(value.get("accessToken").is_none());
        assert_eq!(value["providerId"], "g-1");
    }
}
