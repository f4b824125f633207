// Stored document shapes.
//
// Entities keep camelCase for the HTTP surface; documents use snake_case field
// names, `_id` for the primary key and BSON dates for timestamps.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use canvass_core::{Response, SocialConnection, Survey, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub provider: String,
    pub provider_id: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDoc {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            picture: u.picture,
            provider: u.provider,
            provider_id: u.provider_id,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

impl From<UserDoc> for User {
    fn from(d: UserDoc) -> Self {
        Self {
            id: d.id,
            email: d.email,
            name: d.name,
            picture: d.picture,
            provider: d.provider,
            provider_id: d.provider_id,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub provider: String,
    pub provider_id: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user_id: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl From<SocialConnection> for ConnectionDoc {
    fn from(c: SocialConnection) -> Self {
        Self {
            id: c.id,
            provider: c.provider,
            provider_id: c.provider_id,
            access_token: c.access_token,
            refresh_token: c.refresh_token,
            user_id: c.user_id,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl From<ConnectionDoc> for SocialConnection {
    fn from(d: ConnectionDoc) -> Self {
        Self {
            id: d.id,
            provider: d.provider,
            provider_id: d.provider_id,
            access_token: d.access_token,
            refresh_token: d.refresh_token,
            user_id: d.user_id,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub questions: Value,
    pub json: Value,
    pub is_active: bool,
    pub ai_summary: Option<String>,
    pub creator_id: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl From<Survey> for SurveyDoc {
    fn from(s: Survey) -> Self {
        Self {
            id: s.id,
            title: s.title,
            description: s.description,
            questions: s.questions,
            json: s.json,
            is_active: s.is_active,
            ai_summary: s.ai_summary,
            creator_id: s.creator_id,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

impl From<SurveyDoc> for Survey {
    fn from(d: SurveyDoc) -> Self {
        Self {
            id: d.id,
            title: d.title,
            description: d.description,
            questions: d.questions,
            json: d.json,
            is_active: d.is_active,
            ai_summary: d.ai_summary,
            creator_id: d.creator_id,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub answers: Value,
    pub ai_summary: Option<String>,
    pub survey_id: String,
    pub user_id: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl From<Response> for ResponseDoc {
    fn from(r: Response) -> Self {
        Self {
            id: r.id,
            answers: r.answers,
            ai_summary: r.ai_summary,
            survey_id: r.survey_id,
            user_id: r.user_id,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

impl From<ResponseDoc> for Response {
    fn from(d: ResponseDoc) -> Self {
        Self {
            id: d.id,
            answers: d.answers,
            ai_summary: d.ai_summary,
            survey_id: d.survey_id,
            user_id: d.user_id,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}
