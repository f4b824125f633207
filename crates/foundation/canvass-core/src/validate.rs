//! Request validation
//!
//! Raw request bodies deserialize leniently (every field is an optional JSON
//! value, unknown fields are refused) and are then checked field by field. A
//! failed check collects one message per field so the client sees every problem
//! at once.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::model::{NewResponse, NewSurvey, SurveyPatch};
use crate::page::PageRequest;
use crate::repository::{ResponseFilter, SurveyFilter};
use crate::{Error, Result};

#[derive(Default)]
struct Checker {
    errors: Vec<String>,
}

impl Checker {
    fn missing(&mut self, name: &str, required: bool) {
        if required {
            self.errors.push(format!("{name} should not be empty"));
        }
    }

    fn string(&mut self, name: &str, value: Option<Value>, required: bool) -> Option<String> {
        match value {
            None => {
                self.missing(name, required);
                None
            }
            Some(Value::String(s)) => {
                if required && s.trim().is_empty() {
                    self.errors.push(format!("{name} should not be empty"));
                    return None;
                }
                Some(s)
            }
            Some(_) => {
                self.errors.push(format!("{name} must be a string"));
                None
            }
        }
    }

    fn array(&mut self, name: &str, value: Option<Value>, required: bool) -> Option<Vec<Value>> {
        match value {
            None => {
                self.missing(name, required);
                None
            }
            Some(Value::Array(items)) => Some(items),
            Some(_) => {
                self.errors.push(format!("{name} must be an array"));
                None
            }
        }
    }

    fn object(
        &mut self,
        name: &str,
        value: Option<Value>,
        required: bool,
    ) -> Option<Map<String, Value>> {
        match value {
            None => {
                self.missing(name, required);
                None
            }
            Some(Value::Object(map)) => Some(map),
            Some(_) => {
                self.errors.push(format!("{name} must be an object"));
                None
            }
        }
    }

    fn boolean(&mut self, name: &str, value: Option<Value>) -> Option<bool> {
        match value {
            None => None,
            Some(Value::Bool(b)) => Some(b),
            Some(_) => {
                self.errors.push(format!("{name} must be a boolean value"));
                None
            }
        }
    }

    fn uuid(&mut self, name: &str, value: Option<Value>) -> Option<String> {
        let raw = self.string(name, value, true)?;
        match uuid::Uuid::parse_str(raw.trim()) {
            Ok(id) => Some(id.to_string()),
            Err(_) => {
                self.errors.push(format!("{name} must be a UUID"));
                None
            }
        }
    }

    fn finish<T>(self, build: impl FnOnce() -> Option<T>) -> Result<T> {
        if !self.errors.is_empty() {
            return Err(Error::invalid(self.errors));
        }
        build().ok_or_else(|| Error::Internal("validated request incomplete".to_string()))
    }
}

// ---------------------------------------------------------------
//  Survey bodies
// ---------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSurveyRequest {
    pub title: Option<Value>,
    pub description: Option<Value>,
    pub questions: Option<Value>,
    pub json: Option<Value>,
    pub is_active: Option<Value>,
}

impl CreateSurveyRequest {
    pub fn validate(self) -> Result<NewSurvey> {
        let mut check = Checker::default();
        let title = check.string("title", self.title, true);
        let description = check.string("description", self.description, false);
        let questions = check.array("questions", self.questions, true);
        let json = check.object("json", self.json, true);
        let is_active = check.boolean("isActive", self.is_active);

        check.finish(|| {
            Some(NewSurvey {
                title: title?,
                description,
                questions: questions?,
                json: json?,
                is_active: is_active.unwrap_or(true),
            })
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateSurveyRequest {
    pub title: Option<Value>,
    pub description: Option<Value>,
    pub questions: Option<Value>,
    pub json: Option<Value>,
    pub is_active: Option<Value>,
}

impl UpdateSurveyRequest {
    pub fn validate(self) -> Result<SurveyPatch> {
        let mut check = Checker::default();
        // A title may be omitted, but a present one must not be blank.
        let title = match self.title {
            Some(v) => check.string("title", Some(v), true),
            None => None,
        };
        let description = check.string("description", self.description, false);
        let questions = check.array("questions", self.questions, false);
        let json = check.object("json", self.json, false);
        let is_active = check.boolean("isActive", self.is_active);

        check.finish(|| {
            Some(SurveyPatch {
                title,
                description,
                questions,
                json,
                is_active,
                ai_summary: None,
            })
        })
    }
}

// ---------------------------------------------------------------
//  Response bodies
// ---------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateResponseRequest {
    pub survey_id: Option<Value>,
    pub answers: Option<Value>,
    pub ai_summary: Option<Value>,
}

impl CreateResponseRequest {
    pub fn validate(self) -> Result<NewResponse> {
        let mut check = Checker::default();
        let survey_id = check.uuid("surveyId", self.survey_id);
        let answers = check.object("answers", self.answers, true);
        let ai_summary = check.string("aiSummary", self.ai_summary, false);

        check.finish(|| {
            Some(NewResponse {
                survey_id: survey_id?,
                answers: answers?,
                ai_summary,
            })
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GenerateSummaryRequest {
    pub survey_id: Option<Value>,
}

impl GenerateSummaryRequest {
    /// Returns the normalized survey id.
    pub fn validate(self) -> Result<String> {
        let mut check = Checker::default();
        let survey_id = check.uuid("surveyId", self.survey_id);
        check.finish(|| survey_id)
    }
}

// ---------------------------------------------------------------
//  Query strings
// ---------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SurveyListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

impl SurveyListQuery {
    /// Validate paging and build the filter for one creator's surveys.
    pub fn validate(self, creator_id: &str) -> Result<(SurveyFilter, PageRequest)> {
        let page = PageRequest::parse(self.page.as_deref(), self.limit.as_deref())?;
        let filter = SurveyFilter::owned_by(creator_id).with_search(self.search);
        Ok((filter, page))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub survey_id: Option<String>,
}

impl ResponseListQuery {
    pub fn validate(self) -> Result<(ResponseFilter, PageRequest)> {
        let page = PageRequest::parse(self.page.as_deref(), self.limit.as_deref())?;
        let filter = ResponseFilter {
            survey_id: self
                .survey_id
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        };
        Ok((filter, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn errors_of(err: Error) -> Vec<String> {
        match err {
            Error::Validation { errors, .. } => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn parse<T: serde::de::DeserializeOwned>(value: Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn create_survey_defaults_active() {
        let req: CreateSurveyRequest = parse(json!({
            "title": "T1",
            "questions": [{"type": "text", "name": "q1"}],
            "json": {"title": "T1"}
        }));
        let survey = req.validate().unwrap();
        assert_eq!(survey.title, "T1");
        assert!(survey.is_active);
        assert_eq!(survey.questions.len(), 1);
    }

    #[test]
    fn empty_body_lists_every_required_field() {
        let errors = errors_of(CreateSurveyRequest::default().validate().unwrap_err());
        assert_eq!(
            errors,
            vec![
                "title should not be empty",
                "questions should not be empty",
                "json should not be empty",
            ]
        );
    }

    #[test]
    fn wrong_types_are_reported() {
        let req: CreateSurveyRequest = parse(json!({
            "title": 5,
            "questions": {},
            "json": [],
            "isActive": "yes"
        }));
        let errors = errors_of(req.validate().unwrap_err());
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&"isActive must be a boolean value".to_string()));
    }

    #[test]
    fn unknown_fields_are_refused() {
        let result: std::result::Result<CreateSurveyRequest, _> =
            serde_json::from_value(json!({"title": "x", "creatorId": "someone"}));
        assert!(result.is_err());
    }

    #[test]
    fn update_allows_partial_but_not_blank_title() {
        let patch = parse::<UpdateSurveyRequest>(json!({"isActive": false}))
            .validate()
            .unwrap();
        assert_eq!(patch.is_active, Some(false));
        assert!(patch.title.is_none());

        let errors = errors_of(
            parse::<UpdateSurveyRequest>(json!({"title": "  "}))
                .validate()
                .unwrap_err(),
        );
        assert_eq!(errors, vec!["title should not be empty"]);
    }

    #[test]
    fn response_requires_uuid_and_object() {
        let errors = errors_of(
            parse::<CreateResponseRequest>(json!({"surveyId": "nope", "answers": "x"}))
                .validate()
                .unwrap_err(),
        );
        assert_eq!(errors, vec!["surveyId must be a UUID", "answers must be an object"]);

        let id = uuid::Uuid::new_v4().to_string();
        let ok = parse::<CreateResponseRequest>(json!({"surveyId": id, "answers": {"q1": "yes"}}))
            .validate()
            .unwrap();
        assert_eq!(ok.survey_id, id);
        assert!(ok.ai_summary.is_none());
    }

    #[test]
    fn summary_request_needs_survey_id() {
        assert!(GenerateSummaryRequest::default().validate().is_err());
    }

    #[test]
    fn list_query_scopes_to_creator() {
        let query = SurveyListQuery {
            page: Some("2".into()),
            limit: Some("3".into()),
            search: Some("pulse".into()),
        };
        let (filter, page) = query.validate("alice").unwrap();
        assert_eq!(filter.creator_id.as_deref(), Some("alice"));
        assert_eq!(filter.search.as_deref(), Some("pulse"));
        assert_eq!(page.skip(), 3);
    }
}
