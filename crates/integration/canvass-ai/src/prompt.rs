//! Summary prompt.

use canvass_core::{Response, Survey};
use serde_json::Value;

/// Sentences asked of the model.
const SUMMARY_LENGTH: &str = "3-5 sentences";

/// Build the prompt for one survey and its responses.
pub fn build(survey: &Survey, responses: &[Response]) -> String {
    let title = non_blank(Some(survey.title.as_str())).unwrap_or("Untitled survey");
    let description = non_blank(survey.description.as_deref()).unwrap_or("No description");
    let answers = Value::Array(responses.iter().map(|r| r.answers.clone()).collect());

    format!(
        "Analyze and summarize the answers collected by the following survey.\n\
         \n\
         Survey title: {title}\n\
         Description: {description}\n\
         \n\
         QUESTIONS:\n\
         {questions}\n\
         \n\
         ANSWERS ({count} responses):\n\
         {answers}\n\
         \n\
         Write a concise summary ({SUMMARY_LENGTH}) of the main points in these answers, \
         any notable trends or recurring themes, and the key insights they offer.\n",
        questions = survey.questions,
        count = responses.len(),
    )
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvass_core::{NewResponse, NewSurvey};
    use serde_json::{json, Map};

    fn survey(description: Option<&str>) -> Survey {
        Survey::new(
            NewSurvey {
                title: "Team pulse".into(),
                description: description.map(str::to_string),
                questions: vec![json!({"name": "mood", "type": "rating"})],
                json: Map::new(),
                is_active: true,
            },
            "alice",
        )
    }

    fn response(survey_id: &str, mood: i64) -> Response {
        let mut answers = Map::new();
        answers.insert("mood".into(), json!(mood));
        Response::new(
            NewResponse {
                survey_id: survey_id.into(),
                answers,
                ai_summary: None,
            },
            None,
        )
    }

    #[test]
    fn includes_questions_and_every_answer() {
        let s = survey(Some("Weekly check-in"));
        let prompt = build(&s, &[response(&s.id, 4), response(&s.id, 2)]);
        assert!(prompt.contains("Survey title: Team pulse"));
        assert!(prompt.contains("Description: Weekly check-in"));
        assert!(prompt.contains(r#"[{"name":"mood","type":"rating"}]"#));
        assert!(prompt.contains(r#"[{"mood":4},{"mood":2}]"#));
        assert!(prompt.contains("ANSWERS (2 responses)"));
    }

    #[test]
    fn missing_description_has_placeholder() {
        let s = survey(Some("   "));
        assert!(build(&s, &[]).contains("Description: No description"));
    }
}
