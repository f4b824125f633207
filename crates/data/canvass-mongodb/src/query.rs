// Filter, sort and update document builders.

use bson::{doc, Bson, Document};
use canvass_core::{PageRequest, ResponseFilter, SurveyFilter, SurveyPatch};
use chrono::{DateTime, Utc};

pub fn survey_filter(filter: &SurveyFilter) -> Document {
    let mut query = Document::new();
    if let Some(creator) = &filter.creator_id {
        query.insert("creator_id", creator.as_str());
    }
    if let Some(active) = filter.active {
        query.insert("is_active", active);
    }
    if let Some(search) = &filter.search {
        query.insert(
            "title",
            doc! { "$regex": regex::escape(search), "$options": "i" },
        );
    }
    query
}

/// `_id` match, optionally also pinned to an owner.
pub fn scoped_id(id: &str, creator_id: Option<&str>) -> Document {
    let mut query = doc! { "_id": id };
    if let Some(creator) = creator_id {
        query.insert("creator_id", creator);
    }
    query
}

pub fn response_filter(filter: &ResponseFilter) -> Document {
    match &filter.survey_id {
        Some(id) => doc! { "survey_id": id.as_str() },
        None => Document::new(),
    }
}

pub fn responses_in(survey_ids: &[String]) -> Document {
    let ids: Vec<Bson> = survey_ids.iter().map(|id| Bson::String(id.clone())).collect();
    doc! { "survey_id": { "$in": ids } }
}

/// `(skip, limit)` for a find. The driver encodes both as signed 64-bit.
pub fn window(page: &PageRequest) -> (u64, i64) {
    let skip = page.skip().min(i64::MAX as u64);
    let limit = i64::try_from(page.limit()).unwrap_or(i64::MAX);
    (skip, limit)
}

pub fn newest_updated() -> Document {
    doc! { "updated_at": -1, "_id": -1 }
}

pub fn newest_created() -> Document {
    doc! { "created_at": -1, "_id": -1 }
}

/// `$match` + `$group` pipeline yielding `{ _id: survey_id, count }`.
pub fn count_by_survey_pipeline(survey_ids: &[String]) -> Vec<Document> {
    vec![
        doc! { "$match": responses_in(survey_ids) },
        doc! { "$group": { "_id": "$survey_id", "count": { "$sum": 1 } } },
    ]
}

/// `$set` document for a patch. `updated_at` is always bumped.
pub fn survey_update(patch: SurveyPatch, now: DateTime<Utc>) -> bson::ser::Result<Document> {
    let mut set = doc! { "updated_at": bson::DateTime::from_chrono(now) };
    if let Some(title) = patch.title {
        set.insert("title", title);
    }
    if let Some(description) = patch.description {
        set.insert("description", description);
    }
    if let Some(questions) = patch.questions {
        set.insert("questions", bson::to_bson(&questions)?);
    }
    if let Some(json) = patch.json {
        set.insert("json", bson::to_bson(&json)?);
    }
    if let Some(active) = patch.is_active {
        set.insert("is_active", active);
    }
    if let Some(summary) = patch.ai_summary {
        set.insert("ai_summary", summary);
    }
    Ok(doc! { "$set": set })
}

/// Read a numeric aggregation field regardless of the integer width the
/// server picked.
pub fn as_count(value: Option<&Bson>) -> u64 {
    match value {
        Some(Bson::Int32(n)) => u64::try_from(*n).unwrap_or(0),
        Some(Bson::Int64(n)) => u64::try_from(*n).unwrap_or(0),
        Some(Bson::Double(n)) if *n >= 0.0 => *n as u64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_matches_everything() {
        assert!(survey_filter(&SurveyFilter::default()).is_empty());
        assert!(response_filter(&ResponseFilter::default()).is_empty());
    }

    #[test]
    fn search_is_escaped_and_case_insensitive() {
        let filter = SurveyFilter::owned_by("alice").with_search(Some("c++ (beta)".into()));
        let query = survey_filter(&filter);
        assert_eq!(query.get_str("creator_id").unwrap(), "alice");
        let title = query.get_document("title").unwrap();
        assert_eq!(title.get_str("$regex").unwrap(), r"c\+\+ \(beta\)");
        assert_eq!(title.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn scoped_id_pins_owner() {
        assert_eq!(scoped_id("s1", None), doc! { "_id": "s1" });
        assert_eq!(
            scoped_id("s1", Some("bob")),
            doc! { "_id": "s1", "creator_id": "bob" }
        );
    }

    #[test]
    fn update_sets_only_present_fields() {
        let now = Utc::now();
        let update = survey_update(SurveyPatch::ai_summary("short"), now).unwrap();
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get_str("ai_summary").unwrap(), "short");
        assert!(set.get_datetime("updated_at").is_ok());
    }

    #[test]
    fn counts_accept_any_integer_width() {
        assert_eq!(as_count(Some(&Bson::Int32(3))), 3);
        assert_eq!(as_count(Some(&Bson::Int64(7))), 7);
        assert_eq!(as_count(None), 0);
    }

    #[test]
    fn window_fits_signed_driver_options() {
        let huge = PageRequest::parse(Some("9223372036854775807"), Some("10")).unwrap();
        assert_eq!(window(&huge), (i64::MAX as u64, 10));

        let second = PageRequest::new(2, 3).unwrap();
        assert_eq!(window(&second), (3, 3));
    }

    #[test]
    fn lists_sort_newest_first_with_id_tiebreak() {
        let sort = newest_updated();
        let keys: Vec<&String> = sort.keys().collect();
        assert_eq!(keys, vec!["updated_at", "_id"]);
        assert_eq!(count_by_survey_pipeline(&["a".to_string()]).len(), 2);
    }
}
