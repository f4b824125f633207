//! # Canvass MongoDB
//!
//! MongoDB backend for the canvass repository traits.
//!
//! ```text
//!   users               { _id, email (unique), provider, provider_id, ... }
//!   social_connections  { _id, provider + provider_id (unique), user_id, ... }
//!   surveys             { _id, creator_id, title, questions, json, ... }
//!   responses           { _id, survey_id, user_id?, answers, ... }
//! ```
//!
//! Ids are the UUID strings assigned by the entity constructors, stored as
//! `_id`.

mod document;
mod query;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};

use canvass_core::{
    Error, PageRequest, Repositories, Response, ResponseFilter, ResponseRepository, Result,
    SocialConnection, SocialConnectionRepository, Survey, SurveyFilter, SurveyPatch,
    SurveyRepository, User, UserRepository,
};

use document::{ConnectionDoc, ResponseDoc, SurveyDoc, UserDoc};

const DUPLICATE_KEY: i32 = 11000;

fn storage(context: &str, e: mongodb::error::Error) -> Error {
    Error::Storage(format!("MongoDB {context} failed: {e}"))
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(w)) if w.code == DUPLICATE_KEY
    )
}

/// Repository implementation over one MongoDB database.
#[derive(Debug, Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Connect to `uri`, select `db_name` and make sure indexes exist.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| storage("connection", e))?;
        let store = Self::new(client.database(db_name));
        store.ensure_indexes().await?;
        tracing::info!(database = db_name, "connected to MongoDB");
        Ok(store)
    }

    pub fn repositories(self) -> Repositories {
        Repositories::from_store(Arc::new(self))
    }

    fn users(&self) -> Collection<UserDoc> {
        self.db.collection("users")
    }

    fn connections(&self) -> Collection<ConnectionDoc> {
        self.db.collection("social_connections")
    }

    fn surveys(&self) -> Collection<SurveyDoc> {
        self.db.collection("surveys")
    }

    fn responses(&self) -> Collection<ResponseDoc> {
        self.db.collection("responses")
    }

    pub async fn ensure_indexes(&self) -> Result<()> {
        let unique = || IndexOptions::builder().unique(true).build();

        self.users()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(unique())
                    .build(),
            )
            .await
            .map_err(|e| storage("create_index", e))?;
        self.connections()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "provider": 1, "provider_id": 1 })
                    .options(unique())
                    .build(),
            )
            .await
            .map_err(|e| storage("create_index", e))?;
        self.surveys()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "creator_id": 1, "updated_at": -1 })
                    .build(),
            )
            .await
            .map_err(|e| storage("create_index", e))?;
        self.responses()
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "survey_id": 1, "created_at": -1 })
                    .build(),
            )
            .await
            .map_err(|e| storage("create_index", e))?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoStore {
    async fn insert(&self, user: User) -> Result<User> {
        let email = user.email.clone();
        match self.users().insert_one(UserDoc::from(user.clone())).await {
            Ok(_) => Ok(user),
            Err(e) if is_duplicate_key(&e) => Err(Error::Conflict(format!(
                "User with email {email} already exists"
            ))),
            Err(e) => Err(storage("insert", e)),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let found = self
            .users()
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| storage("find_one", e))?;
        Ok(found.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let found = self
            .users()
            .find_one(doc! { "email": email })
            .await
            .map_err(|e| storage("find_one", e))?;
        Ok(found.map(User::from))
    }
}

#[async_trait]
impl SocialConnectionRepository for MongoStore {
    async fn insert(&self, connection: SocialConnection) -> Result<SocialConnection> {
        self.connections()
            .insert_one(ConnectionDoc::from(connection.clone()))
            .await
            .map_err(|e| storage("insert", e))?;
        Ok(connection)
    }

    async fn find_by_provider(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<SocialConnection>> {
        let found = self
            .connections()
            .find_one(doc! { "provider": provider, "provider_id": provider_id })
            .await
            .map_err(|e| storage("find_one", e))?;
        Ok(found.map(SocialConnection::from))
    }
}

#[async_trait]
impl SurveyRepository for MongoStore {
    async fn insert(&self, survey: Survey) -> Result<Survey> {
        self.surveys()
            .insert_one(SurveyDoc::from(survey.clone()))
            .await
            .map_err(|e| storage("insert", e))?;
        Ok(survey)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Survey>> {
        let found = self
            .surveys()
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| storage("find_one", e))?;
        Ok(found.map(Survey::from))
    }

    async fn list(&self, filter: &SurveyFilter, page: &PageRequest) -> Result<(Vec<Survey>, u64)> {
        let filter = query::survey_filter(filter);
        let total = self
            .surveys()
            .count_documents(filter.clone())
            .await
            .map_err(|e| storage("count", e))?;
        if page.is_past_end(total) {
            return Ok((Vec::new(), total));
        }
        let (skip, limit) = query::window(page);
        let docs: Vec<SurveyDoc> = self
            .surveys()
            .find(filter)
            .sort(query::newest_updated())
            .skip(skip)
            .limit(limit)
            .await
            .map_err(|e| storage("find", e))?
            .try_collect()
            .await
            .map_err(|e| storage("cursor", e))?;
        Ok((docs.into_iter().map(Survey::from).collect(), total))
    }

    async fn count(&self, filter: &SurveyFilter) -> Result<u64> {
        self.surveys()
            .count_documents(query::survey_filter(filter))
            .await
            .map_err(|e| storage("count", e))
    }

    async fn ids(&self, filter: &SurveyFilter) -> Result<Vec<String>> {
        let ids = self
            .surveys()
            .distinct("_id", query::survey_filter(filter))
            .await
            .map_err(|e| storage("distinct", e))?;
        Ok(ids
            .into_iter()
            .filter_map(|id| id.as_str().map(str::to_string))
            .collect())
    }

    async fn recent(&self, filter: &SurveyFilter, limit: u64) -> Result<Vec<Survey>> {
        let docs: Vec<SurveyDoc> = self
            .surveys()
            .find(query::survey_filter(filter))
            .sort(query::newest_created())
            .limit(limit as i64)
            .await
            .map_err(|e| storage("find", e))?
            .try_collect()
            .await
            .map_err(|e| storage("cursor", e))?;
        Ok(docs.into_iter().map(Survey::from).collect())
    }

    async fn update(
        &self,
        id: &str,
        creator_id: Option<&str>,
        patch: SurveyPatch,
    ) -> Result<Option<Survey>> {
        let update = query::survey_update(patch, chrono::Utc::now())
            .map_err(|e| Error::Storage(format!("Failed to encode survey update: {e}")))?;
        let updated = self
            .surveys()
            .find_one_and_update(query::scoped_id(id, creator_id), update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| storage("find_one_and_update", e))?;
        Ok(updated.map(Survey::from))
    }

    async fn delete(&self, id: &str, creator_id: Option<&str>) -> Result<bool> {
        let result = self
            .surveys()
            .delete_one(query::scoped_id(id, creator_id))
            .await
            .map_err(|e| storage("delete", e))?;
        Ok(result.deleted_count > 0)
    }
}

#[async_trait]
impl ResponseRepository for MongoStore {
    async fn insert(&self, response: Response) -> Result<Response> {
        self.responses()
            .insert_one(ResponseDoc::from(response.clone()))
            .await
            .map_err(|e| storage("insert", e))?;
        Ok(response)
    }

    async fn list(
        &self,
        filter: &ResponseFilter,
        page: &PageRequest,
    ) -> Result<(Vec<Response>, u64)> {
        let filter = query::response_filter(filter);
        let total = self
            .responses()
            .count_documents(filter.clone())
            .await
            .map_err(|e| storage("count", e))?;
        if page.is_past_end(total) {
            return Ok((Vec::new(), total));
        }
        let (skip, limit) = query::window(page);
        let docs: Vec<ResponseDoc> = self
            .responses()
            .find(filter)
            .sort(query::newest_created())
            .skip(skip)
            .limit(limit)
            .await
            .map_err(|e| storage("find", e))?
            .try_collect()
            .await
            .map_err(|e| storage("cursor", e))?;
        Ok((docs.into_iter().map(Response::from).collect(), total))
    }

    async fn count_for_surveys(&self, survey_ids: Option<&[String]>) -> Result<u64> {
        let filter = match survey_ids {
            Some(ids) => query::responses_in(ids),
            None => Document::new(),
        };
        self.responses()
            .count_documents(filter)
            .await
            .map_err(|e| storage("count", e))
    }

    async fn count_by_survey(&self, survey_ids: &[String]) -> Result<HashMap<String, u64>> {
        if survey_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let groups: Vec<Document> = self
            .responses()
            .aggregate(query::count_by_survey_pipeline(survey_ids))
            .await
            .map_err(|e| storage("aggregate", e))?
            .try_collect()
            .await
            .map_err(|e| storage("cursor", e))?;
        Ok(groups
            .iter()
            .filter_map(|g| {
                let id = g.get_str("_id").ok()?;
                Some((id.to_string(), query::as_count(g.get("count"))))
            })
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = self
            .responses()
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| storage("delete", e))?;
        Ok(result.deleted_count > 0)
    }

    async fn delete_by_survey(&self, survey_id: &str) -> Result<u64> {
        let result = self
            .responses()
            .delete_many(doc! { "survey_id": survey_id })
            .await
            .map_err(|e| storage("delete_many", e))?;
        tracing::debug!(survey_id, removed = result.deleted_count, "removed survey responses");
        Ok(result.deleted_count)
    }
}
