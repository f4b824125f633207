use std::sync::Arc;

use axum::extract::{Path, State};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Router};
use canvass_core::validate::{CreateSurveyRequest, SurveyListQuery, UpdateSurveyRequest};

use crate::envelope;
use crate::error::ApiResult;
use crate::extract::{ValidJson, ValidQuery};
use crate::middleware::{require_auth, AuthUser};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/surveys", post(create))
        .route("/surveys/my-surveys", get(my_surveys))
        .route("/surveys/dashboard/stats", get(dashboard_stats))
        .route("/surveys/:id", axum::routing::patch(update).delete(remove))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/surveys/:id", get(find_one))
        .merge(protected)
}

async fn create(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    ValidJson(body): ValidJson<CreateSurveyRequest>,
) -> ApiResult<impl IntoResponse> {
    let survey = state.surveys.create(body.validate()?, &user.id).await?;
    Ok(envelope::created(survey, "Survey created successfully"))
}

async fn my_surveys(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    ValidQuery(query): ValidQuery<SurveyListQuery>,
) -> ApiResult<impl IntoResponse> {
    let (filter, page) = query.validate(&user.id)?;
    let surveys = state.surveys.list(&filter, &page).await?;
    Ok(envelope::paginated(surveys, "Surveys retrieved successfully"))
}

async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let stats = state.surveys.dashboard_stats(&user.id).await?;
    Ok(envelope::ok(stats, "Dashboard statistics retrieved successfully"))
}

async fn find_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let survey = state.surveys.find_one(&id).await?;
    Ok(envelope::ok(survey, "Survey retrieved successfully"))
}

async fn update(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidJson(body): ValidJson<UpdateSurveyRequest>,
) -> ApiResult<impl IntoResponse> {
    let survey = state.surveys.update(&id, &user.id, body.validate()?).await?;
    Ok(envelope::ok(survey, "Survey updated successfully"))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.surveys.remove(&id, &user.id).await?;
    Ok(envelope::ok((), "Survey deleted successfully"))
}
