use std::sync::Arc;

use axum::extract::{Path, State};
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::Router;
use canvass_core::validate::{CreateResponseRequest, ResponseListQuery};
use tower_cookies::Cookies;

use crate::envelope;
use crate::error::ApiResult;
use crate::extract::{ValidJson, ValidQuery};
use crate::middleware::{optional_user, require_auth};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/responses", get(list))
        .route("/responses/:id", delete(remove))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/responses", post(submit))
        .merge(protected)
}

/// Anyone may submit; a valid session attributes the response to its user.
async fn submit(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    ValidJson(body): ValidJson<CreateResponseRequest>,
) -> ApiResult<impl IntoResponse> {
    let input = body.validate()?;
    let user = optional_user(&state, &cookies).await;
    let response = state
        .responses
        .create(input, user.as_ref().map(|u| u.id.as_str()))
        .await?;
    Ok(envelope::created(response, "Response submitted successfully"))
}

async fn list(
    State(state): State<Arc<AppState>>,
    ValidQuery(query): ValidQuery<ResponseListQuery>,
) -> ApiResult<impl IntoResponse> {
    let (filter, page) = query.validate()?;
    let responses = state.responses.list(&filter, &page).await?;
    Ok(envelope::paginated(responses, "Responses retrieved successfully"))
}

async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.responses.remove(&id).await?;
    Ok(envelope::ok((), "Response deleted successfully"))
}
