use std::sync::Arc;

use axum::extract::State;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use canvass_core::validate::GenerateSummaryRequest;
use serde::Serialize;

use crate::envelope;
use crate::error::ApiResult;
use crate::extract::ValidJson;
use crate::middleware::require_auth;
use crate::state::AppState;

#[derive(Serialize)]
struct SummaryView {
    summary: String,
}

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/ai/generate-summary", post(generate_summary))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

async fn generate_summary(
    State(state): State<Arc<AppState>>,
    ValidJson(body): ValidJson<GenerateSummaryRequest>,
) -> ApiResult<impl IntoResponse> {
    let survey_id = body.validate()?;
    let summary = state.summaries.generate(&survey_id).await?;
    Ok(envelope::ok(SummaryView { summary }, "AI summary generated successfully"))
}
