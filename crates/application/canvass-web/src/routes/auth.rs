use std::sync::Arc;

use axum::extract::State;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Router};
use tower_cookies::Cookies;

use crate::auth::UserProfile;
use crate::envelope;
use crate::middleware::session::clear_session;
use crate::middleware::{require_auth, AuthUser};
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/auth/profile", get(profile))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/auth/logout", post(logout))
        .merge(protected)
}

async fn profile(Extension(AuthUser(user)): Extension<AuthUser>) -> impl IntoResponse {
    envelope::ok(UserProfile::from(&user), "Profile retrieved successfully")
}

async fn logout(State(state): State<Arc<AppState>>, cookies: Cookies) -> impl IntoResponse {
    clear_session(&cookies, &state.session);
    envelope::ok((), "Logged out successfully")
}
