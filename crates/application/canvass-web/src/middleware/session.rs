//! Session middleware -- resolves the caller from the session cookie.
//!
//! `require_auth` rejects the request with 401 unless the cookie carries a
//! valid token for an existing user, then injects [`AuthUser`] into the
//! request extensions. Routes with optional identity call [`optional_user`]
//! directly.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use canvass_core::{Error, User};
use tower_cookies::cookie::time::Duration;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};

use crate::error::ApiError;
use crate::state::{AppState, SessionCookie};

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

fn session_token(cookies: &Cookies, session: &SessionCookie) -> Option<String> {
    cookies
        .get(&session.name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = session_token(&cookies, &state.session)
        .ok_or_else(|| Error::Unauthorized("Authentication required".to_string()))?;
    let user = state.auth.authenticate(&token).await?;
    request.extensions_mut().insert(AuthUser(user));
    Ok(next.run(request).await)
}

/// The caller if a valid session is present. Bad tokens are ignored.
pub async fn optional_user(state: &AppState, cookies: &Cookies) -> Option<User> {
    let token = session_token(cookies, &state.session)?;
    match state.auth.authenticate(&token).await {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring invalid session on public route");
            None
        }
    }
}

/// The cookie that carries a session token to the browser.
pub fn session_cookie(session: &SessionCookie, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(session.name.clone(), token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(session.secure);
    // Browsers drop `SameSite=None` cookies that are not `Secure`.
    cookie.set_same_site(if session.secure {
        SameSite::None
    } else {
        SameSite::Lax
    });
    cookie.set_max_age(Duration::seconds(
        i64::try_from(session.max_age_secs).unwrap_or(i64::MAX),
    ));
    cookie
}

pub fn clear_session(cookies: &Cookies, session: &SessionCookie) {
    let mut cookie = Cookie::new(session.name.clone(), "");
    cookie.set_path("/");
    cookies.remove(cookie);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_attributes() {
        let session = SessionCookie {
            name: "auth_token".into(),
            secure: true,
            max_age_secs: 86_400,
        };
        let cookie = session_cookie(&session, "abc".into());
        assert_eq!(cookie.name(), "auth_token");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::None));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(86_400)));
    }

    #[test]
    fn insecure_cookie_falls_back_to_lax() {
        let session = SessionCookie {
            name: "auth_token".into(),
            secure: false,
            max_age_secs: 60,
        };
        let cookie = session_cookie(&session, "abc".into());
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }
}
