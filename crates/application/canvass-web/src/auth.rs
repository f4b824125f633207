//! Accounts and session tokens.
//!
//! Social login resolves a provider identity to a [`User`], linking a new
//! provider to an existing account when the email matches. Sessions are HS256
//! JWTs carried in an HTTP-only cookie.

use std::sync::Arc;

use canvass_core::{
    Error, NewUser, Result, SocialConnection, SocialConnectionRepository, SocialProfile, User,
    UserRepository,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const INVALID_TOKEN: &str = "Invalid or expired token";
const UNKNOWN_USER: &str = "User does not exist or is not logged in";

/// JWT payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String> {
        self.issue_at(user, chrono::Utc::now().timestamp())
    }

    pub fn issue_at(&self, user: &User, now: i64) -> Result<String> {
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            iat: now,
            exp: now.saturating_add(i64::try_from(self.ttl_secs).unwrap_or(i64::MAX)),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("JWT signing failed: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected session token");
                Error::Unauthorized(INVALID_TOKEN.to_string())
            })
    }
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            picture: user.picture.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub access_token: String,
    pub user: UserProfile,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    connections: Arc<dyn SocialConnectionRepository>,
    tokens: TokenCodec,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        connections: Arc<dyn SocialConnectionRepository>,
        tokens: TokenCodec,
    ) -> Self {
        Self {
            users,
            connections,
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenCodec {
        &self.tokens
    }

    /// Resolve a provider identity to a user, creating the user and the
    /// provider link on first sight.
    pub async fn validate_social_user(&self, profile: &SocialProfile) -> Result<User> {
        if let Some(connection) = self
            .connections
            .find_by_provider(&profile.provider, &profile.provider_id)
            .await?
        {
            return self.users.find_by_id(&connection.user_id).await?.ok_or_else(|| {
                Error::Internal(format!(
                    "social connection {} references missing user {}",
                    connection.id, connection.user_id
                ))
            });
        }

        let user = match self.users.find_by_email(&profile.email).await? {
            Some(user) => user,
            None => self.create_user(profile).await?,
        };

        self.connections
            .insert(SocialConnection::link(profile, &user.id))
            .await?;
        tracing::info!(
            user_id = %user.id,
            provider = %profile.provider,
            "linked social identity"
        );
        Ok(user)
    }

    async fn create_user(&self, profile: &SocialProfile) -> Result<User> {
        let new = User::new(NewUser {
            email: profile.email.clone(),
            name: profile.name.clone(),
            picture: profile.picture.clone(),
            provider: profile.provider.clone(),
            provider_id: profile.provider_id.clone(),
        });
        match self.users.insert(new).await {
            Ok(user) => Ok(user),
            // Lost a race with a concurrent first login for the same email.
            Err(Error::Conflict(_)) => self
                .users
                .find_by_email(&profile.email)
                .await?
                .ok_or_else(|| Error::Internal("user vanished after conflict".to_string())),
            Err(e) => Err(e),
        }
    }

    pub fn login(&self, user: &User) -> Result<LoginResult> {
        Ok(LoginResult {
            access_token: self.tokens.issue(user)?,
            user: UserProfile::from(user),
        })
    }

    /// Verify a session token and load its user.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.tokens.verify(token)?;
        self.users
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| Error::Unauthorized(UNKNOWN_USER.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvass_core::InMemoryStore;

    fn service() -> AuthService {
        let repos = InMemoryStore::repositories();
        AuthService::new(repos.users, repos.connections, TokenCodec::new("secret", 3600))
    }

    #[tokio::test]
    async fn social_login_is_idempotent() {
        let auth = service();
        let profile = SocialProfile::google("g-1", "ann@example.com", Some("Ann"));
        let first = auth.validate_social_user(&profile).await.unwrap();
        let again = auth.validate_social_user(&profile).await.unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(first.provider, "google");
    }

    #[tokio::test]
    async fn new_provider_links_to_existing_email() {
        let auth = service();
        let google = SocialProfile::google("g-1", "ann@example.com", Some("Ann"));
        let user = auth.validate_social_user(&google).await.unwrap();

        let other = SocialProfile {
            provider: "github".into(),
            provider_id: "gh-9".into(),
            ..google.clone()
        };
        let linked = auth.validate_social_user(&other).await.unwrap();
        assert_eq!(linked.id, user.id);
        assert!(auth
            .connections
            .find_by_provider("github", "gh-9")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn login_token_authenticates() {
        let auth = service();
        let user = auth
            .validate_social_user(&SocialProfile::google("g-2", "bo@example.com", None))
            .await
            .unwrap();
        let login = auth.login(&user).unwrap();
        assert_eq!(login.user.email, "bo@example.com");

        let claims = auth.tokens().verify(&login.access_token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(auth.authenticate(&login.access_token).await.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn bad_tokens_are_unauthorized() {
        let auth = service();
        let user = auth
            .validate_social_user(&SocialProfile::google("g-3", "cy@example.com", None))
            .await
            .unwrap();

        let expired = auth
            .tokens()
            .issue_at(&user, chrono::Utc::now().timestamp() - 100_000)
            .unwrap();
        let forged = TokenCodec::new("other-secret", 3600).issue(&user).unwrap();

        for token in [expired.as_str(), forged.as_str(), "not-a-jwt"] {
            assert!(matches!(
                auth.authenticate(token).await,
                Err(Error::Unauthorized(_))
            ));
        }
    }

    #[tokio::test]
    async fn token_for_deleted_user_is_unauthorized() {
        let auth = service();
        let ghost = User::new(NewUser {
            email: "ghost@example.com".into(),
            name: None,
            picture: None,
            provider: "google".into(),
            provider_id: "g-0".into(),
        });
        let token = auth.tokens().issue(&ghost).unwrap();
        assert!(matches!(
            auth.authenticate(&token).await,
            Err(Error::Unauthorized(m)) if m == UNKNOWN_USER
        ));
    }
}
