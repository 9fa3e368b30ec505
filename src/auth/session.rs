use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use super::claims::SessionClaims;
use super::repo_types::{SessionRecord, User};
use super::services;
use crate::{config::SessionConfig, error::ApiError, state::AppState};

/// Signing keys and cookie policy for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub idle_ttl: Duration,
    pub max_ttl: Duration,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        let SessionConfig {
            secret,
            issuer,
            audience,
            cookie_name,
            cookie_secure,
            idle_minutes,
            max_minutes,
        } = state.config.session.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            cookie_name,
            cookie_secure,
            idle_ttl: Duration::minutes(idle_minutes),
            max_ttl: Duration::minutes(max_minutes),
        }
    }
}

impl SessionKeys {
    pub fn sign(&self, session: &SessionRecord) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + self.max_ttl;
        let claims = SessionClaims {
            sid: session.id,
            uid: session.user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = session.user_id, session_id = %session.id, "session token signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<SessionClaims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<SessionClaims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }

    /// Idle deadline for a session used at `now`.
    pub fn idle_deadline(&self, now: OffsetDateTime) -> OffsetDateTime {
        now + self.idle_ttl
    }

    pub fn token_from(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.cookie_name)
            .map(|c| c.value().to_owned())
            .filter(|v| !v.is_empty())
    }

    pub fn cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.cookie_secure)
            .max_age(self.max_ttl)
            .build()
    }

    /// Cookie matching [`SessionKeys::cookie`] for `CookieJar::remove`.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), ""))
            .path("/")
            .build()
    }
}

/// The authenticated caller, resolved from the session cookie.
pub struct SessionUser {
    pub user: User,
    pub session_id: Uuid,
}

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let Some(token) = keys.token_from(&jar) else {
            debug!("no session cookie");
            return Err(ApiError::Unauthorized);
        };

        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "rejected session token");
            ApiError::Unauthorized
        })?;

        let user = services::resume_session(state.store.as_ref(), &keys, &claims).await?;
        Ok(SessionUser {
            user,
            session_id: claims.sid,
        })
    }
}
