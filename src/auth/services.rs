use axum_extra::extract::cookie::CookieJar;
use lazy_static::lazy_static;
use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

use super::claims::SessionClaims;
use super::dto::{LoginRequest, SignupRequest};
use super::password::HashedPassword;
use super::repo_types::{NewUser, User};
use super::session::SessionKeys;
use crate::db::{Store, StoreError};
use crate::error::{ApiError, ApiResult};

const DUPLICATE_USERNAME: &str = "Username already exists";

lazy_static! {
    /// Checked against when the username is unknown, so that path also pays for one argon2 run.
    static ref DUMMY_PASSWORD: Option<HashedPassword> =
        HashedPassword::new("recipebox-unknown-user").ok();
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Validates and stores a new user.
pub async fn sign_up(store: &dyn Store, req: SignupRequest) -> ApiResult<User> {
    let username = present(req.username.as_deref().map(str::trim));
    let password = present(req.password.as_deref());
    let (Some(username), Some(password)) = (username, password) else {
        return Err(ApiError::Validation("Username and password are required".into()));
    };

    if store.find_user_by_username(username).await?.is_some() {
        warn!(%username, "username already registered");
        return Err(ApiError::Conflict(DUPLICATE_USERNAME.into()));
    }

    let new = NewUser {
        username: username.to_owned(),
        password: HashedPassword::new(password)?,
        image_url: req.image_url,
        bio: req.bio,
    };

    match store.create_user(new).await {
        Ok(user) => Ok(user),
        // lost a race with a concurrent signup
        Err(StoreError::Conflict) => {
            warn!(%username, "username taken during insert");
            Err(ApiError::Conflict(DUPLICATE_USERNAME.into()))
        }
        Err(StoreError::Other(e)) => Err(e.into()),
    }
}

/// Checks credentials. Every failure maps to the same error.
pub async fn log_in(store: &dyn Store, req: LoginRequest) -> ApiResult<User> {
    let (Some(username), Some(password)) =
        (req.username.as_deref().map(str::trim), req.password.as_deref())
    else {
        warn!("login with missing credentials");
        return Err(ApiError::InvalidCredentials);
    };

    let Some(user) = store.find_user_by_username(username).await? else {
        if let Some(dummy) = DUMMY_PASSWORD.as_ref() {
            let _ = dummy.verify(password);
        }
        warn!(%username, "login unknown username");
        return Err(ApiError::InvalidCredentials);
    };

    if !user.password.verify(password)? {
        warn!(%username, user_id = user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    Ok(user)
}

/// Creates a session row for `user_id` and returns the signed cookie token.
pub async fn start_session(
    store: &dyn Store,
    keys: &SessionKeys,
    user_id: i64,
) -> ApiResult<String> {
    let expires_at = keys.idle_deadline(OffsetDateTime::now_utc());
    let session = store.create_session(user_id, expires_at).await?;
    Ok(keys.sign(&session)?)
}

/// Resolves verified claims to the session's user, sliding the idle deadline forward.
pub async fn resume_session(
    store: &dyn Store,
    keys: &SessionKeys,
    claims: &SessionClaims,
) -> ApiResult<User> {
    let now = OffsetDateTime::now_utc();

    let Some(session) = store.find_session(claims.sid).await? else {
        debug!(session_id = %claims.sid, "session not found");
        return Err(ApiError::Unauthorized);
    };

    if session.user_id != claims.uid {
        warn!(session_id = %session.id, "session token user mismatch");
        return Err(ApiError::Unauthorized);
    }

    if session.is_expired(now) {
        debug!(session_id = %session.id, "session expired");
        store.delete_session(session.id).await?;
        return Err(ApiError::Unauthorized);
    }

    let Some(user) = store.find_user_by_id(session.user_id).await? else {
        warn!(
            session_id = %session.id,
            user_id = session.user_id,
            "session references missing user"
        );
        store.delete_session(session.id).await?;
        return Err(ApiError::Unauthorized);
    };

    store.touch_session(session.id, keys.idle_deadline(now)).await?;
    Ok(user)
}

pub async fn end_session(store: &dyn Store, session_id: Uuid) -> ApiResult<()> {
    if !store.delete_session(session_id).await? {
        // already gone, e.g. a concurrent logout
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

/// Best-effort removal of the session carried by `jar`, used when a new one replaces it.
pub async fn revoke_presented(store: &dyn Store, keys: &SessionKeys, jar: &CookieJar) {
    let Some(claims) = keys.token_from(jar).and_then(|t| keys.verify(&t).ok()) else {
        return;
    };
    if let Err(e) = store.delete_session(claims.sid).await {
        warn!(error = %e, session_id = %claims.sid, "failed to revoke previous session");
    }
}
