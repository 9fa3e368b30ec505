use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginRequest, PublicUser, SignupRequest},
        services,
        session::{SessionKeys, SessionUser},
    },
    error::{ApiResult, AppJson},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/check_session", get(check_session))
        .route("/logout", delete(logout))
}

#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<SignupRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<PublicUser>)> {
    let store = state.store.as_ref();
    let keys = SessionKeys::from_ref(&state);

    let user = services::sign_up(store, payload).await?;
    services::revoke_presented(store, &keys, &jar).await;
    let token = services::start_session(store, &keys, user.id).await?;

    info!(user_id = user.id, username = %user.username, "user signed up");
    Ok((StatusCode::CREATED, jar.add(keys.cookie(token)), Json(user.into())))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> ApiResult<(StatusCode, CookieJar, Json<PublicUser>)> {
    let store = state.store.as_ref();
    let keys = SessionKeys::from_ref(&state);

    let user = services::log_in(store, payload).await?;
    services::revoke_presented(store, &keys, &jar).await;
    let token = services::start_session(store, &keys, user.id).await?;

    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok((StatusCode::OK, jar.add(keys.cookie(token)), Json(user.into())))
}

#[instrument(skip_all)]
pub async fn check_session(session: SessionUser) -> Json<PublicUser> {
    Json(session.user.into())
}

/// Ends the caller's session. Answers 204 rather than reusing 401 for success.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    session: SessionUser,
) -> ApiResult<(StatusCode, CookieJar)> {
    let keys = SessionKeys::from_ref(&state);
    services::end_session(state.store.as_ref(), session.session_id).await?;

    info!(user_id = session.user.id, session_id = %session.session_id, "user logged out");
    Ok((StatusCode::NO_CONTENT, jar.remove(keys.removal_cookie())))
}
