//! Authentication handlers
//!
//! Sessions are carried by a JWT returned in the body and mirrored in an
//! HttpOnly cookie for the browser front-end.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::User;
use crate::services::auth::{AuthSession, SignupInput};
use crate::services::AuthService;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub logged_out: bool,
}

fn session_cookie(session: &SessionConfig, token: String) -> Cookie<'static> {
    Cookie::build((session.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(session.secure)
        .build()
}

/// Signup endpoint handler
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SignupInput>,
) -> AppResult<(StatusCode, CookieJar, Json<AuthSession>)> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let session = auth_service.signup(body).await?;

    let jar = jar.add(session_cookie(&state.config.session, session.access_token.clone()));
    Ok((StatusCode::CREATED, jar, Json(session)))
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<AuthSession>)> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let session = auth_service.login(&body.email, &body.password).await?;

    let jar = jar.add(session_cookie(&state.config.session, session.access_token.clone()));
    Ok((jar, Json(session)))
}

/// Current user endpoint handler
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<User>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let user = auth_service.current_user(user.user_id).await?;
    Ok(Json(user))
}

/// Logout endpoint handler
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    let jar = jar.remove(Cookie::build((state.config.session.cookie_name.clone(), "")).path("/"));
    (jar, Json(LogoutResponse { logged_out: true }))
}
