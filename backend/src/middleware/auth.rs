//! Authentication middleware
//!
//! Session token authentication and role-based access control

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::auth::decode_token;
use crate::AppState;
use shared::models::{Action, Role};

/// Authenticated user information extracted from the session token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthUser {
    /// Fail with a permission error unless the role grants `action`
    pub fn require(&self, action: Action) -> AppResult<()> {
        authorize(self.role, action)
    }
}

/// Pure permission gate shared by every handler
pub fn authorize(role: Role, action: Action) -> AppResult<()> {
    if role.can(action) {
        Ok(())
    } else {
        Err(AppError::InsufficientPermissions)
    }
}

/// Pull the session token from the Authorization header, falling back to the session cookie
fn extract_token(request: &Request, jar: &CookieJar, cookie_name: &str) -> Option<String> {
    let bearer = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    bearer.or_else(|| jar.get(cookie_name).map(|c| c.value().to_string()))
}

/// Authentication middleware that validates session tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_token(&request, &jar, &state.config.session.cookie_name) {
        Some(token) => token,
        None => {
            return AppError::Unauthorized {
                message: "Authentication required".to_string(),
                message_fr: "Connexion requise".to_string(),
            }
            .into_response();
        }
    };

    let claims = match decode_token(&token, &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(err) => return err.into_response(),
    };

    let user_id = match Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return AppError::InvalidToken.into_response(),
    };

    let role = match Role::parse(&claims.role) {
        Some(role) => role,
        None => return AppError::InvalidToken.into_response(),
    };

    request.extensions_mut().insert(AuthUser { user_id, role });

    next.run(request).await
}

/// Extractor for authenticated user
/// Use this in handlers to get the current user
#[derive(Clone, Debug)]
pub struct CurrentUser(pub AuthUser);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| AppError::Unauthorized {
                message: "Authentication required".to_string(),
                message_fr: "Connexion requise".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum_extra::extract::cookie::Cookie;

    #[test]
    fn test_authorize_follows_capability_table() {
        assert!(authorize(Role::Admin, Action::ManageNorms).is_ok());
        assert!(authorize(Role::Supervisor, Action::RecordReading).is_ok());
        assert!(matches!(
            authorize(Role::Client, Action::RecordReading),
            Err(AppError::InsufficientPermissions)
        ));
    }

    #[test]
    fn test_bearer_token_wins_over_cookie() {
        let request = axum::http::Request::builder()
            .header(AUTHORIZATION, "Bearer header-token")
            .body(Body::empty())
            .unwrap();
        let jar = CookieJar::new().add(Cookie::new("compost_session", "cookie-token"));

        assert_eq!(
            extract_token(&request, &jar, "compost_session").as_deref(),
            Some("header-token")
        );
    }

    #[test]
    fn test_cookie_token_used_without_header() {
        let request = axum::http::Request::builder().body(Body::empty()).unwrap();
        let jar = CookieJar::new().add(Cookie::new("compost_session", "cookie-token"));

        assert_eq!(
            extract_token(&request, &jar, "compost_session").as_deref(),
            Some("cookie-token")
        );
        assert_eq!(extract_token(&request, &CookieJar::new(), "compost_session"), None);
    }
}
