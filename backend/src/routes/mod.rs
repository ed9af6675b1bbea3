//! Route definitions for the Compost Monitoring Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/auth/me", get(handlers::me))
        .route("/stats", get(handlers::get_stats))
        // Protected routes - sites and composters
        .nest("/sites", site_routes())
        .nest("/composters", composter_routes())
        .nest("/readings", reading_routes())
        .nest("/norms", norm_routes())
        // Protected routes - administration
        .nest("/admin", admin_routes())
        // Protected routes - notifications
        .nest("/notifications", notification_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        .merge(protected)
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
}

/// Site routes
fn site_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sites).post(handlers::create_site))
        .route("/:id", axum::routing::delete(handlers::delete_site))
}

/// Composter routes, with their readings and report
fn composter_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_composter))
        .route(
            "/:id",
            get(handlers::get_composter).delete(handlers::delete_composter),
        )
        .route("/:id/readings", post(handlers::create_reading))
        .route("/:id/report", get(handlers::get_report))
}

/// Reading correction routes
fn reading_routes() -> Router<AppState> {
    Router::new().route(
        "/:id",
        put(handlers::update_reading).delete(handlers::delete_reading),
    )
}

/// Norm routes.
///
/// `GET /:id` takes a composter id, `PUT /:id` a norm id.
fn norm_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_norm))
        .route("/:id", get(handlers::get_norm).put(handlers::update_norm))
}

/// Administration routes
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::list_users))
        .route("/composters", get(handlers::list_managed_composters))
        .route("/users/:id/assignments", put(handlers::update_assignments))
        .route("/users/:id/role", put(handlers::update_role))
}

/// Notification routes
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_notifications))
        .route("/unread-count", get(handlers::unread_count))
        .route("/:id/read", post(handlers::mark_notification_read))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::models::Role;
    use crate::services::auth::encode_token;

    // The pool is lazy: these requests are rejected before any query runs
    fn test_app() -> (Router, Arc<Config>) {
        let config = Arc::new(Config::for_tests());
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .expect("lazy pool");
        let state = AppState {
            db,
            config: config.clone(),
        };

        let app = Router::new()
            .nest("/api/v1", api_routes(state.clone()))
            .with_state(state);
        (app, config)
    }

    fn bearer(config: &Config, role: Role) -> String {
        let token = encode_token(uuid::Uuid::new_v4(), role, &config.jwt.secret, 3600).unwrap();
        format!("Bearer {}", token)
    }

    #[tokio::test]
    async fn test_protected_route_requires_session() {
        let (app, _) = test_app();

        let response = app
            .oneshot(Request::get("/api/v1/sites").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_forged_token_is_rejected() {
        let (app, _) = test_app();
        let token = encode_token(uuid::Uuid::new_v4(), Role::Admin, "wrong-secret", 3600).unwrap();

        let response = app
            .oneshot(
                Request::get("/api/v1/admin/users")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_client_cannot_manage_users() {
        let (app, config) = test_app();

        let response = app
            .oneshot(
                Request::get("/api/v1/admin/users")
                    .header(header::AUTHORIZATION, bearer(&config, Role::Client))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_client_cannot_record_readings() {
        let (app, config) = test_app();
        let uri = format!("/api/v1/composters/{}/readings", uuid::Uuid::new_v4());

        let response = app
            .oneshot(
                Request::post(uri)
                    .header(header::AUTHORIZATION, bearer(&config, Role::Client))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"temperature":"55"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_supervisor_cannot_create_norms() {
        let (app, config) = test_app();
        let body = format!(r#"{{"composter_id":"{}"}}"#, uuid::Uuid::new_v4());

        let response = app
            .oneshot(
                Request::post("/api/v1/norms")
                    .header(header::AUTHORIZATION, bearer(&config, Role::Supervisor))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_session_cookie_is_accepted() {
        let (app, config) = test_app();
        let token = encode_token(uuid::Uuid::new_v4(), Role::Client, &config.jwt.secret, 3600).unwrap();

        // Authenticated, then stopped by the role check before the database
        let response = app
            .oneshot(
                Request::delete(format!("/api/v1/sites/{}", uuid::Uuid::new_v4()))
                    .header(header::COOKIE, format!("{}={}", config.session.cookie_name, token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
