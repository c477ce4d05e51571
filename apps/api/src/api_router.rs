use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;
use warden_core::AppError;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

use cors::build_cors_layer;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route(
            "/api/auth/sign-out",
            post(handlers::auth::sign_out_handler),
        )
        .route(
            "/api/auth/sign-out-everywhere",
            post(handlers::auth::sign_out_everywhere_handler),
        )
        .route(
            "/api/permissions",
            get(handlers::permissions::list_permission_catalog_handler),
        )
        .route(
            "/api/me/permissions",
            get(handlers::permissions::list_my_permissions_handler),
        )
        .route(
            "/api/me/permissions/{name}",
            get(handlers::permissions::check_my_permission_handler),
        )
        .route(
            "/api/roles/{role_id}/permissions",
            put(handlers::security::set_role_permissions_handler),
        )
        .route(
            "/api/users/{user_id}/permissions",
            put(handlers::security::set_user_permissions_handler),
        )
        .route(
            "/api/users/{user_id}/roles",
            put(handlers::security::set_user_roles_handler),
        )
        .route(
            "/api/users/{user_id}/sign-out",
            post(handlers::security::force_sign_out_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_bearer_token,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/api/auth/refresh",
            post(handlers::auth::refresh_token_handler),
        )
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
