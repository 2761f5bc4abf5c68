use axum::{Router, middleware, routing::post};
use tower_http::trace::TraceLayer;

use crate::{
    handlers::{auth, middleware::require_session, roles, users},
    infra::app_state::AppState,
};

pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/user/checkRole", post(users::check_role))
        .route("/user/roles", post(users::list_roles))
        .route("/auth/logout", post(auth::logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    Router::new()
        .route("/user/create", post(users::create_user))
        .route("/user/delete", post(users::delete_user))
        .route("/user/addRole", post(users::add_role))
        .route("/role/create", post(roles::create_role))
        .route("/role/delete", post(roles::delete_role))
        .route("/auth/token", post(auth::issue_token))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
