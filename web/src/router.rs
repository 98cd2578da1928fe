//! Router assembly.

use crate::handlers::{health_check, todos, users};
use crate::middleware::correlation_id_layer;
use crate::repository::Repository;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the complete router with its middleware.
///
/// Layers, outermost first: correlation id, HTTP tracing, permissive CORS.
pub fn build_router<R: Repository>(state: AppState<R>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/users/register", post(users::register::<R>))
        .route("/users/login", post(users::login::<R>))
        .route("/users/update", put(users::update_user::<R>))
        .route("/users/delete", delete(users::delete_user::<R>))
        .route("/users/:id", get(users::get_user::<R>))
        .route(
            "/todos",
            post(todos::create_todo::<R>)
                .get(todos::list_todos::<R>)
                .delete(todos::delete_all_todos::<R>),
        )
        .route(
            "/todos/:id",
            get(todos::get_todo::<R>)
                .put(todos::update_todo::<R>)
                .delete(todos::delete_todo::<R>),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(correlation_id_layer())
        .with_state(state)
}
