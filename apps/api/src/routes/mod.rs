pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_handler))
        // Auth API
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        // Resume API
        .route("/api/resumes/upload", post(resumes::upload_resumes))
        .route("/api/resumes", get(resumes::list_resumes))
        .route(
            "/api/resumes/:id",
            get(resumes::get_resume).delete(resumes::delete_resume),
        )
        .route("/api/resumes/batch/delete", post(resumes::delete_batch))
        .route("/api/resumes/clear-all", delete(resumes::clear_all))
        .with_state(state)
}
