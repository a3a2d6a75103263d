// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, patch, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    config::MAX_PROFILE_IMAGE_BYTES,
    handlers::{admin, auth, profile, question, quiz},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, catalog, quiz, profile, admin).
/// * Serves uploaded media under `/media`.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let question_routes = Router::new()
        .route("/genre/{size}", get(question::genre_questions))
        .route("/speed", get(question::speed_questions))
        // Protected: handlers take `AuthUser`
        .route("/random-explanations", get(question::random_explanations))
        .route("/recommended", get(question::recommended_questions))
        .route("/{id}/details", get(question::question_details));

    let quiz_routes = Router::new()
        .route("/submit", post(quiz::submit_quiz))
        .route("/wrong-note-submit", post(quiz::submit_wrong_note))
        .route("/ranking", get(quiz::get_ranking))
        .route("/sessions", get(quiz::list_sessions))
        .route("/results", get(quiz::list_results))
        .route("/results/wrong", get(quiz::list_wrong_results))
        .route("/results/summary", get(quiz::genre_summary));

    let profile_routes = Router::new()
        .route("/api/profile", get(profile::get_profile))
        .route("/api/profile/nickname", patch(profile::update_nickname))
        .route("/api/profile/interests", patch(profile::update_interests))
        .route("/api/profile/password", patch(profile::change_password))
        .route(
            "/api/profile/image",
            post(profile::upload_profile_image)
                .layer(DefaultBodyLimit::max(MAX_PROFILE_IMAGE_BYTES + 64 * 1024)),
        );

    let admin_routes = Router::new()
        .route("/genres", post(admin::create_genre))
        .route("/questions/import", post(admin::import_questions))
        .route("/questions/{id}", delete(admin::delete_question))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let media = ServeDir::new(&state.config.media_root);

    Router::new()
        .nest("/api/auth", auth_routes)
        .route("/api/genres", get(question::list_genres))
        .route("/api/daily-facts", get(question::daily_facts))
        .nest("/api/questions", question_routes)
        .nest("/api/quiz", quiz_routes)
        .merge(profile_routes)
        .nest("/api/admin", admin_routes)
        .nest_service("/media", media)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
