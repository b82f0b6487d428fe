// src/routes.rs

use std::sync::Arc;

use axum::{
    Router, http::Method, middleware,
    routing::{delete, get, post, put},
};
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, blog, contact, course, enroll, quiz, user},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Public surface: blog listing and the two passcode login flows (rate
///   limited per client IP).
/// * Authenticated surface: catalog reads, enrollment, quiz submission,
///   contact form.
/// * Admin surface: catalog/blog/quiz management and the user/roster
///   listings, behind auth + role check.
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://localhost:5173".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    // Throttle the passcode endpoints; they send email.
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(5)
            .finish()
            .unwrap(),
    );

    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/verify-otp", post(auth::verify_otp))
        .route("/send-otp", post(auth::send_otp))
        .route("/login", post(auth::login))
        .route("/reset-password", post(auth::reset_password))
        .layer(GovernorLayer::new(governor_conf.clone()));

    let admin_auth_routes = Router::new()
        .route("/send-otp", post(admin::send_otp))
        .route("/verify-otp", post(admin::verify_otp))
        .layer(GovernorLayer::new(governor_conf));

    let course_routes = Router::new()
        .route("/", get(course::list_courses))
        .route("/{id}", get(course::get_course))
        .route(
            "/{course_id}/sections/{section_id}/quiz",
            get(quiz::get_quiz),
        )
        .route(
            "/{course_id}/sections/{section_id}/quiz/submit",
            post(quiz::submit_quiz),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let enroll_routes = Router::new()
        .route("/", post(enroll::enroll))
        .route("/unenroll", post(enroll::unenroll))
        .route("/enrollments", get(enroll::list_enrollments))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let contact_routes = Router::new()
        .route("/", post(contact::create_contact))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let blog_routes = Router::new().route("/", get(blog::list_blogs));

    let admin_resource_routes = Router::new()
        .route("/courses", post(course::create_course))
        .route("/courses/{id}", delete(course::delete_course))
        .route("/courses/{id}/learn", put(course::update_learn))
        .route("/courses/{id}/enrollments", get(enroll::course_roster))
        .route(
            "/courses/{course_id}/sections/{section_id}/quiz",
            post(quiz::replace_quiz),
        )
        .route("/blogs", post(blog::create_blog))
        .route("/blogs/{id}", delete(blog::delete_blog))
        .route("/contacts", get(contact::list_contacts))
        .route("/users", get(user::list_users))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .nest("/auth", admin_auth_routes)
        .merge(admin_resource_routes);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/courses", course_routes)
        .nest("/api/enroll", enroll_routes)
        .nest("/api/blogs", blog_routes)
        .nest("/api/contact", contact_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
