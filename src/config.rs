use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use tower_http::trace::TraceLayer;

use crate::{
    auth::{
        Profile, Role,
        login::{do_login, do_logout, login_page},
        register::{do_register, register_page},
    },
    feedback::{
        acknowledge::do_acknowledge_response,
        respond::{do_delete_response, do_submit_response, respond_page},
        submit::{do_submit_feedback, submit_feedback_page},
        view::{admin_dashboard, trainee_dashboard},
    },
    state::{AppState, DbPool},
    util_resp::{StandardResponse, see_other_ok, unauthorized},
};

pub async fn home(user: Option<Profile>) -> StandardResponse {
    match user {
        None => see_other_ok(Redirect::to("/login")),
        Some(profile) => match Role::parse(&profile.role) {
            Some(Role::Trainee) => see_other_ok(Redirect::to("/feedback")),
            Some(Role::Admin) => see_other_ok(Redirect::to("/admin")),
            None => unauthorized(),
        },
    }
}

pub fn create_app(pool: DbPool) -> Router {
    let key = if let Ok(secret) = std::env::var("SECRET_KEY") {
        Key::from(secret.as_bytes())
    } else if cfg!(test) {
        Key::from("0".repeat(64).as_bytes())
    } else {
        Key::generate()
    };

    let state = AppState { pool, key };

    Router::new()
        .route("/", get(home))
        .route("/login", get(login_page).post(do_login))
        .route("/register", get(register_page).post(do_register))
        .route("/logout", post(do_logout))
        .route("/feedback", get(trainee_dashboard).post(do_submit_feedback))
        .route("/feedback/new", get(submit_feedback_page))
        .route("/admin", get(admin_dashboard))
        .route(
            "/admin/feedback/:feedback_id/respond",
            get(respond_page).post(do_submit_response),
        )
        .route(
            "/admin/responses/:response_id/delete",
            post(do_delete_response),
        )
        .route(
            "/responses/:response_id/acknowledge",
            post(do_acknowledge_response),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
