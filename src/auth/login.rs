use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
    extract::{Form, Query},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use diesel::prelude::*;
use hypertext::prelude::*;
use serde::Deserialize;
use url::Url;

use crate::{
    auth::{Profile, clear_login_cookie, set_login_cookie},
    schema::profiles,
    state::Conn,
    template::Page,
    util_resp::{StandardResponse, success},
    widgets::alert::ErrorAlert,
};

pub async fn login_page(user: Option<Profile>) -> StandardResponse {
    if user.is_some() {
        return success(
            Page::new()
                .user_opt(user)
                .body(maud! {
                    ErrorAlert
                        msg = "You are already logged in, so cannot log in!";
                })
                .render(),
        );
    }

    success(
        Page::new()
            .body(maud! {
                h1 { "Sign in" }
                form method="post" class="mt-4" {
                    div class="mb-3" {
                        label for="email" class="form-label" { "Email address" }
                        input type="email" class="form-control" id="email" name="email" placeholder="you@example.com";
                    }
                    div class="mb-3" {
                        label for="password" class="form-label" { "Password" }
                        input type="password" class="form-control" id="password" name="password";
                    }
                    button type="submit" class="btn btn-primary" { "Sign in" }
                }
                div class="mt-3" {
                    a href="/register" { "Don't have an account? Sign up" }
                }
            })
            .render(),
    )
}

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

#[derive(Deserialize)]
pub struct LoginQuery {
    next: Option<String>,
}

pub enum LoginResponse {
    TryAgain(Rendered<String>),
    Success(Box<(PrivateCookieJar, Redirect)>),
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        match self {
            LoginResponse::TryAgain(html) => (
                axum::http::StatusCode::BAD_REQUEST,
                axum::response::Html(html.into_inner()),
            )
                .into_response(),
            LoginResponse::Success(parts) => (*parts).into_response(),
        }
    }
}

pub async fn do_login(
    user: Option<Profile>,
    Query(query): Query<LoginQuery>,
    mut conn: Conn,
    jar: PrivateCookieJar,
    Form(form): Form<LoginForm>,
) -> LoginResponse {
    let profile = match profiles::table
        .filter(profiles::email.eq(&form.email))
        .first::<Profile>(&mut *conn)
        .optional()
        .unwrap()
    {
        Some(profile) => profile,
        None => {
            return LoginResponse::TryAgain(
                Page::new()
                    .user_opt(user)
                    .body(maud! {
                        ErrorAlert
                            msg = "No such account exists. Please return to
                                   the previous page and try again.";
                    })
                    .render(),
            );
        }
    };

    let parsed_hash = PasswordHash::new(&profile.password_hash).unwrap();
    if Argon2::default()
        .verify_password(form.password.as_bytes(), &parsed_hash)
        .is_err()
    {
        // todo: password rate limiting
        return LoginResponse::TryAgain(
            Page::new()
                .user_opt(user)
                .body(maud! {
                    ErrorAlert msg =
                        "Incorrect password. Please return to the previous
                         page and try again.";
                })
                .render(),
        );
    }

    let jar = set_login_cookie(profile.id, jar);

    let redirect_to = if let Some(url) =
        query.next.and_then(|url| url.parse::<Url>().ok())
    {
        url.path().to_string()
    } else {
        "/".to_string()
    };

    LoginResponse::Success(Box::new((jar, Redirect::to(&redirect_to))))
}

pub async fn do_logout(jar: PrivateCookieJar) -> (PrivateCookieJar, Redirect) {
    (clear_login_cookie(jar), Redirect::to("/login"))
}
