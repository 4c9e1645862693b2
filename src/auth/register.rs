use argon2::Argon2;
use argon2::PasswordHasher;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use axum::{
    extract::Form,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::PrivateCookieJar;
use chrono::Utc;
use diesel::{insert_into, prelude::*};
use hypertext::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use crate::validation::is_valid_email;
use crate::{
    auth::{Profile, Role, set_login_cookie},
    schema::profiles,
    state::Conn,
    template::Page,
    widgets::alert::ErrorAlert,
};

pub enum RegisterResponse {
    TryAgain(Rendered<String>),
    AlreadyLoggedIn(Redirect),
    Success(Box<(PrivateCookieJar, Redirect)>),
}

impl IntoResponse for RegisterResponse {
    fn into_response(self) -> Response {
        match self {
            RegisterResponse::TryAgain(html) => {
                axum::response::Html(html.into_inner()).into_response()
            }
            RegisterResponse::AlreadyLoggedIn(redirect) => {
                redirect.into_response()
            }
            RegisterResponse::Success(parts) => (*parts).into_response(),
        }
    }
}

pub async fn register_page(user: Option<Profile>) -> RegisterResponse {
    if user.is_some() {
        // todo: flash message
        return RegisterResponse::AlreadyLoggedIn(Redirect::to("/"));
    }

    RegisterResponse::TryAgain(
        Page::new()
            .body(maud! {
                h1 { "Create account" }
                form method="post" class="mt-4" {
                    div class="mb-3" {
                        label for="full_name" class="form-label" { "Full name" }
                        input type="text" class="form-control" id="full_name" name="full_name" placeholder="John Doe";
                    }
                    div class="mb-3" {
                        label for="email" class="form-label" { "Email" }
                        input type="email" class="form-control" id="email" name="email" placeholder="you@example.com";
                    }
                    div class="mb-3" {
                        label class="form-label" { "Role" }
                        div class="form-check" {
                            input class="form-check-input" type="radio" name="role" id="role_trainee" value="trainee" checked;
                            label class="form-check-label" for="role_trainee" {
                                "Trainee: submit feedback and review responses"
                            }
                        }
                        div class="form-check" {
                            input class="form-check-input" type="radio" name="role" id="role_admin" value="admin";
                            label class="form-check-label" for="role_admin" {
                                "Admin: respond to trainee feedback"
                            }
                        }
                    }
                    div class="mb-3" {
                        label for="password" class="form-label" { "Password" }
                        input type="password" class="form-control" id="password" name="password";
                    }
                    div class="mb-3" {
                        label for="password2" class="form-label" { "Confirm Password" }
                        input type="password" class="form-control" id="password2" name="password2";
                    }
                    button type="submit" class="btn btn-primary" { "Register" }
                }
            })
            .render(),
    )
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub password: String,
    pub password2: String,
}

fn try_again(msg: &str) -> RegisterResponse {
    RegisterResponse::TryAgain(
        Page::new()
            .body(maud! {
                ErrorAlert msg = (msg);
            })
            .render(),
    )
}

pub async fn do_register(
    user: Option<Profile>,
    mut conn: Conn,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> RegisterResponse {
    if user.is_some() {
        // todo: flash message
        return RegisterResponse::AlreadyLoggedIn(Redirect::to("/"));
    }

    if form.full_name.trim().is_empty() {
        return try_again("Please provide your full name.");
    }
    if let Err(e) = is_valid_email(&form.email) {
        return try_again(&e);
    }
    if Role::parse(&form.role).is_none() {
        return try_again("Please pick one of the two roles.");
    }
    if !Profile::validate_password(&form.password) {
        return try_again("Passwords must be longer than 6 characters.");
    }
    if form.password != form.password2 {
        return try_again("The two passwords do not match.");
    }

    let existing = profiles::table
        .filter(profiles::email.eq(&form.email))
        .first::<Profile>(&mut *conn)
        .optional()
        .unwrap();

    if existing.is_some() {
        return try_again(
            "That email is already taken. Please return to the previous
             page and try again.",
        );
    }

    let salt = SaltString::generate(&mut OsRng);

    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(form.password.as_bytes(), &salt)
        .unwrap()
        .to_string();

    let id = Uuid::now_v7().to_string();

    insert_into(profiles::table)
        .values((
            profiles::id.eq(&id),
            profiles::full_name.eq(form.full_name.trim()),
            profiles::email.eq(&form.email),
            profiles::role.eq(&form.role),
            profiles::password_hash.eq(password_hash),
            profiles::created_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut *conn)
        .unwrap();

    let jar = set_login_cookie(id, jar);

    RegisterResponse::Success(Box::new((jar, Redirect::to("/"))))
}
