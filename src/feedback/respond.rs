use axum::{
    extract::{Form, Path},
    response::Redirect,
};
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    auth::Profile,
    feedback::{Feedback, access},
    permission::IsAdmin,
    state::Conn,
    template::Page,
    util_resp::{StandardResponse, see_other_ok, success},
    widgets::alert::ErrorAlert,
};

pub async fn respond_page(
    Path(feedback_id): Path<String>,
    IsAdmin(user): IsAdmin,
    mut conn: Conn,
) -> StandardResponse {
    let feedback = Feedback::fetch(&feedback_id, &mut *conn)?;

    if feedback.response(&mut *conn).is_some() {
        return success(
            Page::new()
                .user(user)
                .body(maud! {
                    ErrorAlert
                        msg = "This feedback item already has a response.";
                    a href="/admin" { "Back to dashboard" }
                })
                .render(),
        );
    }

    success(
        Page::new()
            .user(user)
            .body(maud! {
                h1 { "Respond to: " (feedback.title) }
                p class="text-muted" { (feedback.description) }
                form method="post" class="mt-4" {
                    div class="mb-3" {
                        label for="response_text" class="form-label" { "Response" }
                        textarea class="form-control"
                                 id="response_text"
                                 name="response_text"
                                 rows="5"
                                 placeholder="Write your response to the trainee..."
                                 required {}
                    }
                    button type="submit" class="btn btn-primary" {
                        "Send Response"
                    }
                }
            })
            .render(),
    )
}

#[derive(Deserialize)]
pub struct ResponseForm {
    response_text: String,
}

pub async fn do_submit_response(
    Path(feedback_id): Path<String>,
    user: Profile,
    mut conn: Conn,
    Form(form): Form<ResponseForm>,
) -> StandardResponse {
    access::submit_response(
        &user,
        &feedback_id,
        &form.response_text,
        &mut *conn,
    )?;

    see_other_ok(Redirect::to("/admin"))
}

pub async fn do_delete_response(
    Path(response_id): Path<String>,
    user: Profile,
    mut conn: Conn,
) -> StandardResponse {
    access::delete_response(&user, &response_id, &mut *conn)?;

    see_other_ok(Redirect::to("/admin"))
}
