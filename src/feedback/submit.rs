use axum::{extract::Form, response::Redirect};
use hypertext::prelude::*;
use serde::Deserialize;

use crate::{
    auth::Profile,
    feedback::access,
    permission::IsTrainee,
    state::Conn,
    template::Page,
    util_resp::{StandardResponse, see_other_ok, success},
};

pub async fn submit_feedback_page(
    IsTrainee(user): IsTrainee,
) -> StandardResponse {
    success(
        Page::new()
            .user(user)
            .body(maud! {
                h1 { "Submit Feedback" }
                form method="post" action="/feedback" class="mt-4" {
                    div class="mb-3" {
                        label for="title" class="form-label" { "Title" }
                        input type="text"
                              class="form-control"
                              id="title"
                              name="title"
                              placeholder="Brief summary of your feedback"
                              required;
                    }
                    div class="mb-3" {
                        label for="description" class="form-label" { "Description" }
                        textarea class="form-control"
                                 id="description"
                                 name="description"
                                 rows="5"
                                 placeholder="Provide details about your feedback..."
                                 required {}
                    }
                    button type="submit" class="btn btn-primary" {
                        "Submit Feedback"
                    }
                }
            })
            .render(),
    )
}

#[derive(Deserialize)]
pub struct FeedbackForm {
    title: String,
    description: String,
}

pub async fn do_submit_feedback(
    user: Profile,
    mut conn: Conn,
    Form(form): Form<FeedbackForm>,
) -> StandardResponse {
    access::submit_feedback(
        &user,
        &form.title,
        &form.description,
        &mut *conn,
    )?;

    see_other_ok(Redirect::to("/feedback"))
}
