use hypertext::{Renderable, maud, prelude::*};
use itertools::Itertools;

use crate::{
    feedback::{
        Status,
        access::{self, FeedbackListing},
    },
    permission::{IsAdmin, IsTrainee},
    state::Conn,
    template::Page,
    util_resp::{StandardResponse, success},
    widgets::badge::StatusBadge,
};

pub async fn trainee_dashboard(
    IsTrainee(user): IsTrainee,
    mut conn: Conn,
) -> StandardResponse {
    let listings = access::list_feedback(&user, &mut *conn)?;

    success(
        Page::new()
            .user(user)
            .body(TraineeDashboardRenderer { listings })
            .render(),
    )
}

struct TraineeDashboardRenderer {
    listings: Vec<FeedbackListing>,
}

impl Renderable for TraineeDashboardRenderer {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            div class="d-flex justify-content-between align-items-start mb-4" {
                div {
                    h1 { "My Feedback" }
                    p class="text-muted" {
                        "Submit feedback and view admin responses"
                    }
                }
                a class="btn btn-primary" href="/feedback/new" {
                    "New Feedback"
                }
            }

            @if self.listings.is_empty() {
                div class="card" {
                    div class="card-body text-center py-5 text-muted" {
                        "No feedback yet. Submit your first one!"
                    }
                }
            }

            @for listing in &self.listings {
                div class="card mb-3" {
                    div class="card-header d-flex justify-content-between align-items-start" {
                        div {
                            h5 class="mb-1" { (listing.feedback.title) }
                            p class="text-muted small mb-0" {
                                (listing.feedback.created_at.format("%Y-%m-%d").to_string())
                            }
                        }
                        StatusBadge status=(listing.status());
                    }
                    div class="card-body" {
                        p { (listing.feedback.description) }

                        @if let Some(response) = &listing.response {
                            div class="border-start border-4 border-primary bg-light p-3 mb-3" {
                                p class="text-muted small fw-medium mb-1" { "Admin Response" }
                                p class="mb-1" { (response.response_text) }
                                p class="text-muted small mb-0" {
                                    (response.created_at.format("%Y-%m-%d").to_string())
                                }
                            }
                            @if listing.status() == Status::Replied {
                                form method="post"
                                     action=(format!("/responses/{}/acknowledge", response.id)) {
                                    button type="submit" class="btn btn-outline-primary btn-sm" {
                                        "Acknowledge"
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}

pub async fn admin_dashboard(
    IsAdmin(user): IsAdmin,
    mut conn: Conn,
) -> StandardResponse {
    let listings = access::list_feedback(&user, &mut *conn)?;

    success(
        Page::new()
            .user(user)
            .body(AdminDashboardRenderer { listings })
            .render(),
    )
}

struct AdminDashboardRenderer {
    listings: Vec<FeedbackListing>,
}

impl Renderable for AdminDashboardRenderer {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        let counts = self
            .listings
            .iter()
            .counts_by(|listing| listing.status());
        let count_of = |status: Status| counts.get(&status).copied().unwrap_or(0);

        maud! {
            div class="mb-4" {
                h1 { "Admin Dashboard" }
                p class="text-muted" {
                    "Review trainee feedback and manage responses"
                }
                @if !self.listings.is_empty() {
                    p class="text-muted small" {
                        (count_of(Status::Pending)) " pending · "
                        (count_of(Status::Replied)) " replied · "
                        (count_of(Status::Acknowledged)) " acknowledged"
                    }
                }
            }

            @if self.listings.is_empty() {
                div class="card" {
                    div class="card-body text-center py-5 text-muted" {
                        "No feedback submitted yet"
                    }
                }
            }

            @for listing in &self.listings {
                div class="card mb-3" {
                    div class="card-header d-flex justify-content-between align-items-start" {
                        div {
                            h5 class="mb-1" { (listing.feedback.title) }
                            p class="text-muted small mb-0" {
                                "by "
                                @if let Some(author) = &listing.author {
                                    span class="fw-medium" { (author.full_name) }
                                    " (" (author.email) ")"
                                } @else {
                                    span class="fw-medium" { "Unknown" }
                                }
                                " · "
                                (listing.feedback.created_at.format("%Y-%m-%d").to_string())
                            }
                        }
                        StatusBadge status=(listing.status());
                    }
                    div class="card-body" {
                        p { (listing.feedback.description) }

                        @if let Some(response) = &listing.response {
                            div class="border-start border-4 border-primary bg-light p-3" {
                                div class="d-flex justify-content-between align-items-center mb-1" {
                                    p class="text-muted small fw-medium mb-0" { "Your Response" }
                                    form method="post"
                                         action=(format!("/admin/responses/{}/delete", response.id)) {
                                        button type="submit" class="btn btn-outline-danger btn-sm" {
                                            "Delete"
                                        }
                                    }
                                }
                                p class="mb-0" { (response.response_text) }
                            }
                        } @else {
                            a class="btn btn-primary btn-sm"
                              href=(format!("/admin/feedback/{}/respond", listing.feedback.id)) {
                                "Write Response"
                            }
                        }
                    }
                }
            }
        }
        .render_to(buffer);
    }
}
