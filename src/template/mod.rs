//! Templating code.
//!
//! This defines the [`Page`] item, which is used in most of the other parts
//! of this crate.

use hypertext::prelude::*;

use crate::auth::{Profile, Role};

pub struct Page<R1: Renderable, R2: Renderable> {
    body: Option<R1>,
    user: Option<Profile>,
    extra_head: Option<R2>,
}

// unfortunate generic argument shenanigans
impl<R1: Renderable> Page<R1, String> {
    pub fn new() -> Self {
        Default::default()
    }
}

impl<R1: Renderable, R2: Renderable> Page<R1, R2> {
    pub fn new_full() -> Self {
        Default::default()
    }

    pub fn body(mut self, body: R1) -> Self {
        self.body = Some(body);
        self
    }

    pub fn user(mut self, user: Profile) -> Self {
        self.user = Some(user);
        self
    }

    pub fn user_opt(mut self, user: Option<Profile>) -> Self {
        self.user = user;
        self
    }

    pub fn extra_head(mut self, content: R2) -> Page<R1, R2> {
        self.extra_head = Some(content);
        self
    }
}

impl<R1: Renderable, R2: Renderable> Renderable for Page<R1, R2> {
    fn render_to(
        &self,
        buffer: &mut hypertext::Buffer<hypertext::context::Node>,
    ) {
        maud! {
            html {
                head {
                    title { "Debrief" }
                    script src="https://cdn.jsdelivr.net/npm/htmx.org@2.0.7/dist/htmx.min.js" integrity="sha384-ZBXiYtYQ6hJ2Y0ZNoYuI+Nq5MqWBr+chMrS/RkXpNzQCApHEhOt2aY8EJgqwHLkJ" crossorigin="anonymous" {
                    }
                    link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css" rel="stylesheet";
                    meta
                        name="viewport"
                        content="width=device-width, initial-scale=1";
                    @if let Some(extra) = &self.extra_head {
                        (extra)
                    }
                }
                body class="d-flex flex-column vh-100" {
                    nav class="navbar navbar-expand"
                        style="background-color: #452859; display: flex; justify-content: space-between; align-items: center;"
                        data-bs-theme="dark" {
                        div class="container-fluid" style="display: flex; justify-content: space-between; align-items: center;" {
                            a class="navbar-brand text-white" href="/" {
                                "Debrief"
                            }
                            div {
                                ul class="navbar-nav" style="display: flex; gap: 1rem; align-items: center;" data-bs-theme="dark" {
                                    @if let Some(user) = &self.user {
                                        @if let Some(role) = Role::parse(&user.role) {
                                            li class="nav-item" {
                                                span class="badge rounded-pill text-bg-light" {
                                                    (role.as_str())
                                                }
                                            }
                                        }
                                        li class="nav-item" {
                                            span class="nav-link text-white" {
                                                (user.email)
                                            }
                                        }
                                        li class="nav-item" {
                                            form method="post" action="/logout" {
                                                button type="submit" class="btn btn-link nav-link text-white" {
                                                    "Sign out"
                                                }
                                            }
                                        }
                                    } @else {
                                        li class="nav-item" {
                                            a class="nav-link text-white" href="/login" {
                                                "Login"
                                            }
                                        }
                                        li class="nav-item" {
                                            a class="nav-link text-white" href="/register" {
                                                "Register"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                    div class="flex-grow-1" {
                        div class="container py-4" {
                            @if let Some(body) = &self.body {
                                (body)
                            }
                        }
                    }
                }
            }
        }.render_to(buffer)
    }
}

impl<R1: Renderable, R2: Renderable> Default for Page<R1, R2> {
    fn default() -> Self {
        Self {
            body: Default::default(),
            user: Default::default(),
            extra_head: Default::default(),
        }
    }
}
