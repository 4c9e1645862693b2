pub mod access;
pub mod acknowledge;
pub mod respond;
pub mod submit;
pub mod view;

use chrono::NaiveDateTime;
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::Serialize;

use crate::{
    schema::{admin_responses, feedback},
    util_resp::{FailureResponse, err_not_found},
};

#[derive(
    Queryable, Selectable, Identifiable, Insertable, Debug, Clone, Serialize,
)]
#[diesel(table_name = feedback)]
pub struct Feedback {
    pub id: String,
    pub trainee_id: String,
    pub title: String,
    pub description: String,
    pub created_at: NaiveDateTime,
}

#[derive(
    Queryable, Selectable, Identifiable, Insertable, Debug, Clone, Serialize,
)]
#[diesel(table_name = admin_responses)]
pub struct AdminResponse {
    pub id: String,
    pub feedback_id: String,
    pub admin_id: String,
    pub response_text: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

/// Lifecycle state of a feedback item, as shown to both roles.
///
/// Only `replied` and `acknowledged` are ever stored; `Pending` is derived
/// from the absence of a response row (see [`Status::derive`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Status {
    Pending,
    Replied,
    Acknowledged,
}

impl Status {
    /// Parses a stored status column. `pending` is deliberately not a
    /// recognized stored value.
    pub fn parse(value: &str) -> Option<Status> {
        match value {
            "replied" => Some(Status::Replied),
            "acknowledged" => Some(Status::Acknowledged),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Replied => "replied",
            Status::Acknowledged => "acknowledged",
        }
    }

    /// Derives the display status of a feedback item from its response:
    /// no response means `Pending`, otherwise the response's stored state.
    pub fn derive(response: Option<&AdminResponse>) -> Status {
        match response {
            None => Status::Pending,
            Some(response) => Status::parse(&response.status).expect(
                "stored status is always `replied` or `acknowledged`",
            ),
        }
    }
}

impl Feedback {
    pub fn fetch(
        feedback_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Self, FailureResponse> {
        feedback::table
            .filter(feedback::id.eq(feedback_id))
            .first::<Feedback>(conn)
            .optional()
            .unwrap()
            .map(Ok)
            .unwrap_or(err_not_found().map(|_| {
                unreachable!("err_not_found always returns an `Err` variant")
            }))
    }

    /// The response to this feedback item, if one has been written.
    pub fn response(
        &self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Option<AdminResponse> {
        admin_responses::table
            .filter(admin_responses::feedback_id.eq(&self.id))
            .first::<AdminResponse>(conn)
            .optional()
            .unwrap()
    }
}

impl AdminResponse {
    pub fn fetch(
        response_id: &str,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Self, FailureResponse> {
        admin_responses::table
            .filter(admin_responses::id.eq(response_id))
            .first::<AdminResponse>(conn)
            .optional()
            .unwrap()
            .map(Ok)
            .unwrap_or(err_not_found().map(|_| {
                unreachable!("err_not_found always returns an `Err` variant")
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_status(status: &str) -> AdminResponse {
        AdminResponse {
            id: "r1".to_string(),
            feedback_id: "f1".to_string(),
            admin_id: "a1".to_string(),
            response_text: "text".to_string(),
            status: status.to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn absent_response_derives_pending() {
        assert_eq!(Status::derive(None), Status::Pending);
    }

    #[test]
    fn present_response_derives_stored_status() {
        assert_eq!(
            Status::derive(Some(&response_with_status("replied"))),
            Status::Replied
        );
        assert_eq!(
            Status::derive(Some(&response_with_status("acknowledged"))),
            Status::Acknowledged
        );
    }

    #[test]
    fn pending_is_not_a_stored_status() {
        assert_eq!(Status::parse("pending"), None);
        assert_eq!(Status::parse("garbage"), None);
    }
}
