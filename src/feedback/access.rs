//! The access contract between the two roles and the store.
//!
//! Every read or write of feedback data goes through the guarded
//! operations in this module; the handlers above it hold no authorization
//! logic of their own. Each operation takes the acting [`Profile`] plus
//! its arguments, checks role, ownership, and state, and either applies
//! the whole effect or nothing at all.

use chrono::Utc;
use diesel::result::DatabaseErrorKind;
use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use hypertext::prelude::*;
use uuid::Uuid;

use crate::{
    auth::{Profile, Role},
    feedback::{AdminResponse, Feedback, Status},
    schema::{admin_responses, feedback, profiles},
    util_resp::FailureResponse,
    validation::non_empty_trimmed,
    widgets::alert::ErrorAlert,
};

#[derive(Debug)]
pub enum AccessError {
    /// A required field was empty after trimming; nothing was written.
    Validation(String),
    /// Wrong role, wrong owner, or an unrecognized stored role value.
    Unauthorized,
    /// Dangling feedback or response reference.
    NotFound,
    /// The operation is not legal in the row's current state.
    InvalidState(&'static str),
    /// Store failure, passed through unchanged.
    Store(diesel::result::Error),
}

impl From<diesel::result::Error> for AccessError {
    fn from(e: diesel::result::Error) -> Self {
        AccessError::Store(e)
    }
}

impl From<AccessError> for FailureResponse {
    fn from(e: AccessError) -> Self {
        match e {
            AccessError::Validation(msg) => FailureResponse::BadRequest(
                maud! { ErrorAlert msg=(&msg); }.render(),
            ),
            AccessError::Unauthorized => FailureResponse::Unauthorized(()),
            AccessError::NotFound => FailureResponse::NotFound(()),
            AccessError::InvalidState(msg) => FailureResponse::Conflict(
                maud! { ErrorAlert msg=(msg); }.render(),
            ),
            AccessError::Store(e) => {
                tracing::error!("store error: {e}");
                FailureResponse::ServerError(())
            }
        }
    }
}

/// One feedback item as returned by [`list_feedback`]: the item itself,
/// its response (if any), and (for admin listings only) the author's name
/// and email.
#[derive(Debug, Clone)]
pub struct FeedbackListing {
    pub feedback: Feedback,
    pub response: Option<AdminResponse>,
    pub author: Option<FeedbackAuthor>,
}

#[derive(Debug, Clone)]
pub struct FeedbackAuthor {
    pub full_name: String,
    pub email: String,
}

impl FeedbackListing {
    pub fn status(&self) -> Status {
        Status::derive(self.response.as_ref())
    }
}

fn role_of(actor: &Profile) -> Result<Role, AccessError> {
    Role::parse(&actor.role).ok_or(AccessError::Unauthorized)
}

fn require_role(actor: &Profile, role: Role) -> Result<(), AccessError> {
    match role_of(actor)? == role {
        true => Ok(()),
        false => Err(AccessError::Unauthorized),
    }
}

/// Creates a feedback item owned by the acting trainee.
pub fn submit_feedback(
    actor: &Profile,
    title: &str,
    description: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<Feedback, AccessError> {
    require_role(actor, Role::Trainee)?;

    let title =
        non_empty_trimmed("title", title).map_err(AccessError::Validation)?;
    let description = non_empty_trimmed("description", description)
        .map_err(AccessError::Validation)?;

    let row = Feedback {
        id: Uuid::now_v7().to_string(),
        trainee_id: actor.id.clone(),
        title: title.to_string(),
        description: description.to_string(),
        created_at: Utc::now().naive_utc(),
    };

    diesel::insert_into(feedback::table)
        .values(&row)
        .execute(conn)?;

    Ok(row)
}

/// Lists feedback visible to the actor, newest first.
///
/// Trainees see only their own items; admins see every item together with
/// the author's name and email.
pub fn list_feedback(
    actor: &Profile,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<Vec<FeedbackListing>, AccessError> {
    match role_of(actor)? {
        Role::Trainee => {
            let rows = feedback::table
                .left_join(
                    admin_responses::table
                        .on(admin_responses::feedback_id.eq(feedback::id)),
                )
                .filter(feedback::trainee_id.eq(&actor.id))
                .order_by(feedback::created_at.desc())
                .then_order_by(feedback::id.desc())
                .select((
                    Feedback::as_select(),
                    Option::<AdminResponse>::as_select(),
                ))
                .load::<(Feedback, Option<AdminResponse>)>(conn)?;

            Ok(rows
                .into_iter()
                .map(|(feedback, response)| FeedbackListing {
                    feedback,
                    response,
                    author: None,
                })
                .collect())
        }
        Role::Admin => {
            let rows = feedback::table
                .inner_join(
                    profiles::table
                        .on(profiles::id.eq(feedback::trainee_id)),
                )
                .left_join(
                    admin_responses::table
                        .on(admin_responses::feedback_id.eq(feedback::id)),
                )
                .order_by(feedback::created_at.desc())
                .then_order_by(feedback::id.desc())
                .select((
                    Feedback::as_select(),
                    Option::<AdminResponse>::as_select(),
                    profiles::full_name,
                    profiles::email,
                ))
                .load::<(Feedback, Option<AdminResponse>, String, String)>(
                    conn,
                )?;

            Ok(rows
                .into_iter()
                .map(|(feedback, response, full_name, email)| {
                    FeedbackListing {
                        feedback,
                        response,
                        author: Some(FeedbackAuthor { full_name, email }),
                    }
                })
                .collect())
        }
    }
}

/// Writes the admin's response to a feedback item which does not yet have
/// one. The created response starts in the `replied` state.
pub fn submit_response(
    actor: &Profile,
    feedback_id: &str,
    text: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<AdminResponse, AccessError> {
    require_role(actor, Role::Admin)?;

    let text =
        non_empty_trimmed("response", text).map_err(AccessError::Validation)?;

    conn.transaction::<_, AccessError, _>(|conn| {
        let feedback_exists = diesel::select(diesel::dsl::exists(
            feedback::table.filter(feedback::id.eq(feedback_id)),
        ))
        .get_result::<bool>(conn)?;

        if !feedback_exists {
            return Err(AccessError::NotFound);
        }

        let already_answered = diesel::select(diesel::dsl::exists(
            admin_responses::table
                .filter(admin_responses::feedback_id.eq(feedback_id)),
        ))
        .get_result::<bool>(conn)?;

        if already_answered {
            return Err(AccessError::InvalidState(
                "this feedback item already has a response",
            ));
        }

        let row = AdminResponse {
            id: Uuid::now_v7().to_string(),
            feedback_id: feedback_id.to_string(),
            admin_id: actor.id.clone(),
            response_text: text.to_string(),
            status: Status::Replied.as_str().to_string(),
            created_at: Utc::now().naive_utc(),
        };

        // The store enforces one response per feedback item, so a racing
        // insert surfaces here as a unique violation rather than a second
        // row.
        match diesel::insert_into(admin_responses::table)
            .values(&row)
            .execute(conn)
        {
            Ok(_) => Ok(row),
            Err(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                _,
            )) => Err(AccessError::InvalidState(
                "this feedback item already has a response",
            )),
            Err(e) => Err(e.into()),
        }
    })
}

/// Deletes a response, reverting the parent feedback's derived status to
/// pending. Any admin may delete any response.
pub fn delete_response(
    actor: &Profile,
    response_id: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<(), AccessError> {
    require_role(actor, Role::Admin)?;

    let n = diesel::delete(
        admin_responses::table.filter(admin_responses::id.eq(response_id)),
    )
    .execute(conn)?;

    match n {
        0 => Err(AccessError::NotFound),
        _ => Ok(()),
    }
}

/// Marks a `replied` response as `acknowledged`. Only the trainee owning
/// the parent feedback may do this, and `acknowledged` is terminal.
pub fn acknowledge_response(
    actor: &Profile,
    response_id: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<AdminResponse, AccessError> {
    require_role(actor, Role::Trainee)?;

    conn.transaction::<_, AccessError, _>(|conn| {
        let row = admin_responses::table
            .inner_join(
                feedback::table
                    .on(feedback::id.eq(admin_responses::feedback_id)),
            )
            .filter(admin_responses::id.eq(response_id))
            .select((AdminResponse::as_select(), feedback::trainee_id))
            .first::<(AdminResponse, String)>(conn)
            .optional()?;

        let (response, owner_id) = match row {
            Some(row) => row,
            None => return Err(AccessError::NotFound),
        };

        if owner_id != actor.id {
            return Err(AccessError::Unauthorized);
        }

        match Status::parse(&response.status) {
            Some(Status::Replied) => {}
            _ => {
                return Err(AccessError::InvalidState(
                    "only a replied response can be acknowledged",
                ));
            }
        }

        diesel::update(
            admin_responses::table
                .filter(admin_responses::id.eq(response_id)),
        )
        .set(admin_responses::status.eq(Status::Acknowledged.as_str()))
        .execute(conn)?;

        Ok(AdminResponse {
            status: Status::Acknowledged.as_str().to_string(),
            ..response
        })
    })
}

#[cfg(test)]
mod tests {
    use diesel::{Connection, SqliteConnection};
    use diesel_migrations::MigrationHarness;

    use super::*;
    use crate::MIGRATIONS;

    fn setup() -> SqliteConnection {
        let mut conn = SqliteConnection::establish(":memory:").unwrap();
        conn.run_pending_migrations(MIGRATIONS).unwrap();
        conn
    }

    fn make_profile(
        full_name: &str,
        email: &str,
        role: &str,
        conn: &mut SqliteConnection,
    ) -> Profile {
        let profile = Profile {
            id: Uuid::now_v7().to_string(),
            full_name: full_name.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            password_hash: "unused".to_string(),
            created_at: Utc::now().naive_utc(),
        };

        diesel::insert_into(profiles::table)
            .values((
                profiles::id.eq(&profile.id),
                profiles::full_name.eq(&profile.full_name),
                profiles::email.eq(&profile.email),
                profiles::role.eq(&profile.role),
                profiles::password_hash.eq(&profile.password_hash),
                profiles::created_at.eq(profile.created_at),
            ))
            .execute(conn)
            .unwrap();

        profile
    }

    #[test]
    fn submit_then_list_shows_pending_item() {
        let mut conn = setup();
        let trainee =
            make_profile("Trainee One", "t1@test.com", "trainee", &mut conn);

        let created = submit_feedback(
            &trainee,
            "  Slow onboarding  ",
            "Week 1 was unclear",
            &mut conn,
        )
        .unwrap();
        assert_eq!(created.title, "Slow onboarding");

        let listings = list_feedback(&trainee, &mut conn).unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].feedback.id, created.id);
        assert_eq!(listings[0].status(), Status::Pending);
        assert!(listings[0].author.is_none());
    }

    #[test]
    fn whitespace_only_fields_are_rejected() {
        let mut conn = setup();
        let trainee =
            make_profile("Trainee One", "t1@test.com", "trainee", &mut conn);

        assert!(matches!(
            submit_feedback(&trainee, "   ", "desc", &mut conn),
            Err(AccessError::Validation(_))
        ));
        assert!(matches!(
            submit_feedback(&trainee, "title", " \t ", &mut conn),
            Err(AccessError::Validation(_))
        ));

        assert!(list_feedback(&trainee, &mut conn).unwrap().is_empty());
    }

    #[test]
    fn admin_cannot_submit_feedback() {
        let mut conn = setup();
        let admin =
            make_profile("Admin One", "a1@test.com", "admin", &mut conn);

        assert!(matches!(
            submit_feedback(&admin, "title", "desc", &mut conn),
            Err(AccessError::Unauthorized)
        ));
    }

    #[test]
    fn unknown_role_is_rejected_not_defaulted() {
        let mut conn = setup();
        let impostor =
            make_profile("Im Postor", "x@test.com", "superuser", &mut conn);

        assert!(matches!(
            list_feedback(&impostor, &mut conn),
            Err(AccessError::Unauthorized)
        ));
        assert!(matches!(
            submit_feedback(&impostor, "title", "desc", &mut conn),
            Err(AccessError::Unauthorized)
        ));
    }

    #[test]
    fn trainee_never_sees_another_trainees_feedback() {
        let mut conn = setup();
        let t1 = make_profile("Trainee One", "t1@test.com", "trainee", &mut conn);
        let t2 = make_profile("Trainee Two", "t2@test.com", "trainee", &mut conn);

        submit_feedback(&t1, "Mine", "first trainee's item", &mut conn)
            .unwrap();

        let listings = list_feedback(&t2, &mut conn).unwrap();
        assert!(listings.is_empty());
    }

    #[test]
    fn admin_listing_includes_every_item_with_author() {
        let mut conn = setup();
        let t1 = make_profile("Trainee One", "t1@test.com", "trainee", &mut conn);
        let t2 = make_profile("Trainee Two", "t2@test.com", "trainee", &mut conn);
        let admin =
            make_profile("Admin One", "a1@test.com", "admin", &mut conn);

        submit_feedback(&t1, "First", "from t1", &mut conn).unwrap();
        submit_feedback(&t2, "Second", "from t2", &mut conn).unwrap();

        let listings = list_feedback(&admin, &mut conn).unwrap();
        assert_eq!(listings.len(), 2);
        assert!(listings.iter().all(|l| l.author.is_some()));
    }

    #[test]
    fn listing_is_newest_first() {
        let mut conn = setup();
        let trainee =
            make_profile("Trainee One", "t1@test.com", "trainee", &mut conn);

        let first =
            submit_feedback(&trainee, "First", "oldest", &mut conn).unwrap();
        let second =
            submit_feedback(&trainee, "Second", "newest", &mut conn).unwrap();

        let listings = list_feedback(&trainee, &mut conn).unwrap();
        assert_eq!(listings[0].feedback.id, second.id);
        assert_eq!(listings[1].feedback.id, first.id);
    }

    #[test]
    fn respond_then_acknowledge_walks_the_status_machine() {
        let mut conn = setup();
        let trainee =
            make_profile("Trainee One", "t1@test.com", "trainee", &mut conn);
        let admin =
            make_profile("Admin One", "a1@test.com", "admin", &mut conn);

        let item = submit_feedback(
            &trainee,
            "Slow onboarding",
            "Week 1 was unclear",
            &mut conn,
        )
        .unwrap();

        let response = submit_response(
            &admin,
            &item.id,
            "We've updated the onboarding guide",
            &mut conn,
        )
        .unwrap();
        assert_eq!(Status::parse(&response.status), Some(Status::Replied));

        let listings = list_feedback(&trainee, &mut conn).unwrap();
        assert_eq!(listings[0].status(), Status::Replied);

        let acked =
            acknowledge_response(&trainee, &response.id, &mut conn).unwrap();
        assert_eq!(Status::parse(&acked.status), Some(Status::Acknowledged));

        let listings = list_feedback(&trainee, &mut conn).unwrap();
        assert_eq!(listings[0].status(), Status::Acknowledged);
    }

    #[test]
    fn second_response_to_same_feedback_conflicts() {
        let mut conn = setup();
        let trainee =
            make_profile("Trainee One", "t1@test.com", "trainee", &mut conn);
        let admin =
            make_profile("Admin One", "a1@test.com", "admin", &mut conn);
        let other_admin =
            make_profile("Admin Two", "a2@test.com", "admin", &mut conn);

        let item =
            submit_feedback(&trainee, "Title", "desc", &mut conn).unwrap();
        submit_response(&admin, &item.id, "first answer", &mut conn).unwrap();

        assert!(matches!(
            submit_response(&other_admin, &item.id, "second answer", &mut conn),
            Err(AccessError::InvalidState(_))
        ));
    }

    #[test]
    fn responding_to_missing_feedback_is_not_found() {
        let mut conn = setup();
        let admin =
            make_profile("Admin One", "a1@test.com", "admin", &mut conn);

        assert!(matches!(
            submit_response(&admin, "no-such-id", "text", &mut conn),
            Err(AccessError::NotFound)
        ));
    }

    #[test]
    fn trainee_cannot_respond_and_admin_cannot_acknowledge() {
        let mut conn = setup();
        let trainee =
            make_profile("Trainee One", "t1@test.com", "trainee", &mut conn);
        let admin =
            make_profile("Admin One", "a1@test.com", "admin", &mut conn);

        let item =
            submit_feedback(&trainee, "Title", "desc", &mut conn).unwrap();

        assert!(matches!(
            submit_response(&trainee, &item.id, "text", &mut conn),
            Err(AccessError::Unauthorized)
        ));

        let response =
            submit_response(&admin, &item.id, "text", &mut conn).unwrap();

        assert!(matches!(
            acknowledge_response(&admin, &response.id, &mut conn),
            Err(AccessError::Unauthorized)
        ));
        assert!(matches!(
            delete_response(&trainee, &response.id, &mut conn),
            Err(AccessError::Unauthorized)
        ));
    }

    #[test]
    fn only_the_owner_may_acknowledge_and_status_is_unchanged_on_failure() {
        let mut conn = setup();
        let owner =
            make_profile("Trainee One", "t1@test.com", "trainee", &mut conn);
        let other =
            make_profile("Trainee Two", "t2@test.com", "trainee", &mut conn);
        let admin =
            make_profile("Admin One", "a1@test.com", "admin", &mut conn);

        let item =
            submit_feedback(&owner, "Title", "desc", &mut conn).unwrap();
        let response =
            submit_response(&admin, &item.id, "text", &mut conn).unwrap();

        assert!(matches!(
            acknowledge_response(&other, &response.id, &mut conn),
            Err(AccessError::Unauthorized)
        ));

        let unchanged =
            AdminResponse::fetch(&response.id, &mut conn).unwrap();
        assert_eq!(Status::parse(&unchanged.status), Some(Status::Replied));
    }

    #[test]
    fn acknowledged_is_terminal() {
        let mut conn = setup();
        let trainee =
            make_profile("Trainee One", "t1@test.com", "trainee", &mut conn);
        let admin =
            make_profile("Admin One", "a1@test.com", "admin", &mut conn);

        let item =
            submit_feedback(&trainee, "Title", "desc", &mut conn).unwrap();
        let response =
            submit_response(&admin, &item.id, "text", &mut conn).unwrap();

        acknowledge_response(&trainee, &response.id, &mut conn).unwrap();

        assert!(matches!(
            acknowledge_response(&trainee, &response.id, &mut conn),
            Err(AccessError::InvalidState(_))
        ));
    }

    #[test]
    fn delete_reverts_feedback_to_pending() {
        let mut conn = setup();
        let trainee =
            make_profile("Trainee One", "t1@test.com", "trainee", &mut conn);
        let admin =
            make_profile("Admin One", "a1@test.com", "admin", &mut conn);

        let item =
            submit_feedback(&trainee, "Title", "desc", &mut conn).unwrap();
        let response =
            submit_response(&admin, &item.id, "text", &mut conn).unwrap();

        delete_response(&admin, &response.id, &mut conn).unwrap();

        let listings = list_feedback(&trainee, &mut conn).unwrap();
        assert_eq!(listings[0].status(), Status::Pending);

        assert!(matches!(
            delete_response(&admin, &response.id, &mut conn),
            Err(AccessError::NotFound)
        ));
    }
}
