use axum::{extract::Path, response::Redirect};

use crate::{
    auth::Profile,
    feedback::access,
    state::Conn,
    util_resp::{StandardResponse, see_other_ok},
};

pub async fn do_acknowledge_response(
    Path(response_id): Path<String>,
    user: Profile,
    mut conn: Conn,
) -> StandardResponse {
    access::acknowledge_response(&user, &response_id, &mut *conn)?;

    see_other_ok(Redirect::to("/feedback"))
}
