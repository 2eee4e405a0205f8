//! Caller resolution and ownership checks shared by booking handlers.
//!
//! The booking state machine does not authorise; these helpers enforce the
//! "own booking or ADMIN" rule before a use case runs.

use crate::domain::ports::ActorDirectoryError;
use crate::domain::{Actor, Error, FarmerId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

fn map_directory_error(error: ActorDirectoryError) -> Error {
    match error {
        ActorDirectoryError::Connection { message } => {
            Error::service_unavailable(format!("actor directory unavailable: {message}"))
        }
        ActorDirectoryError::Query { message } => {
            Error::internal(format!("actor directory error: {message}"))
        }
    }
}

/// Resolve the session user, failing with `401` when absent or unknown.
pub(crate) async fn require_actor(
    state: &HttpState,
    session: &SessionContext,
) -> Result<Actor, Error> {
    let user_id = session.require_user_id()?;
    state
        .actors
        .resolve(&user_id)
        .await
        .map_err(map_directory_error)?
        .ok_or_else(|| Error::unauthorized("account not found or inactive"))
}

/// The farmer profile the actor books for, or `403`.
pub(crate) fn require_farmer(actor: &Actor) -> Result<FarmerId, Error> {
    actor
        .farmer_id
        .ok_or_else(|| Error::forbidden("farmer profile not found"))
}

/// Fail with `403` unless the actor owns the booking or is an admin.
pub(crate) fn ensure_may_act_for(actor: &Actor, owner: FarmerId) -> Result<(), Error> {
    if actor.may_act_for(owner) {
        Ok(())
    } else {
        Err(Error::forbidden("booking belongs to another farmer"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, Role, UserId};
    use rstest::rstest;

    fn actor(role: Role, farmer_id: Option<FarmerId>) -> Actor {
        Actor {
            user_id: UserId::random(),
            role,
            farmer_id,
        }
    }

    #[rstest]
    #[case(ActorDirectoryError::connection("down"), ErrorCode::ServiceUnavailable)]
    #[case(ActorDirectoryError::query("bad"), ErrorCode::InternalError)]
    fn directory_errors_map_to_codes(#[case] error: ActorDirectoryError, #[case] code: ErrorCode) {
        assert_eq!(map_directory_error(error).code(), code);
    }

    #[rstest]
    fn staff_without_profile_cannot_book() {
        let err = require_farmer(&actor(Role::AgriDept, None)).expect_err("no profile");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    fn admin_may_act_for_anyone() {
        assert!(ensure_may_act_for(&actor(Role::Admin, None), FarmerId::random()).is_ok());
    }

    #[rstest]
    fn farmer_may_not_act_for_others() {
        let err = ensure_may_act_for(&actor(Role::Farmer, Some(FarmerId::random())), FarmerId::random())
            .expect_err("foreign booking");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
