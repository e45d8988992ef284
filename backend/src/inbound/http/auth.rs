//! Authorisation helpers used by HTTP handlers.
//!
//! The session only carries the member id; the role is read from the profile
//! on every admin request so a demotion takes effect immediately.

use crate::domain::ports::MemberQuery;
use crate::domain::{Error, ErrorCode, MemberId};

use super::ApiResult;
use super::session::SessionContext;

/// Require a signed-in member whose profile role is admin.
///
/// A session pointing at a deleted profile is treated as signed out.
pub async fn require_admin(
    session: &SessionContext,
    members: &dyn MemberQuery,
) -> ApiResult<MemberId> {
    let member = session.require_member()?;
    let profile = members.get_profile(&member).await.map_err(|err| {
        if err.code() == ErrorCode::NotFound {
            Error::unauthorized("login required")
        } else {
            err
        }
    })?;
    if !profile.is_admin() {
        tracing::warn!(member_id = %member, "non-admin attempted an admin route");
        return Err(Error::forbidden("admin role required"));
    }
    Ok(member)
}
