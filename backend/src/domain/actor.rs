//! Authenticated actors and the ownership rules applied by callers.

use serde::{Deserialize, Serialize};

use super::closed_enum::closed_enum;
use super::{FarmerId, UserId};

closed_enum! {
    /// Role granted to a user account.
    pub enum Role("role") {
        /// Farmer booking storage for their own produce.
        Farmer => "FARMER",
        /// Operator with access to every booking.
        Admin => "ADMIN",
        /// Agricultural department staff.
        AgriDept => "AGRI_DEPT",
    }
}

/// Resolved caller identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// Authenticated user.
    pub user_id: UserId,
    /// Account role.
    pub role: Role,
    /// Linked farmer profile, when the user has one.
    pub farmer_id: Option<FarmerId>,
}

impl Actor {
    /// Whether the actor has administrative rights.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    /// Whether the actor may read or cancel bookings owned by `owner`.
    ///
    /// ```
    /// use storage_booking::domain::{Actor, FarmerId, Role, UserId};
    ///
    /// let farmer = FarmerId::random();
    /// let actor = Actor { user_id: UserId::random(), role: Role::Farmer, farmer_id: Some(farmer) };
    /// assert!(actor.may_act_for(farmer));
    /// assert!(!actor.may_act_for(FarmerId::random()));
    /// ```
    #[must_use]
    pub fn may_act_for(&self, owner: FarmerId) -> bool {
        self.is_admin() || self.farmer_id == Some(owner)
    }
}
