use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::{
    db::OrmConn,
    entity::{UserGroups, Users, user_groups},
    error::{AppError, AppResult},
};

pub const MANAGER_GROUP: &str = "manager";
pub const DELIVERY_CREW_GROUP: &str = "delivery_crew";

/// Groups whose membership grants a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Manager,
    DeliveryCrew,
}

impl Group {
    pub fn as_str(&self) -> &'static str {
        match self {
            Group::Manager => MANAGER_GROUP,
            Group::DeliveryCrew => DELIVERY_CREW_GROUP,
        }
    }

    /// Human-readable name used in response messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Group::Manager => "Manager",
            Group::DeliveryCrew => "Delivery crew",
        }
    }
}

/// Role classification of a requester. `is_customer` holds exactly when none
/// of the privileged flags do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleFlags {
    pub is_manager: bool,
    pub is_delivery_crew: bool,
    pub is_admin: bool,
    pub is_customer: bool,
}

impl RoleFlags {
    pub fn classify(groups: &[String], is_superuser: bool) -> Self {
        let is_manager = groups.iter().any(|g| g == MANAGER_GROUP);
        let is_delivery_crew = groups.iter().any(|g| g == DELIVERY_CREW_GROUP);
        let is_admin = is_superuser;
        Self {
            is_manager,
            is_delivery_crew,
            is_admin,
            is_customer: !is_manager && !is_delivery_crew && !is_admin,
        }
    }

    /// Derived fresh from group membership on every request; never cached.
    pub async fn load(conn: &OrmConn, user_id: Uuid) -> AppResult<Self> {
        let user = Users::find_by_id(user_id)
            .one(conn)
            .await?
            .ok_or(AppError::NotFound)?;

        let groups: Vec<String> = UserGroups::find()
            .filter(user_groups::Column::UserId.eq(user_id))
            .all(conn)
            .await?
            .into_iter()
            .map(|membership| membership.name)
            .collect();

        Ok(Self::classify(&groups, user.is_superuser))
    }

    pub fn can_manage(&self) -> bool {
        self.is_manager || self.is_admin
    }

    pub fn require_manager(&self) -> AppResult<()> {
        if self.can_manage() {
            Ok(())
        } else {
            Err(AppError::unauthorized())
        }
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::unauthorized())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_groups_and_no_superuser_is_customer() {
        let flags = RoleFlags::classify(&[], false);
        assert!(flags.is_customer);
        assert!(!flags.is_manager);
        assert!(!flags.is_delivery_crew);
        assert!(!flags.is_admin);
    }

    #[test]
    fn manager_group_clears_customer_flag() {
        let flags = RoleFlags::classify(&[MANAGER_GROUP.to_string()], false);
        assert!(flags.is_manager);
        assert!(!flags.is_customer);
        assert!(flags.can_manage());
    }

    #[test]
    fn superuser_is_admin_not_customer() {
        let flags = RoleFlags::classify(&[], true);
        assert!(flags.is_admin);
        assert!(!flags.is_customer);
        assert!(flags.can_manage());
        assert!(flags.require_admin().is_ok());
    }

    #[test]
    fn delivery_crew_cannot_manage() {
        let flags = RoleFlags::classify(&[DELIVERY_CREW_GROUP.to_string()], false);
        assert!(flags.is_delivery_crew);
        assert!(!flags.is_customer);
        assert!(flags.require_manager().is_err());
    }

    #[test]
    fn unknown_group_names_are_ignored() {
        let flags = RoleFlags::classify(&["waitstaff".to_string()], false);
        assert!(flags.is_customer);
    }
}
