use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::{auth::UserList, groups::GroupMemberRequest},
    entity::{
        UserGroups, Users,
        user_groups::{ActiveModel as MembershipActive, Column as GroupCol},
        users::{Column as UserCol, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    roles::{Group, RoleFlags},
    state::AppState,
};

pub async fn list_group_members(
    state: &AppState,
    user: &AuthUser,
    group: Group,
) -> AppResult<ApiResponse<UserList>> {
    let role = RoleFlags::load(&state.orm, user.user_id).await?;
    role.require_manager()?;

    let items: Vec<User> = Users::find()
        .join(
            JoinType::InnerJoin,
            crate::entity::users::Relation::UserGroups.def(),
        )
        .filter(GroupCol::Name.eq(group.as_str()))
        .order_by_asc(UserCol::Username)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    Ok(ApiResponse::success(
        format!("{} group members", group.display_name()),
        UserList { items },
        None,
    ))
}

pub async fn add_group_member(
    state: &AppState,
    user: &AuthUser,
    group: Group,
    payload: GroupMemberRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let role = RoleFlags::load(&state.orm, user.user_id).await?;
    role.require_manager()?;

    let member = Users::find()
        .filter(UserCol::Username.eq(payload.username.as_str()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    // Membership is a set; adding an existing member is a no-op.
    let membership = MembershipActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(member.id),
        name: Set(group.as_str().to_string()),
    };
    UserGroups::insert(membership)
        .on_conflict(
            OnConflict::columns([GroupCol::UserId, GroupCol::Name])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&state.orm)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "group_add",
        Some("user_groups"),
        Some(serde_json::json!({ "member_id": member.id, "group": group.as_str() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::message(format!(
        "User has been added to the {} group",
        group.display_name()
    )))
}

pub async fn remove_group_member(
    state: &AppState,
    user: &AuthUser,
    group: Group,
    member_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let role = RoleFlags::load(&state.orm, user.user_id).await?;
    role.require_manager()?;

    let member = Users::find_by_id(member_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let result = UserGroups::delete_many()
        .filter(GroupCol::UserId.eq(member.id))
        .filter(GroupCol::Name.eq(group.as_str()))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFoundDetail(format!(
            "User not found in the {} group",
            group.display_name()
        )));
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "group_remove",
        Some("user_groups"),
        Some(serde_json::json!({ "member_id": member.id, "group": group.as_str() })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::message(format!(
        "User has been removed from the {} group",
        group.display_name()
    )))
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        is_superuser: model.is_superuser,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
