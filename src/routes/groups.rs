use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::{auth::UserList, groups::GroupMemberRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    roles::Group,
    services::group_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/manager/users", get(list_managers).post(add_manager))
        .route("/manager/users/{id}", delete(remove_manager))
        .route(
            "/delivery-crew/users",
            get(list_delivery_crew).post(add_delivery_crew),
        )
        .route("/delivery-crew/users/{id}", delete(remove_delivery_crew))
}

#[utoipa::path(
    get,
    path = "/api/groups/manager/users",
    responses(
        (status = 200, description = "Users in the manager group", body = ApiResponse<UserList>),
        (status = 401, description = "Not authorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Groups"
)]
pub async fn list_managers(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = group_service::list_group_members(&state, &user, Group::Manager).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/groups/manager/users",
    request_body = GroupMemberRequest,
    responses(
        (status = 201, description = "Add user to the manager group", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Not authorized"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Groups"
)]
pub async fn add_manager(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<GroupMemberRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<serde_json::Value>>)> {
    let resp = group_service::add_group_member(&state, &user, Group::Manager, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/groups/manager/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Remove user from the manager group", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Not authorized"),
        (status = 404, description = "User not found, or not in the group"),
    ),
    security(("bearer_auth" = [])),
    tag = "Groups"
)]
pub async fn remove_manager(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = group_service::remove_group_member(&state, &user, Group::Manager, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/groups/delivery-crew/users",
    responses(
        (status = 200, description = "Users in the delivery crew group", body = ApiResponse<UserList>),
        (status = 401, description = "Not authorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Groups"
)]
pub async fn list_delivery_crew(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UserList>>> {
    let resp = group_service::list_group_members(&state, &user, Group::DeliveryCrew).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/groups/delivery-crew/users",
    request_body = GroupMemberRequest,
    responses(
        (status = 201, description = "Add user to the delivery crew group", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Not authorized"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Groups"
)]
pub async fn add_delivery_crew(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<GroupMemberRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<serde_json::Value>>)> {
    let resp = group_service::add_group_member(&state, &user, Group::DeliveryCrew, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/groups/delivery-crew/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Remove user from the delivery crew group", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Not authorized"),
        (status = 404, description = "User not found, or not in the group"),
    ),
    security(("bearer_auth" = [])),
    tag = "Groups"
)]
pub async fn remove_delivery_crew(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = group_service::remove_group_member(&state, &user, Group::DeliveryCrew, id).await?;
    Ok(Json(resp))
}
