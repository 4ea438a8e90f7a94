use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::menu_items::{CategoryList, CreateCategoryRequest, MenuItemList, MenuItemRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Category, MenuItem},
    response::ApiResponse,
    routes::params::MenuItemQuery,
    services::menu_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_menu_items).post(create_menu_item))
        .route("/category", get(list_categories).post(create_category))
        .route(
            "/{id}",
            get(get_menu_item)
                .put(update_menu_item)
                .patch(update_menu_item)
                .delete(delete_menu_item),
        )
}

#[utoipa::path(
    get,
    path = "/api/menu-items",
    params(
        ("category" = Option<String>, Query, description = "Category title substring, case-insensitive"),
        ("to_price" = Option<String>, Query, description = "Exact price match"),
        ("search" = Option<String>, Query, description = "Title substring, case-insensitive"),
        ("ordering" = Option<String>, Query, description = "Comma-separated fields, `-` prefix for descending"),
        ("perpage" = Option<i64>, Query, description = "Items per page, default 10"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
    ),
    responses(
        (status = 200, description = "List menu items", body = ApiResponse<MenuItemList>),
        (status = 400, description = "Unknown ordering field"),
    ),
    security(("bearer_auth" = [])),
    tag = "Menu items"
)]
pub async fn list_menu_items(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<MenuItemQuery>,
) -> AppResult<Json<ApiResponse<MenuItemList>>> {
    let resp = menu_service::list_menu_items(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/menu-items/{id}",
    params(
        ("id" = Uuid, Path, description = "Menu item ID")
    ),
    responses(
        (status = 200, description = "Get menu item", body = ApiResponse<MenuItem>),
        (status = 404, description = "Menu item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Menu items"
)]
pub async fn get_menu_item(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let resp = menu_service::get_menu_item(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/menu-items",
    request_body = MenuItemRequest,
    responses(
        (status = 201, description = "Create menu item (manager only)", body = ApiResponse<MenuItem>),
        (status = 401, description = "Not authorized"),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Menu items"
)]
pub async fn create_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<MenuItemRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<MenuItem>>)> {
    let resp = menu_service::create_menu_item(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/menu-items/{id}",
    params(
        ("id" = Uuid, Path, description = "Menu item ID")
    ),
    request_body = MenuItemRequest,
    responses(
        (status = 200, description = "Update menu item (manager only)", body = ApiResponse<MenuItem>),
        (status = 401, description = "Not authorized"),
        (status = 404, description = "Menu item or category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Menu items"
)]
pub async fn update_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<MenuItemRequest>,
) -> AppResult<Json<ApiResponse<MenuItem>>> {
    let resp = menu_service::update_menu_item(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/menu-items/{id}",
    params(
        ("id" = Uuid, Path, description = "Menu item ID")
    ),
    responses(
        (status = 200, description = "Delete menu item (manager only)", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Not authorized"),
        (status = 404, description = "Menu item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Menu items"
)]
pub async fn delete_menu_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = menu_service::delete_menu_item(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/menu-items/category",
    responses(
        (status = 200, description = "List categories", body = ApiResponse<CategoryList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Menu items"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = menu_service::list_categories(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/menu-items/category",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Create category (manager only)", body = ApiResponse<Category>),
        (status = 401, description = "Not authorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Menu items"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let resp = menu_service::create_category(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}
