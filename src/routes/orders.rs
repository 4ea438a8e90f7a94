use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::orders::{OrderItemList, OrderList, OrderWithItems},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Order,
    response::ApiResponse,
    services::order_service::{self, UpdateMode},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders).post(checkout))
        .route("/order-items", get(list_order_items))
        .route(
            "/{id}",
            get(get_order)
                .put(replace_order)
                .patch(patch_order)
                .delete(delete_order),
        )
}

#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "Orders visible to the requester's role", body = ApiResponse<OrderList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    responses(
        (status = 201, description = "Checkout: convert the cart into an order", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Cart is empty"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderWithItems>>)> {
    let resp = order_service::checkout(&state, &user).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/orders/order-items",
    responses(
        (status = 200, description = "Order items from the requester's orders", body = ApiResponse<OrderItemList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_order_items(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OrderItemList>>> {
    let resp = order_service::list_my_order_items(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Get order with items", body = ApiResponse<OrderWithItems>),
        (status = 401, description = "Order belongs to another customer"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = order_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Replace order status and delivery crew (manager only)", body = ApiResponse<Order>),
        (status = 400, description = "Missing delivery crew or invalid status"),
        (status = 401, description = "Not authorized"),
        (status = 405, description = "Method not allowed for this role"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn replace_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let payload = as_object(&body)?;
    let resp = order_service::update_order(&state, &user, id, UpdateMode::Replace, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Update order status and/or delivery crew", body = ApiResponse<Order>),
        (status = 400, description = "Payload not allowed for this role"),
        (status = 401, description = "Not authorized"),
        (status = 405, description = "Method not allowed for this role"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn patch_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let payload = as_object(&body)?;
    let resp = order_service::update_order(&state, &user, id, UpdateMode::Merge, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Delete order (manager only)", body = ApiResponse<serde_json::Value>),
        (status = 401, description = "Not authorized"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = order_service::delete_order(&state, &user, id).await?;
    Ok(Json(resp))
}

// Order updates are inspected field-by-field, so take the raw JSON object.
fn as_object(body: &serde_json::Value) -> AppResult<&serde_json::Map<String, serde_json::Value>> {
    body.as_object()
        .ok_or_else(|| AppError::BadRequest("Expected a JSON object".into()))
}
