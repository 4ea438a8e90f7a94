use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set, TransactionTrait,
};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{OrderItemList, OrderList, OrderWithItems},
    entity::{
        CartItems, OrderItems, Orders, Users,
        cart_items::Column as CartCol,
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Model as OrderModel},
        users::Column as UserCol,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    roles::RoleFlags,
    state::AppState,
};

/// PUT replaces the mutable fields wholesale; PATCH merges into them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    Replace,
    Merge,
}

impl UpdateMode {
    fn verb(&self) -> &'static str {
        match self {
            UpdateMode::Replace => "PUT",
            UpdateMode::Merge => "PATCH",
        }
    }
}

pub async fn list_orders(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderList>> {
    let role = RoleFlags::load(&state.orm, user.user_id).await?;

    let mut finder = Orders::find();
    if role.is_customer {
        finder = finder.filter(OrderCol::UserId.eq(user.user_id));
    } else if role.is_delivery_crew {
        finder = finder.filter(OrderCol::DeliveryCrewId.eq(user.user_id));
    }
    // Managers and admins see every order.

    let items: Vec<Order> = finder
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Orders",
        OrderList { items },
        Some(Meta::empty()),
    ))
}

/// Convert the requester's cart into an order plus order items, atomically.
/// Either every cart line becomes an order item and the cart is emptied, or
/// nothing is written at all.
pub async fn checkout(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderWithItems>> {
    let txn = state.orm.begin().await?;

    let cart_lines = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .lock(LockType::Update)
        .all(&txn)
        .await?;

    if cart_lines.is_empty() {
        return Err(AppError::BadRequest(
            "This user has 0 items in cart!".into(),
        ));
    }

    // Totals come from the stored line prices, never from the current menu
    // prices; the cart is a price-at-add-time snapshot.
    let total: Decimal = cart_lines.iter().map(|line| line.price).sum();

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        delivery_crew_id: Set(None),
        status: Set(false),
        total: Set(total),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(cart_lines.len());
    for line in &cart_lines {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            menu_item_id: Set(line.menu_item_id),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            price: Set(line.price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item));
    }

    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order and order items have been created!",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let role = RoleFlags::load(&state.orm, user.user_id).await?;

    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if role.is_customer && order.user_id != user.user_id {
        return Err(AppError::Unauthorized(
            "You are a customer and this order does not belong to you".into(),
        ));
    }

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// All order lines belonging to the requester's own orders.
pub async fn list_my_order_items(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OrderItemList>> {
    let items: Vec<OrderItem> = OrderItems::find()
        .join(
            JoinType::InnerJoin,
            crate::entity::order_items::Relation::Orders.def(),
        )
        .filter(OrderCol::UserId.eq(user.user_id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Order items",
        OrderItemList { items },
        None,
    ))
}

pub async fn update_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    mode: UpdateMode,
    payload: &Map<String, Value>,
) -> AppResult<ApiResponse<Order>> {
    let role = RoleFlags::load(&state.orm, user.user_id).await?;

    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if role.is_customer {
        if order.user_id != user.user_id {
            return Err(AppError::Unauthorized(
                "You are a customer and this order does not belong to you".into(),
            ));
        }
        return Err(AppError::MethodNotAllowed(format!(
            "{} method not allowed for customers",
            mode.verb()
        )));
    }

    let (new_status, crew_change) = if role.is_delivery_crew {
        if mode == UpdateMode::Replace {
            return Err(AppError::MethodNotAllowed(
                "PUT method not allowed for Delivery crew".into(),
            ));
        }
        validate_crew_patch(payload)?;
        (Some(parse_status_flag(payload.get("status"))?), None)
    } else {
        // Manager or admin.
        let crew_change = match payload.get("delivery_crew") {
            Some(value) => {
                let username = value.as_str().ok_or_else(|| {
                    AppError::BadRequest("delivery_crew must be a username string".into())
                })?;
                let crew = Users::find()
                    .filter(UserCol::Username.eq(username))
                    .one(&state.orm)
                    .await?
                    .ok_or(AppError::NotFound)?;
                Some(Some(crew.id))
            }
            None => match mode {
                UpdateMode::Replace => {
                    return Err(AppError::BadRequest(
                        "You must provide a delivery crew member to update this order".into(),
                    ));
                }
                // Merge keeps the currently assigned crew.
                UpdateMode::Merge => None,
            },
        };
        let new_status = match payload.get("status") {
            Some(value) => Some(parse_status_flag(Some(value))?),
            None => match mode {
                UpdateMode::Replace => Some(false),
                UpdateMode::Merge => None,
            },
        };
        (new_status, crew_change)
    };

    // Delivery is a one-way transition.
    if order.status && new_status == Some(false) {
        return Err(AppError::BadRequest(
            "A delivered order cannot be reverted to pending".into(),
        ));
    }

    let mut active: OrderActive = order.into();
    if let Some(status) = new_status {
        active.status = Set(status);
    }
    if let Some(crew_id) = crew_change {
        active.delivery_crew_id = Set(crew_id);
    }
    let order = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order has been updated!",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let role = RoleFlags::load(&state.orm, user.user_id).await?;
    role.require_manager()?;

    let result = Orders::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_delete",
        Some("orders"),
        Some(serde_json::json!({ "order_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::message("Order has been deleted!"))
}

/// Delivery crew may only send `{"status": <bool>}` and nothing else.
fn validate_crew_patch(payload: &Map<String, Value>) -> AppResult<()> {
    if payload.len() > 1 || payload.contains_key("delivery_crew") {
        return Err(AppError::BadRequest(
            "As a delivery crew member, you can only update the order status".into(),
        ));
    }
    Ok(())
}

fn parse_status_flag(value: Option<&Value>) -> AppResult<bool> {
    match value {
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(Value::Number(n)) if n.as_i64() == Some(0) => Ok(false),
        Some(Value::Number(n)) if n.as_i64() == Some(1) => Ok(true),
        _ => Err(AppError::BadRequest(
            "status must be a boolean flag".into(),
        )),
    }
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        delivery_crew_id: model.delivery_crew_id,
        status: model.status,
        total: model.total,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        menu_item_id: model.menu_item_id,
        quantity: model.quantity,
        unit_price: model.unit_price,
        price: model.price,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn crew_patch_with_status_only_is_accepted() {
        assert!(validate_crew_patch(&map(json!({ "status": true }))).is_ok());
    }

    #[test]
    fn crew_patch_with_delivery_crew_is_rejected() {
        assert!(validate_crew_patch(&map(json!({ "delivery_crew": "jonahdoe" }))).is_err());
    }

    #[test]
    fn crew_patch_with_extra_fields_is_rejected() {
        let payload = map(json!({ "status": true, "total": "0.00" }));
        assert!(validate_crew_patch(&payload).is_err());
    }

    #[test]
    fn status_flag_accepts_bools_and_binary_integers() {
        assert!(parse_status_flag(Some(&json!(true))).unwrap());
        assert!(!parse_status_flag(Some(&json!(false))).unwrap());
        assert!(parse_status_flag(Some(&json!(1))).unwrap());
        assert!(!parse_status_flag(Some(&json!(0))).unwrap());
    }

    #[test]
    fn status_flag_rejects_other_values() {
        assert!(parse_status_flag(None).is_err());
        assert!(parse_status_flag(Some(&json!("delivered"))).is_err());
        assert!(parse_status_flag(Some(&json!(2))).is_err());
    }
}
