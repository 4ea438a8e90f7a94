use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::cart::{AddToCartRequest, CartLineDto, CartList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::MenuItem,
    response::ApiResponse,
    state::AppState,
};

#[derive(FromRow)]
struct CartWithItemRow {
    cart_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
    price: Decimal,
    menu_item_id: Uuid,
    title: String,
    menu_price: Decimal,
    featured: bool,
    category: String,
    created_at: DateTime<Utc>,
}

pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartList>> {
    let rows = sqlx::query_as::<_, CartWithItemRow>(
        r#"
        SELECT ci.id AS cart_id, ci.quantity, ci.unit_price, ci.price,
               mi.id AS menu_item_id, mi.title, mi.price AS menu_price, mi.featured,
               c.title AS category, mi.created_at
        FROM cart_items ci
        JOIN menu_items mi ON mi.id = ci.menu_item_id
        JOIN categories c ON c.id = mi.category_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    let items: Vec<CartLineDto> = rows
        .into_iter()
        .map(|row| CartLineDto {
            id: row.cart_id,
            menu_item: MenuItem {
                id: row.menu_item_id,
                title: row.title,
                price: row.menu_price,
                featured: row.featured,
                category: row.category,
                created_at: row.created_at,
            },
            quantity: row.quantity,
            unit_price: row.unit_price,
            price: row.price,
        })
        .collect();

    let message = if items.is_empty() {
        "You do not have any items in your cart"
    } else {
        "OK"
    };
    Ok(ApiResponse::success(message, CartList { items }, None))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<crate::models::CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let menu_item: Option<(Uuid, Decimal)> =
        sqlx::query_as("SELECT id, price FROM menu_items WHERE title = $1")
            .bind(payload.menuitem.as_str())
            .fetch_optional(&state.pool)
            .await?;
    let (menu_item_id, unit_price) = match menu_item {
        Some(pair) => pair,
        None => {
            return Err(AppError::NotFoundDetail(format!(
                "Menu item {} not found",
                payload.menuitem
            )));
        }
    };

    // Price is fixed when the line is added; checkout never recomputes it.
    let price = (Decimal::from(payload.quantity) * unit_price).round_dp(2);

    // Re-adding an item replaces the line and reprices at the current menu price.
    let cart_item = sqlx::query_as::<_, crate::models::CartItem>(
        r#"
        INSERT INTO cart_items (id, user_id, menu_item_id, quantity, unit_price, price)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id, menu_item_id)
        DO UPDATE SET quantity = EXCLUDED.quantity,
                      unit_price = EXCLUDED.unit_price,
                      price = EXCLUDED.price
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(menu_item_id)
    .bind(payload.quantity)
    .bind(unit_price)
    .bind(price)
    .fetch_one(&state.pool)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({ "menu_item_id": menu_item_id, "quantity": payload.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Added to cart", cart_item, None))
}

pub async fn clear_cart(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<serde_json::Value>> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user.user_id)
        .execute(&state.pool)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_clear",
        Some("cart_items"),
        None,
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::message("Cart items have been deleted!"))
}
