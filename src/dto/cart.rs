use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::MenuItem;

/// `menuitem` is the menu item title, mirroring the public API contract.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub menuitem: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartLineDto {
    pub id: Uuid,
    pub menu_item: MenuItem,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub price: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartList {
    pub items: Vec<CartLineDto>,
}
