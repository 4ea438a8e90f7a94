use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Category, MenuItem};

/// Payload for create and full update; `category` is the category title and
/// is resolved to its id before persisting.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MenuItemRequest {
    pub title: String,
    pub price: Decimal,
    pub featured: bool,
    pub category: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuItemList {
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}
