use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::menu_items::{CategoryList, CreateCategoryRequest, MenuItemList, MenuItemRequest},
    entity::{
        Categories, MenuItems,
        categories::{
            ActiveModel as CategoryActive, Column as CategoryCol, Model as CategoryModel,
        },
        menu_items::{ActiveModel as MenuItemActive, Column as MenuItemCol, Model as MenuItemModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Category, MenuItem},
    response::{ApiResponse, Meta},
    roles::RoleFlags,
    routes::params::{MenuItemQuery, MenuItemSortBy, parse_ordering},
    state::AppState,
};

pub async fn list_menu_items(
    state: &AppState,
    query: MenuItemQuery,
) -> AppResult<ApiResponse<MenuItemList>> {
    let (page, perpage, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(category) = query.category.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", category);
        condition = condition.add(Expr::col((Categories, CategoryCol::Title)).ilike(pattern));
    }

    if let Some(to_price) = query.to_price {
        condition = condition.add(MenuItemCol::Price.eq(to_price));
    }

    if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(Expr::col((MenuItems, MenuItemCol::Title)).ilike(pattern));
    }

    let ordering = match query.ordering.as_deref() {
        Some(raw) => parse_ordering(raw)
            .map_err(|field| AppError::BadRequest(format!("Unknown ordering field: {field}")))?,
        None => Vec::new(),
    };

    let mut finder = MenuItems::find()
        .find_also_related(Categories)
        .filter(condition);

    for spec in &ordering {
        let direction = if spec.descending {
            Order::Desc
        } else {
            Order::Asc
        };
        finder = match spec.field {
            MenuItemSortBy::Title => finder.order_by(MenuItemCol::Title, direction),
            MenuItemSortBy::Price => finder.order_by(MenuItemCol::Price, direction),
            MenuItemSortBy::Featured => finder.order_by(MenuItemCol::Featured, direction),
            MenuItemSortBy::Category => finder.order_by(CategoryCol::Title, direction),
            MenuItemSortBy::CreatedAt => finder.order_by(MenuItemCol::CreatedAt, direction),
        };
    }
    if ordering.is_empty() {
        finder = finder.order_by_asc(MenuItemCol::CreatedAt);
    }

    let total = finder.clone().count(&state.orm).await? as i64;

    // A page past the end simply comes back empty.
    let items = finder
        .limit(perpage as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(item, category)| menu_item_from_entity(item, category))
        .collect();

    let meta = Meta::new(page, perpage, total);
    Ok(ApiResponse::success(
        "Menu items",
        MenuItemList { items },
        Some(meta),
    ))
}

pub async fn get_menu_item(state: &AppState, id: Uuid) -> AppResult<ApiResponse<MenuItem>> {
    let found = MenuItems::find_by_id(id)
        .find_also_related(Categories)
        .one(&state.orm)
        .await?;
    let (item, category) = match found {
        Some(pair) => pair,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success(
        "Menu item",
        menu_item_from_entity(item, category),
        None,
    ))
}

pub async fn create_menu_item(
    state: &AppState,
    user: &AuthUser,
    payload: MenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    let role = RoleFlags::load(&state.orm, user.user_id).await?;
    role.require_manager()?;

    if payload.price <= Decimal::ZERO {
        return Err(AppError::BadRequest("price must be greater than 0".into()));
    }

    let category = find_category_by_title(state, &payload.category).await?;
    let title = payload.title.clone();

    let active = MenuItemActive {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title),
        price: Set(payload.price),
        featured: Set(payload.featured),
        category_id: Set(category.id),
        created_at: NotSet,
    };
    let item = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "menu_item_create",
        Some("menu_items"),
        Some(serde_json::json!({ "menu_item_id": item.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        format!("New menu item {title} has been created!"),
        menu_item_from_entity(item, Some(category)),
        Some(Meta::empty()),
    ))
}

pub async fn update_menu_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: MenuItemRequest,
) -> AppResult<ApiResponse<MenuItem>> {
    let role = RoleFlags::load(&state.orm, user.user_id).await?;
    role.require_manager()?;

    let existing = MenuItems::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(item) => item,
        None => return Err(AppError::NotFound),
    };

    if payload.price <= Decimal::ZERO {
        return Err(AppError::BadRequest("price must be greater than 0".into()));
    }

    let category = find_category_by_title(state, &payload.category).await?;

    let mut active: MenuItemActive = existing.into();
    active.title = Set(payload.title);
    active.price = Set(payload.price);
    active.featured = Set(payload.featured);
    active.category_id = Set(category.id);
    let item = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "menu_item_update",
        Some("menu_items"),
        Some(serde_json::json!({ "menu_item_id": item.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Menu item has been updated!",
        menu_item_from_entity(item, Some(category)),
        Some(Meta::empty()),
    ))
}

pub async fn delete_menu_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let role = RoleFlags::load(&state.orm, user.user_id).await?;
    role.require_manager()?;

    let result = MenuItems::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "menu_item_delete",
        Some("menu_items"),
        Some(serde_json::json!({ "menu_item_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::message("Menu item has been deleted!"))
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(CategoryCol::Title)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        None,
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let role = RoleFlags::load(&state.orm, user.user_id).await?;
    role.require_manager()?;

    let active = CategoryActive {
        id: Set(Uuid::new_v4()),
        slug: Set(payload.slug),
        title: Set(payload.title),
    };
    let category = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "category_create",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

async fn find_category_by_title(state: &AppState, title: &str) -> AppResult<CategoryModel> {
    Categories::find()
        .filter(CategoryCol::Title.eq(title))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFoundDetail(format!("Category {title} not found")))
}

fn menu_item_from_entity(model: MenuItemModel, category: Option<CategoryModel>) -> MenuItem {
    MenuItem {
        id: model.id,
        title: model.title,
        price: model.price,
        featured: model.featured,
        category: category.map(|c| c.title).unwrap_or_default(),
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        slug: model.slug,
        title: model.title,
    }
}
