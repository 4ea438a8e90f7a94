use axum_restaurant_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::cart::AddToCartRequest,
    dto::groups::GroupMemberRequest,
    entity::{
        UserGroups, categories::ActiveModel as CategoryActive,
        menu_items::ActiveModel as MenuItemActive, user_groups,
        users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    roles::{self, Group},
    routes::params::{MenuItemQuery, Pagination},
    services::{cart_service, group_service, menu_service, order_service},
    services::order_service::UpdateMode,
    state::AppState,
};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, Statement};
use serde_json::{Map, Value, json};
use uuid::Uuid;

fn payload(value: Value) -> Map<String, Value> {
    value.as_object().expect("object payload").clone()
}

// The flow tests share one database and truncate it, so they must not overlap.
static DB_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

// Integration flow: customer fills a cart, checks out, manager assigns a
// delivery crew member, the crew marks the order delivered.
#[tokio::test]
async fn checkout_and_order_lifecycle_flow() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let customer = seed_user(&state, "alice", "alice@example.com", false).await?;
    let other_customer = seed_user(&state, "bob", "bob@example.com", false).await?;
    let manager = seed_user(&state, "carol", "carol@example.com", false).await?;
    let crew = seed_user(&state, "jonahdoe", "jonah@example.com", false).await?;

    add_to_group(&state, manager.user_id, roles::MANAGER_GROUP).await?;
    add_to_group(&state, crew.user_id, roles::DELIVERY_CREW_GROUP).await?;

    seed_menu(&state).await?;

    // Empty-cart checkout must fail without creating anything.
    let err = order_service::checkout(&state, &customer).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    cart_service::add_to_cart(
        &state,
        &customer,
        AddToCartRequest {
            menuitem: "Pancake".into(),
            quantity: 3,
        },
    )
    .await?;
    cart_service::add_to_cart(
        &state,
        &customer,
        AddToCartRequest {
            menuitem: "Tea".into(),
            quantity: 2,
        },
    )
    .await?;

    let checkout = order_service::checkout(&state, &customer).await?;
    let order_with_items = checkout.data.unwrap();
    assert_eq!(order_with_items.order.total, Decimal::new(1900, 2));
    assert_eq!(order_with_items.items.len(), 2);
    assert!(!order_with_items.order.status);
    assert!(order_with_items.order.delivery_crew_id.is_none());

    // The cart is fully consumed by checkout.
    let cart = cart_service::list_cart(&state, &customer).await?;
    assert!(cart.data.unwrap().items.is_empty());

    let order_id = order_with_items.order.id;

    // Another customer cannot see the order.
    let err = order_service::get_order(&state, &other_customer, order_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    // The owner can.
    let own = order_service::get_order(&state, &customer, order_id).await?;
    assert_eq!(own.data.unwrap().order.id, order_id);

    // The owner cannot mutate it.
    let err = order_service::update_order(
        &state,
        &customer,
        order_id,
        UpdateMode::Merge,
        &payload(json!({ "status": true })),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::MethodNotAllowed(_)));

    // Manager replace requires a delivery crew member.
    let err = order_service::update_order(
        &state,
        &manager,
        order_id,
        UpdateMode::Replace,
        &payload(json!({ "status": false })),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let updated = order_service::update_order(
        &state,
        &manager,
        order_id,
        UpdateMode::Replace,
        &payload(json!({ "delivery_crew": "jonahdoe", "status": false })),
    )
    .await?;
    assert_eq!(updated.data.unwrap().delivery_crew_id, Some(crew.user_id));

    // Delivery crew may only send the status field.
    let err = order_service::update_order(
        &state,
        &crew,
        order_id,
        UpdateMode::Merge,
        &payload(json!({ "status": true, "delivery_crew": "jonahdoe" })),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = order_service::update_order(
        &state,
        &crew,
        order_id,
        UpdateMode::Replace,
        &payload(json!({ "status": true })),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::MethodNotAllowed(_)));

    let delivered = order_service::update_order(
        &state,
        &crew,
        order_id,
        UpdateMode::Merge,
        &payload(json!({ "status": true })),
    )
    .await?;
    assert!(delivered.data.unwrap().status);

    // Delivery is one-way.
    let err = order_service::update_order(
        &state,
        &manager,
        order_id,
        UpdateMode::Merge,
        &payload(json!({ "status": false })),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Crew sees the order in their assigned list; the owner in theirs.
    let crew_orders = order_service::list_orders(&state, &crew).await?;
    assert!(
        crew_orders
            .data
            .unwrap()
            .items
            .iter()
            .any(|o| o.id == order_id)
    );

    let items = order_service::list_my_order_items(&state, &customer).await?;
    assert_eq!(items.data.unwrap().items.len(), 2);

    Ok(())
}

#[tokio::test]
async fn menu_item_filtering_and_pagination() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    seed_menu(&state).await?;

    let query = |to_price: Option<Decimal>, page: Option<i64>, ordering: Option<&str>| MenuItemQuery {
        pagination: Pagination {
            page,
            perpage: Some(2),
        },
        category: None,
        to_price,
        search: None,
        ordering: ordering.map(str::to_string),
    };

    // Exact price match.
    let exact = menu_service::list_menu_items(&state, query(Some(Decimal::new(500, 2)), None, None))
        .await?;
    let items = exact.data.unwrap().items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Pancake");

    // Case-insensitive title substring search, alongside the category join.
    let found = menu_service::list_menu_items(
        &state,
        MenuItemQuery {
            pagination: Pagination {
                page: None,
                perpage: Some(10),
            },
            category: None,
            to_price: None,
            search: Some("pan".into()),
            ordering: None,
        },
    )
    .await?;
    let items = found.data.unwrap().items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Pancake");

    // Page past the end yields an empty list, not an error.
    let beyond = menu_service::list_menu_items(&state, query(None, Some(99), None)).await?;
    assert!(beyond.data.unwrap().items.is_empty());

    // Descending price ordering.
    let ordered = menu_service::list_menu_items(&state, query(None, None, Some("-price"))).await?;
    let items = ordered.data.unwrap().items;
    assert_eq!(items[0].title, "Shawarma");

    // Unknown ordering fields are rejected.
    let err = menu_service::list_menu_items(&state, query(None, None, Some("stock")))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    Ok(())
}

#[tokio::test]
async fn duplicate_group_add_is_a_noop() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let manager = seed_user(&state, "dana", "dana@example.com", false).await?;
    let member = seed_user(&state, "erin", "erin@example.com", false).await?;
    add_to_group(&state, manager.user_id, roles::MANAGER_GROUP).await?;

    for _ in 0..2 {
        group_service::add_group_member(
            &state,
            &manager,
            Group::DeliveryCrew,
            GroupMemberRequest {
                username: "erin".into(),
            },
        )
        .await?;
    }

    let memberships = UserGroups::find()
        .filter(user_groups::Column::UserId.eq(member.user_id))
        .all(&state.orm)
        .await?;
    assert_eq!(memberships.len(), 1);

    // Removing a user who is not in the group is a distinct not-found.
    let err = group_service::remove_group_member(&state, &manager, Group::Manager, member.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFoundDetail(_)));

    Ok(())
}

// Allow skipping when no database is configured in the environment.
async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(None);
            }
        };

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    let orm = create_orm_conn(&database_url).await?;

    // Clean tables between runs.
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, cart_items, user_groups, audit_logs, menu_items, categories, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(Some(AppState { pool, orm }))
}

async fn seed_user(
    state: &AppState,
    username: &str,
    email: &str,
    is_superuser: bool,
) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        is_superuser: Set(is_superuser),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        username: user.username,
    })
}

async fn add_to_group(state: &AppState, user_id: Uuid, group: &str) -> anyhow::Result<()> {
    user_groups::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        name: Set(group.to_string()),
    }
    .insert(&state.orm)
    .await?;
    Ok(())
}

async fn seed_menu(state: &AppState) -> anyhow::Result<()> {
    let breakfast = CategoryActive {
        id: Set(Uuid::new_v4()),
        slug: Set("breakfast".into()),
        title: Set("Breakfast".into()),
    }
    .insert(&state.orm)
    .await?;

    let drinks = CategoryActive {
        id: Set(Uuid::new_v4()),
        slug: Set("drinks".into()),
        title: Set("Drinks".into()),
    }
    .insert(&state.orm)
    .await?;

    for (title, price, category_id) in [
        ("Pancake", Decimal::new(500, 2), breakfast.id),
        ("Shawarma", Decimal::new(1300, 2), breakfast.id),
        ("Tea", Decimal::new(200, 2), drinks.id),
    ] {
        MenuItemActive {
            id: Set(Uuid::new_v4()),
            title: Set(title.into()),
            price: Set(price),
            featured: Set(false),
            category_id: Set(category_id),
            created_at: NotSet,
        }
        .insert(&state.orm)
        .await?;
    }

    Ok(())
}
