//! Seed a handful of categories, menu items and users for local development.

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use password_hash::rand_core::OsRng;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use axum_restaurant_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
    entity::{
        categories::ActiveModel as CategoryActive, menu_items::ActiveModel as MenuItemActive,
        user_groups::ActiveModel as MembershipActive, users::ActiveModel as UserActive,
    },
    roles,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;
    let orm = create_orm_conn(&config.database_url).await?;

    let breakfast = CategoryActive {
        id: Set(Uuid::new_v4()),
        slug: Set("breakfast".into()),
        title: Set("Breakfast".into()),
    }
    .insert(&orm)
    .await?;

    let drinks = CategoryActive {
        id: Set(Uuid::new_v4()),
        slug: Set("drinks".into()),
        title: Set("Drinks".into()),
    }
    .insert(&orm)
    .await?;

    for (title, price, featured, category_id) in [
        ("Pancake", Decimal::new(500, 2), true, breakfast.id),
        ("Shawarma", Decimal::new(1300, 2), false, breakfast.id),
        ("Tea", Decimal::new(200, 2), false, drinks.id),
    ] {
        MenuItemActive {
            id: Set(Uuid::new_v4()),
            title: Set(title.into()),
            price: Set(price),
            featured: Set(featured),
            category_id: Set(category_id),
            created_at: NotSet,
        }
        .insert(&orm)
        .await?;
    }

    let admin = seed_user(&orm, "admin", "admin@example.com", "admin123", true).await?;
    let manager = seed_user(&orm, "manager", "manager@example.com", "manager123", false).await?;
    let crew = seed_user(&orm, "crew", "crew@example.com", "crew123", false).await?;
    seed_user(&orm, "customer", "customer@example.com", "customer123", false).await?;

    MembershipActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(manager.id),
        name: Set(roles::MANAGER_GROUP.into()),
    }
    .insert(&orm)
    .await?;

    MembershipActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(crew.id),
        name: Set(roles::DELIVERY_CREW_GROUP.into()),
    }
    .insert(&orm)
    .await?;

    println!("seeded users admin/manager/crew/customer (admin id {})", admin.id);
    Ok(())
}

async fn seed_user(
    orm: &axum_restaurant_api::db::OrmConn,
    username: &str,
    email: &str,
    password: &str,
    is_superuser: bool,
) -> anyhow::Result<axum_restaurant_api::entity::users::Model> {
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.into()),
        email: Set(email.into()),
        password_hash: Set(password_hash),
        is_superuser: Set(is_superuser),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;

    Ok(user)
}
