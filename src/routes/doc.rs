use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{Claims, LoginRequest, LoginResponse, RegisterRequest, UserList},
        cart::{AddToCartRequest, CartLineDto, CartList},
        groups::GroupMemberRequest,
        menu_items::{CategoryList, CreateCategoryRequest, MenuItemList, MenuItemRequest},
        orders::{OrderItemList, OrderList, OrderWithItems},
    },
    models::{CartItem, Category, MenuItem, Order, OrderItem, User},
    response::{ApiResponse, Meta},
    routes::{auth, cart, groups, health, menu_items, orders, params},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::list_users,
        auth::me,
        auth::login,
        menu_items::list_menu_items,
        menu_items::get_menu_item,
        menu_items::create_menu_item,
        menu_items::update_menu_item,
        menu_items::delete_menu_item,
        menu_items::list_categories,
        menu_items::create_category,
        cart::cart_list,
        cart::add_to_cart,
        cart::clear_cart,
        orders::list_orders,
        orders::checkout,
        orders::list_order_items,
        orders::get_order,
        orders::replace_order,
        orders::patch_order,
        orders::delete_order,
        groups::list_managers,
        groups::add_manager,
        groups::remove_manager,
        groups::list_delivery_crew,
        groups::add_delivery_crew,
        groups::remove_delivery_crew,
    ),
    components(
        schemas(
            User,
            Category,
            MenuItem,
            CartItem,
            Order,
            OrderItem,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            Claims,
            UserList,
            MenuItemRequest,
            CreateCategoryRequest,
            MenuItemList,
            CategoryList,
            AddToCartRequest,
            CartLineDto,
            CartList,
            OrderList,
            OrderWithItems,
            OrderItemList,
            GroupMemberRequest,
            params::Pagination,
            params::MenuItemQuery,
            Meta,
            ApiResponse<User>,
            ApiResponse<MenuItem>,
            ApiResponse<MenuItemList>,
            ApiResponse<CategoryList>,
            ApiResponse<CartList>,
            ApiResponse<OrderList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderItemList>,
            ApiResponse<UserList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Account creation and login"),
        (name = "Menu items", description = "Menu item and category endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Checkout and order lifecycle"),
        (name = "Groups", description = "Manager and delivery crew membership"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
