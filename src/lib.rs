pub mod config;
pub mod database;
pub mod error;
pub mod filters;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod monitor;
pub mod state;
pub mod stock;
pub mod utils;
pub mod validation;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use handlers::{auth, categories, dashboard, items, products, sale_orders, stock_movements, suppliers};
use state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Public routes
        .route("/", get(handlers::index))
        .route("/signup/", get(auth::signup_page).post(auth::signup))
        .route("/login/", get(auth::login_page).post(auth::login))
        .route("/logout/", get(auth::logout).post(auth::logout))
        // Inventory items, scoped to the signed-in user
        .route("/dashboard/", get(dashboard::dashboard))
        .route("/add-item/", get(items::add_item_page).post(items::add_item))
        .route("/edit-item/:id", get(items::edit_item_page).post(items::edit_item))
        .route("/delete-item/:id", get(items::delete_item_page).post(items::delete_item))
        // Products
        .route("/products/", get(products::list_products))
        .route("/add-product/", get(products::add_product_page).post(products::add_product))
        .route("/edit-product/:id/", get(products::edit_product_page).post(products::edit_product))
        .route("/delete-product/:id/", get(products::delete_product_page).post(products::delete_product))
        // Suppliers
        .route("/suppliers/", get(suppliers::list_suppliers))
        .route("/suppliers/add/", get(suppliers::add_supplier_page).post(suppliers::add_supplier))
        .route("/suppliers/edit/:id/", get(suppliers::edit_supplier_page).post(suppliers::edit_supplier))
        .route("/suppliers/delete/:id/", get(suppliers::delete_supplier_page).post(suppliers::delete_supplier))
        // Sale orders
        .route("/sale-orders/", get(sale_orders::list_sale_orders))
        .route("/sale-orders/add/", get(sale_orders::add_sale_order_page).post(sale_orders::add_sale_order))
        .route(
            "/sale-orders/edit/:id/",
            get(sale_orders::edit_sale_order_page).post(sale_orders::edit_sale_order),
        )
        .route(
            "/sale-orders/delete/:id/",
            get(sale_orders::delete_sale_order_page).post(sale_orders::delete_sale_order),
        )
        // Stock movements
        .route("/stock-movements/", get(stock_movements::list_stock_movements))
        .route(
            "/add-stock-movement/",
            get(stock_movements::add_stock_movement_page).post(stock_movements::add_stock_movement),
        )
        .route(
            "/stock-movements/edit/:id/",
            get(stock_movements::edit_stock_movement_page).post(stock_movements::edit_stock_movement),
        )
        .route(
            "/stock-movements/delete/:id/",
            get(stock_movements::delete_stock_movement_page).post(stock_movements::delete_stock_movement),
        )
        // Categories
        .route("/categories/", get(categories::list_categories))
        .route("/categories/add/", get(categories::add_category_page).post(categories::add_category))
        .route("/categories/edit/:id/", get(categories::edit_category_page).post(categories::edit_category))
        .route(
            "/categories/delete/:id/",
            get(categories::delete_category_page).post(categories::delete_category),
        )
        // Static files
        .nest_service("/static", ServeDir::new("static"))
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
