mod cart;
mod db;
mod error;
mod identity;
mod orders;
mod products;
mod store_config;
mod validation;

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use cart::CartRepository;
use orders::{OrderService, OrdersRepository};
use products::{
    CreateProductRequest, Product, ProductImage, ProductUnit, UpdateProductRequest,
};
use store_config::StoreConfigRepository;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        products::create_product,
        products::list_products,
        products::get_product_by_id,
        products::update_product,
        products::delete_product,
    ),
    components(
        schemas(Product, ProductImage, ProductUnit, CreateProductRequest, UpdateProductRequest)
    ),
    tags(
        (name = "products", description = "Product catalog management endpoints")
    ),
    info(
        title = "Market API",
        version = "1.0.0",
        description = "RESTful backend for the market storefront: catalog, cart, store configuration and orders",
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub product_repo: products::ProductRepository,
    pub cart_repo: CartRepository,
    pub config_repo: StoreConfigRepository,
    pub order_service: OrderService,
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
fn create_router(db: PgPool) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let product_repo = products::ProductRepository::new(db.clone());
    let cart_repo = CartRepository::new(db.clone());
    let config_repo = StoreConfigRepository::new(db.clone());
    let orders_repo = OrdersRepository::new(db.clone());
    let order_service = OrderService::new(
        orders_repo,
        cart_repo.clone(),
        product_repo.clone(),
        config_repo.clone(),
    );

    let state = AppState {
        db,
        product_repo,
        cart_repo,
        config_repo,
        order_service,
    };

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Catalog
        .route("/api/v1/products", post(products::create_product))
        .route("/api/v1/products", get(products::list_products))
        .route("/api/v1/products/:id", get(products::get_product_by_id))
        .route("/api/v1/products/:id", put(products::update_product))
        .route("/api/v1/products/:id", delete(products::delete_product))
        // Cart
        .route("/api/v1/cart", get(cart::get_cart))
        .route("/api/v1/cart", delete(cart::clear_cart))
        .route("/api/v1/cart/items", post(cart::add_cart_item))
        .route("/api/v1/cart/items/:product_id", put(cart::update_cart_item))
        .route(
            "/api/v1/cart/items/:product_id",
            delete(cart::remove_cart_item),
        )
        // Store configuration
        .route("/api/v1/storeconfig", get(store_config::get_store_config))
        .route("/api/v1/storeconfig", put(store_config::update_store_config))
        .route("/api/v1/storeconfig/compute", post(store_config::compute_quote))
        .route(
            "/api/v1/storeconfig/reserve-slot",
            post(store_config::reserve_slot),
        )
        .route("/api/v1/storeconfig/slots/seed", post(store_config::seed_slots))
        // Orders
        .route("/api/v1/orders", post(orders::create_order_handler))
        .route("/api/v1/orders", get(orders::get_order_history_handler))
        .route("/api/v1/orders/:order_id", get(orders::get_order_by_id_handler))
        .route(
            "/api/v1/orders/:order_id/cancel",
            patch(orders::cancel_order_handler),
        )
        // Admin
        .route("/api/v1/admin/orders", get(orders::get_all_orders_handler))
        .route(
            "/api/v1/admin/orders/:order_id/status",
            patch(orders::update_order_status_handler),
        )
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Market API - Starting...");

    // Get configuration from environment variables
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    // Create the application router
    let app = create_router(db_pool);

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Market API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}
