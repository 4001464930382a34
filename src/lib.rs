pub mod application;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::discount_service::DiscountService;
use application::order_service::OrderService;
use infrastructure::discount_repo::DieselDiscountRepository;
use infrastructure::order_repo::DieselOrderRepository;

pub use db::{create_pool, DbPool};

pub type AppOrderService = OrderService<DieselOrderRepository, DieselDiscountRepository>;
pub type AppDiscountService = DiscountService<DieselDiscountRepository>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::list_orders,
        handlers::orders::update_order_status,
        handlers::discounts::create_discount_code,
        handlers::discounts::list_discount_codes,
        handlers::discounts::get_discount_code,
        handlers::discounts::update_discount_code,
        handlers::discounts::delete_discount_code,
        handlers::discounts::validate_discount_code,
    ),
    components(schemas(
        handlers::orders::CheckoutItemRequest,
        handlers::orders::CheckoutRequest,
        handlers::orders::OrderItemResponse,
        handlers::orders::StatusChangeResponse,
        handlers::orders::OrderResponse,
        handlers::orders::UpdateStatusRequest,
        handlers::orders::ListOrdersResponse,
        handlers::discounts::CreateDiscountCodeRequest,
        handlers::discounts::UpdateDiscountCodeRequest,
        handlers::discounts::DiscountCodeResponse,
        handlers::discounts::ListDiscountCodesResponse,
        handlers::discounts::ValidateDiscountRequest,
        handlers::discounts::ValidateDiscountResponse,
    )),
    tags(
        (name = "orders", description = "Checkout and order lifecycle"),
        (name = "discount-codes", description = "Discount code management and validation"),
    )
)]
pub struct ApiDoc;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let order_service = web::Data::new(OrderService::new(
        DieselOrderRepository::new(pool.clone()),
        DieselDiscountRepository::new(pool.clone()),
    ));
    let discount_service = web::Data::new(DiscountService::new(DieselDiscountRepository::new(
        pool,
    )));

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(order_service.clone())
            .app_data(discount_service.clone())
            .wrap(Logger::default())
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("", web::get().to(handlers::orders::list_orders))
                    .route("/{id}", web::get().to(handlers::orders::get_order))
                    .route(
                        "/{id}/status",
                        web::patch().to(handlers::orders::update_order_status),
                    ),
            )
            .service(
                web::scope("/discount-codes")
                    .route(
                        "/validate",
                        web::post().to(handlers::discounts::validate_discount_code),
                    )
                    .route("", web::post().to(handlers::discounts::create_discount_code))
                    .route("", web::get().to(handlers::discounts::list_discount_codes))
                    .route("/{id}", web::get().to(handlers::discounts::get_discount_code))
                    .route(
                        "/{id}",
                        web::put().to(handlers::discounts::update_discount_code),
                    )
                    .route(
                        "/{id}",
                        web::delete().to(handlers::discounts::delete_discount_code),
                    ),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
