pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod openapi;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::order_service::OrderService;
use crate::domain::ports::NotificationDispatcher;
use crate::infrastructure::lookups::{DieselAccountLookup, DieselCatalogLookup};
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::openapi::ApiDoc;

pub use config::Config;
pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Run any pending Diesel migrations and return how many were applied.
pub fn run_migrations(pool: &DbPool) -> Result<usize, BoxError> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    Ok(applied.len())
}

/// Wire the diesel-backed adapters into an `OrderService`.
pub fn build_order_service(
    pool: DbPool,
    dispatcher: Arc<dyn NotificationDispatcher>,
) -> OrderService {
    OrderService::new(
        Arc::new(DieselOrderRepository::new(pool.clone())),
        Arc::new(DieselAccountLookup::new(pool.clone())),
        Arc::new(DieselCatalogLookup::new(pool)),
        dispatcher,
    )
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The order routes are mounted under `api_prefix`; `/health` and the
/// Swagger UI stay at the root. The caller is responsible for `.await`-ing
/// (or `tokio::spawn`-ing) the returned server.
pub fn build_server(
    service: OrderService,
    host: &str,
    port: u16,
    api_prefix: &str,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(service);
    let api_prefix = api_prefix.to_string();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(Logger::default())
            .route("/health", web::get().to(handlers::health::health))
            .service(web::scope(&api_prefix).configure(handlers::orders::configure))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
