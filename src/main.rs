use std::sync::Arc;

use dotenvy::dotenv;
use shop_order_service::infrastructure::notifier::{spawn_notification_worker, LogMailer};
use shop_order_service::{build_order_service, build_server, create_pool, run_migrations, Config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().unwrap_or_else(|e| {
        log::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    let pool = create_pool(&config.database_url).map_err(std::io::Error::other)?;
    let applied = run_migrations(&pool).map_err(std::io::Error::other)?;
    log::info!("Applied {} pending migration(s)", applied);

    let (dispatcher, _worker) = spawn_notification_worker(
        Arc::new(LogMailer),
        config.shop_name.clone(),
        config.notify_timeout,
    );
    let service = build_order_service(pool, Arc::new(dispatcher));

    log::info!(
        "Starting server at http://{}:{}{}",
        config.host,
        config.port,
        config.api_prefix
    );

    build_server(service, &config.host, config.port, &config.api_prefix)?.await
}
