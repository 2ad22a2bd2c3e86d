//! # Scribe API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use middleware::auth::TokenContext;
use observability::RequestIdMiddleware;
use state::Bootstrap;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();
    tracing::info!("Starting Scribe API Server on {}:{}", config.host, config.port);

    let bootstrap = Bootstrap::new(&config).await?;
    let state = bootstrap.state;

    HttpServer::new(move || {
        App::new()
            .wrap(TokenContext)
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    #[cfg(feature = "postgres")]
    {
        if let Some(db) = bootstrap.db {
            if let Err(e) = db.close().await {
                tracing::warn!("Failed to close database connections: {}", e);
            }
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}
