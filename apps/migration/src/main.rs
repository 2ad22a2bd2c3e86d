//! Migration CLI tool.
//!
//! `migration seed` inserts the default accounts; every other invocation is
//! handed to the SeaORM migration CLI (`up`, `down`, `fresh`, `status`, ...).

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt().with_env_filter("info").init();

    if std::env::args().nth(1).as_deref() == Some("seed") {
        if let Err(e) = migration::seed::run_from_env().await {
            tracing::error!("Seeding failed: {}", e);
            std::process::exit(1);
        }
        return;
    }

    cli::run_cli(migration::Migrator).await;
}
