use std::sync::Arc;

use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod service;
mod store;
#[cfg(test)]
mod testing;
mod utils;

use config::Config;
use db::init_db;

use crate::docs::ApiDoc;
use crate::service::timezone::{TimeZoneDbClient, TimeZoneLookup};
use crate::store::Store;
use crate::store::mysql::MySqlStore;
use crate::utils::revocation_sweep;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(addr = %config.server_addr, "Server starting...");

    let pool = init_db(&config.database_url)
        .await
        .context("failed to connect to the database")?;
    let store: Arc<dyn Store> = Arc::new(MySqlStore::new(pool));

    if config.timezonedb_api_key.is_none() {
        warn!("TIMEZONEDB_API_KEY not set, offices without a stored time zone use server time");
    }
    let zones: Arc<dyn TimeZoneLookup> = Arc::new(
        TimeZoneDbClient::new(
            config.timezonedb_url.clone(),
            config.timezonedb_api_key.clone(),
            config.timezone_lookup_timeout,
        )
        .context("failed to build the time-zone client")?,
    );

    actix_web::rt::spawn(revocation_sweep::run(
        store.clone(),
        config.revocation_purge_interval,
    ));

    let server_addr = config.server_addr.clone();
    let config_data = Data::new(config);
    let store_data: Data<dyn Store> = Data::from(store);
    let zones_data: Data<dyn TimeZoneLookup> = Data::from(zones);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // wildcard {_:.*} so the UI's JS/CSS assets resolve
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(config_data.clone())
            .app_data(store_data.clone())
            .app_data(zones_data.clone())
            .configure(|cfg| routes::configure(cfg, &config_data))
    })
    .bind(&server_addr)?
    .run()
    .await?;

    Ok(())
}
