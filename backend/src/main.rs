//! Backend entry-point: loads settings, wires storage, REST endpoints and
//! OpenAPI docs.

mod server;

use std::env;
use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use lists::inbound::http::health::HealthState;
use lists::inbound::http::session_config::{BuildMode, session_settings_from_env};
use lists::settings::AppSettings;
use server::{ServerConfig, build_storage, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(env::args_os())
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let session = session_settings_from_env(
        &mockable::DefaultEnv::new(),
        BuildMode::from_debug_assertions(),
    )
    .wrap_err("invalid session configuration")?;
    let bind_addr = settings
        .bind_addr()
        .wrap_err("invalid LISTS_BIND_ADDR")?;

    let storage = build_storage(&settings, Arc::new(DefaultClock))
        .await
        .wrap_err("failed to prepare storage")?;
    let config = ServerConfig::new(session.key, session.cookie_secure, session.same_site, bind_addr)
        .with_storage(storage);

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).wrap_err("failed to start server")?;
    server.await.wrap_err("server terminated")
}
