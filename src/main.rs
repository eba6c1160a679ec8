use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;
use log::{error, info};

use busflow::auth::TokenKeys;
use busflow::config::{Config, StoreKind};
use busflow::db::{MemoryStore, MongoDB, Store};
use busflow::handlers;
use busflow::service::Service;
use busflow::state::AppState;

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
    error!("{}: {}", context, err);
    io::Error::new(io::ErrorKind::Other, format!("{}: {}", context, err))
}

async fn open_store(config: &Config) -> io::Result<Arc<dyn Store>> {
    match config.store {
        StoreKind::Mongo => {
            let db = MongoDB::new(&config.mongodb_uri, &config.database_name)
                .await
                .map_err(|e| startup_error("Failed to connect to MongoDB", e))?;
            db.ensure_indexes()
                .await
                .map_err(|e| startup_error("Failed to create indexes", e))?;
            info!("Using MongoDB database '{}'", config.database_name);
            Ok(Arc::new(db))
        }
        StoreKind::Memory => {
            info!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| startup_error("Invalid configuration", e))?;
    let store = open_store(&config).await?;
    let tokens = TokenKeys::new(config.jwt_secret.clone(), config.token_ttl_hours);
    let service = Service::new(store, tokens, config.bcrypt_cost);

    if let Some(admin) = &config.admin {
        service
            .ensure_admin(admin)
            .await
            .map_err(|e| startup_error("Failed to create admin account", e))?;
    }
    if config.seed_data || config.force_seed {
        service
            .seed_data(config.force_seed)
            .await
            .map_err(|e| startup_error("Failed to seed sample data", e))?;
    }

    let data = web::Data::new(AppState::new(service));
    info!("Starting server at http://{}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .configure(handlers::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
