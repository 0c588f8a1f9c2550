use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use log::{info, warn};
use sqlx::postgres::PgPoolOptions;

use taskwarden::config::Config;
use taskwarden::routes::{self, health};
use taskwarden::store::{MemoryAccountStore, MemoryTaskStore, PgAccountStore, PgTaskStore};
use taskwarden::AppState;

async fn build_state(config: &Config) -> io::Result<AppState> {
    let Some(database_url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL not set, using in-memory stores; data is lost on restart");
        return Ok(AppState::new(
            config,
            Arc::new(MemoryAccountStore::new()),
            Arc::new(MemoryTaskStore::new()),
        ));
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("database connect: {e}")))?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("migrations: {e}")))?;
    info!("Connected to database, migrations applied");

    Ok(AppState::new(
        config,
        Arc::new(PgAccountStore::new(pool.clone())),
        Arc::new(PgTaskStore::new(pool)),
    ))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
    let state = build_state(&config).await?;

    info!("Starting taskwarden server at {}", config.server_url());
    HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(|cfg| state.register(cfg))
            .service(health::health)
            .service(web::scope("/api").configure(routes::config))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
