use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

mod config;
mod controllers;
mod events;
mod identity;
mod models;
mod notes;
mod object_store;

use config::{Config, ObjectStoreKind};
use events::{EventPublisher, HttpEventPublisher, LogEventPublisher};
use notes::NoteStore;
use object_store::{FsObjectStore, MemoryObjectStore, ObjectStore};

pub struct AppState {
    pub config: Config,
    pub notes: Arc<NoteStore>,
    /// Used directly by handlers for read-side events; the note store
    /// publishes its own mutation events.
    pub publisher: Arc<dyn EventPublisher>,
}

async fn build_object_store(config: &Config) -> std::io::Result<Arc<dyn ObjectStore>> {
    match config.object_store {
        ObjectStoreKind::Fs => {
            let store = FsObjectStore::new(&config.bucket_dir)
                .await
                .map_err(|e| std::io::Error::other(format!("Failed to open bucket directory: {}", e)))?;
            log::info!("Object store: filesystem bucket at {}", config.bucket_dir.display());
            Ok(Arc::new(store))
        }
        ObjectStoreKind::Memory => {
            log::warn!("Object store: in-memory, notes will not survive a restart");
            Ok(Arc::new(MemoryObjectStore::new()))
        }
    }
}

fn build_publisher(config: &Config) -> Arc<dyn EventPublisher> {
    match &config.events_url {
        Some(url) => {
            let publisher = HttpEventPublisher::new(url);
            log::info!("Publishing note events to {}", publisher.endpoint());
            Arc::new(publisher)
        }
        None => {
            log::info!("NOTES_EVENTS_URL not set, note events will only be logged");
            Arc::new(LogEventPublisher)
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    log::info!("notes-backend v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    let port = config.port;

    let objects = build_object_store(&config).await?;
    let publisher = build_publisher(&config);
    log::info!("Index write mode: {}", config.index_write_mode);
    let note_store = Arc::new(NoteStore::new(
        objects,
        Arc::clone(&publisher),
        config.index_write_mode,
    ));

    match &config.acting_user {
        Some(user) => log::info!("Requests without {} act as \"{}\"", identity::USER_ID_HEADER, user),
        None => log::info!("Requests without {} are rejected", identity::USER_ID_HEADER),
    }

    let state = web::Data::new(AppState {
        config,
        notes: note_store,
        publisher,
    });

    log::info!("Starting notes server on port {}", port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config_routes)
            .configure(controllers::notes::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
