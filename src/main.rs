// Main entry point - Dependency injection and terminal setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::io;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::application::clock::SystemClock;
use crate::application::key_value_store::KeyValueStore;
use crate::application::trip_log_store::TripLogStore;
use crate::infrastructure::config::load_tracker_config;
use crate::infrastructure::file_store::FileKeyValueStore;
use crate::infrastructure::memory_store::MemoryKeyValueStore;
use crate::presentation::console::ConsoleApp;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the form
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = load_tracker_config()?;

    // Storage (infrastructure layer)
    let storage: Arc<dyn KeyValueStore> = if config.storage.in_memory {
        tracing::info!("Using in-memory storage, nothing will be saved");
        Arc::new(MemoryKeyValueStore::new())
    } else {
        tracing::info!("Using storage directory {}", config.storage.data_dir.display());
        Arc::new(FileKeyValueStore::new(config.storage.data_dir.clone()))
    };

    // Store (application layer)
    let store = TripLogStore::open(storage, Arc::new(SystemClock));

    // Terminal form (presentation layer)
    let stdin = io::stdin();
    let mut app = ConsoleApp::new(store, config.export.dir.clone(), stdin.lock(), io::stdout());
    app.run()
}
