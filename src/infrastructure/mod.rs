// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod csv_export;
pub mod file_store;
pub mod memory_store;
pub mod snapshot_mapper;
