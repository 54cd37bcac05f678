// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod file_layout_storage;
pub mod http_sensor_repository;
pub mod identity_client;
pub mod layout_writer;
