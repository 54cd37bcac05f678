// Application layer - Use cases and the traits infrastructure implements
pub mod auth_service;
pub mod chart_service;
pub mod identity_provider;
pub mod layout_service;
pub mod layout_storage;
pub mod sensor_repository;
pub mod sensor_service;
pub mod session_store;
