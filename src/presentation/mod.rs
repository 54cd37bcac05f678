// Presentation layer - HTTP surface and server-rendered views
pub mod app_state;
pub mod handlers;
pub mod routes;
pub mod views;
