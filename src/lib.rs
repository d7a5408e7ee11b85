pub mod config;
pub mod fulfillment;
pub mod handlers;
pub mod i18n;
pub mod mail;
pub mod models;
pub mod routes;
pub mod store;
pub mod utils;
