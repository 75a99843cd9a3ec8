pub mod authentication;
pub mod database;
pub mod domain;
pub mod email_client;
pub mod error;
pub mod merchant;
pub mod routes;
pub mod session_state;
pub mod settings;
pub mod startup;
pub mod telemetry;
pub mod utils;
