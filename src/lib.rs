pub mod auction;
pub mod auth;
pub mod card;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod query;
pub mod routes;
pub mod state;
pub mod upload;
