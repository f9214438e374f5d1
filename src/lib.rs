pub mod app;
pub mod auth;
pub mod config;
pub mod nutrition;
pub mod state;
pub mod trophies;
