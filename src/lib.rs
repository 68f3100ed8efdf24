pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod http;
pub mod logger;
pub mod models;
pub mod session;
pub mod tasks;
pub mod token;
