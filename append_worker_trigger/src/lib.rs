pub mod config;
pub mod handler;
pub mod model;
pub mod service;
pub mod user_data;
