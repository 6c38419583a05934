pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod oauth;
pub mod state;
pub mod students;
pub mod users;
