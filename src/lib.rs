pub mod config;
pub mod db;
pub mod dictation;
pub mod error;
pub mod identity;
pub mod llm;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
