// src/lib.rs

pub mod backend;
pub mod certificate;
pub mod config;
pub mod error;
pub mod handlers;
pub mod lessons;
pub mod models;
pub mod quiz;
pub mod reporter;
pub mod routes;
pub mod state;
pub mod utils;

pub use routes::create_router;
