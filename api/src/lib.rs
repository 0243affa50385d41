//! # Verimail API
//!
//! actix-web surface for the verification service. The binary in `main.rs`
//! wires configuration to concrete adapters; everything else lives here so
//! integration tests can build the same application.

pub mod app;
pub mod config;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::{create_app, AppState, SharedVerificationService};
