//! Library crate for party-manager-back, exposing modules for binaries and integration tests.

/// Runtime configuration loaded from `config/app.json`.
pub mod config;
mod dto;
mod error;
/// Access to the network proxy hosting the players.
pub mod proxy;
/// HTTP routers for the party API, SSE stream and docs.
pub mod routes;
/// Operations behind the routes.
pub mod services;
/// Shared application state and the party registry.
pub mod state;
