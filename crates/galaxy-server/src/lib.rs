//! # galaxy-server
//!
//! HTTP composition root for the Galaxy backend's shared infrastructure: one
//! ID generator and one token authorizer per process, both built from
//! [`ServerConfig`] and handed to request handlers through [`AppState`].
//!
//! ## Modules
//!
//! - [`config`] - CLI/environment configuration and validation.
//! - [`telemetry`] - `tracing` subscriber setup.
//! - [`state`] - Shared application state and the cache backend switch.
//! - [`middleware`] - Required and optional bearer-token authorization.
//! - [`handlers`] / [`routes`] - The HTTP surface.
//! - [`error`] - Mapping of domain failures to HTTP responses.
//!
//! [`ServerConfig`]: config::ServerConfig
//! [`AppState`]: state::AppState

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telemetry;
