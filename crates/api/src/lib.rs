//! HTTP API: configuration, routing, the auth gate, and request/response mapping.

pub mod app;
pub mod authz;
pub mod config;
pub mod context;
pub mod middleware;
