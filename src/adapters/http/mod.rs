//! HTTP adapters - REST client for the SYD backend.
//!
//! `HttpBackendClient` implements every backend port over reqwest; `dto`
//! holds the wire shapes and their conversion to domain types.

mod client;
mod dto;

pub use client::{HttpBackendClient, HttpBackendConfig};
