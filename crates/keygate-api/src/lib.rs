//! Keygate-api: HTTP API layer for Keygate
//!
//! Exposes checkout sessions and event pages to the frontend. The frontend's
//! wallet submits purchases and reports the resulting transaction hash back
//! through the API.

pub mod catalog;
pub mod dto;
pub mod routes;
pub mod server;
pub mod state;
pub mod wallet_bridge;

pub use server::*;
pub use state::{AppState, CheckoutEntry};
