//! HTTP server exposing the validation boundary.

pub mod app;
pub mod error;
pub mod handlers;
pub mod state;
