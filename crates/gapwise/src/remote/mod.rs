//! The validation network boundary: wire types and a blocking client.

mod client;
mod wire;

pub use client::{ClientConfig, ValidationClient};
pub use wire::{
    ErrorResponse, VALIDATE_SERIES_PATH, ValidationRequest, ValidationResponse, WireConfig,
};
