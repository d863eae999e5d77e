//! API request handlers.

mod health;
mod profile;
mod validate;

pub use health::*;
pub use profile::*;
pub use validate::*;
