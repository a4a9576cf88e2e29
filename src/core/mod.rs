//! Core configuration, constants, error types and collaborator traits.

pub mod constants;
mod config;
mod error;
mod traits;

pub use config::TahoeConfig;
pub use error::{ConfigError, TahoeError, TahoeResult};
pub use traits::{Clock, LossSource};
