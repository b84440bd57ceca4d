//! Configuration loading and validation for the client.

mod loader;
mod types;
mod validator;

pub use loader::{ConfigLoader, CONFIG_FILE_NAME};
pub use types::*;
pub use validator::ConfigValidator;
