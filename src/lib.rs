pub mod cloud;
pub mod config;
pub mod core;
pub mod domain;
pub mod provider;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use config::ProviderConfig;
pub use core::{EdgeCloud, ServiceClient};
pub use provider::EdgeCenterProvider;
pub use utils::error::{EdgeError, Result};
