#[cfg(feature = "cli")]
pub mod cli;
pub mod store;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command};
pub use store::{BackendKind, LocalSettings, S3Settings, StoreConfig};
