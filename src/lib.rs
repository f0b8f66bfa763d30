pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{BackendKind, S3Settings, StoreConfig};

#[cfg(feature = "s3")]
pub use adapters::S3Client;
pub use adapters::LocalClient;
pub use core::StorageAdapter;
pub use domain::model::{UploadDescriptor, UploadResult};
pub use domain::ports::{ObjectBody, ObjectClient};
pub use utils::error::{ClientError, Result, StoreError};
