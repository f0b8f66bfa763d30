// Adapters layer: concrete object-storage backends.

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

pub use local::LocalClient;
#[cfg(feature = "s3")]
pub use s3::S3Client;

use crate::config::{BackendKind, StoreConfig};
use crate::domain::ports::ObjectClient;
use crate::utils::error::Result;
use std::sync::Arc;

/// Build the backend client selected by `config.backend`.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn ObjectClient>> {
    match config.backend {
        #[cfg(feature = "s3")]
        BackendKind::S3 => {
            let settings = config.s3_settings()?;
            Ok(Arc::new(S3Client::from_settings(settings).await))
        }
        #[cfg(not(feature = "s3"))]
        BackendKind::S3 => Err(crate::utils::error::StoreError::ConfigError {
            message: "S3 backend requires the `s3` feature".to_string(),
        }),
        BackendKind::Local => {
            let settings = config.local_settings()?;
            Ok(Arc::new(LocalClient::new(settings.root.clone())))
        }
    }
}
