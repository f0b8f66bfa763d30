use crate::config::StoreConfig;
use crate::core::path;
use crate::domain::model::{
    Headers, UploadDescriptor, UploadResult, CONTENT_TYPE_HEADER, GZIP_CONTENT_TYPE,
    STORAGE_CLASS_HEADER,
};
use crate::domain::ports::ObjectClient;
use crate::utils::error::{ClientError, Result, StoreError};
use crate::utils::io::{save_to, SaveError};
use std::path::Path;
use std::sync::Arc;

/// Stores registry tarballs in an object store under a configured folder.
///
/// Every operation issues exactly one request against the backing client and
/// waits for it. Failures are returned to the caller as-is: nothing is retried.
#[derive(Clone)]
pub struct StorageAdapter {
    config: Arc<StoreConfig>,
    client: Arc<dyn ObjectClient>,
}

impl StorageAdapter {
    pub fn new(config: StoreConfig, client: Arc<dyn ObjectClient>) -> Self {
        Self {
            config: Arc::new(config),
            client,
        }
    }

    /// Build the backend client described by `config` and wrap it.
    pub async fn connect(config: StoreConfig) -> Result<Self> {
        let client = crate::adapters::connect(&config).await?;
        Ok(Self::new(config, client))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &'static str {
        self.client.name()
    }

    pub fn storage_path(&self, key: &str) -> String {
        path::storage_path(&self.config.folder, key)
    }

    /// Stream the file at `filepath` to the storage path of `descriptor.key`.
    ///
    /// The configured storage class, if any, is attached to this request.
    pub async fn upload(
        &self,
        filepath: impl AsRef<Path>,
        descriptor: &UploadDescriptor,
    ) -> Result<UploadResult> {
        let dest = self.storage_path(&descriptor.key);

        let mut headers = Headers::new();
        if let Some(storage_class) = &self.config.storage_class {
            headers.insert(STORAGE_CLASS_HEADER.to_string(), storage_class.clone());
        }

        tracing::debug!(
            key = %descriptor.key,
            dest = %dest,
            size = ?descriptor.size,
            source = %filepath.as_ref().display(),
            "Uploading file"
        );
        let outcome = self
            .client
            .put_file(filepath.as_ref(), &dest, &headers)
            .await;
        check_put("put_file", &dest, outcome)?;

        Ok(UploadResult {
            key: descriptor.key.clone(),
        })
    }

    /// Upload `content` from memory as gzip data.
    ///
    /// Unlike [`StorageAdapter::upload`], no storage class is attached.
    pub async fn upload_buffer(
        &self,
        content: impl Into<Vec<u8>>,
        descriptor: &UploadDescriptor,
    ) -> Result<UploadResult> {
        let dest = self.storage_path(&descriptor.key);
        let content = content.into();

        let mut headers = Headers::new();
        headers.insert(
            CONTENT_TYPE_HEADER.to_string(),
            GZIP_CONTENT_TYPE.to_string(),
        );

        tracing::debug!(
            key = %descriptor.key,
            dest = %dest,
            bytes = content.len(),
            "Uploading buffer"
        );
        let outcome = self.client.put_buffer(content, &dest, &headers).await;
        check_put("put_buffer", &dest, outcome)?;

        Ok(UploadResult {
            key: descriptor.key.clone(),
        })
    }

    /// Fetch `key` and write it to `save_path`, replacing any existing file.
    ///
    /// A failure while the body is streaming is a retrieval error and leaves
    /// `save_path` as it was.
    pub async fn download(&self, key: &str, save_path: impl AsRef<Path>) -> Result<()> {
        let src = self.storage_path(key);
        let save_path = save_path.as_ref();

        tracing::debug!(key = %key, src = %src, dest = %save_path.display(), "Downloading object");
        let mut body = self
            .client
            .get_object(&src)
            .await
            .map_err(StoreError::RetrievalError)?;

        let written = save_to(&mut body, save_path)
            .await
            .map_err(|err| match err {
                SaveError::Read(e) => {
                    tracing::warn!(src = %src, "Object body failed mid-stream: {}", e);
                    StoreError::RetrievalError(ClientError::Transport {
                        message: e.to_string(),
                    })
                }
                SaveError::Write(e) => StoreError::LocalWriteError(e),
            })?;
        tracing::debug!(src = %src, bytes = written, "Download complete");
        Ok(())
    }

    /// Delete `key`. Whether a missing object is an error is up to the backend.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let target = self.storage_path(key);

        tracing::debug!(key = %key, target = %target, "Removing object");
        self.client
            .delete_object(&target)
            .await
            .map_err(StoreError::DeletionError)
    }
}

fn check_put(
    operation: &'static str,
    dest: &str,
    outcome: std::result::Result<u16, ClientError>,
) -> Result<()> {
    match outcome {
        Ok(200) => Ok(()),
        Ok(status) => {
            tracing::warn!(dest = %dest, status, "{} rejected by backend", operation);
            Err(StoreError::UploadStatusError { operation, status })
        }
        Err(ClientError::Transport { message }) => {
            tracing::warn!(dest = %dest, "{} transport failure: {}", operation, message);
            Err(StoreError::NetworkError { message })
        }
        Err(err) => Err(StoreError::BackendError(err)),
    }
}
