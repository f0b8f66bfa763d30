use crate::domain::model::Headers;
use crate::domain::ports::{ObjectBody, ObjectClient};
use crate::utils::error::ClientError;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Object client backed by a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalClient {
    root: PathBuf,
}

impl LocalClient {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, path: &str) -> Result<PathBuf, ClientError> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(ClientError::Request {
                message: format!("path escapes storage root: {}", path),
            });
        }
        Ok(self.root.join(relative))
    }

    async fn prepare(&self, dest: &str) -> Result<PathBuf, ClientError> {
        let full_path = self.object_path(dest)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(full_path)
    }
}

#[async_trait]
impl ObjectClient for LocalClient {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn put_file(
        &self,
        src: &Path,
        dest: &str,
        headers: &Headers,
    ) -> Result<u16, ClientError> {
        let full_path = self.prepare(dest).await?;
        let copied = fs::copy(src, &full_path).await?;
        tracing::debug!(dest = %full_path.display(), bytes = copied, ?headers, "Stored file");
        Ok(200)
    }

    async fn put_buffer(
        &self,
        content: Vec<u8>,
        dest: &str,
        headers: &Headers,
    ) -> Result<u16, ClientError> {
        let full_path = self.prepare(dest).await?;
        fs::write(&full_path, &content).await?;
        tracing::debug!(dest = %full_path.display(), bytes = content.len(), ?headers, "Stored buffer");
        Ok(200)
    }

    async fn get_object(&self, path: &str) -> Result<ObjectBody, ClientError> {
        let full_path = self.object_path(path)?;
        match fs::File::open(&full_path).await {
            Ok(file) => Ok(Box::pin(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ClientError::NotFound {
                path: path.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    // Missing objects are not an error, matching S3 DeleteObject.
    async fn delete_object(&self, path: &str) -> Result<(), ClientError> {
        let full_path = self.object_path(path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
