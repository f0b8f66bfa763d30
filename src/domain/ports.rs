use crate::domain::model::Headers;
use crate::utils::error::ClientError;
use async_trait::async_trait;
use std::path::Path;
use std::pin::Pin;
use tokio::io::AsyncRead;

/// Streaming body of a fetched object.
pub type ObjectBody = Pin<Box<dyn AsyncRead + Send>>;

/// Object-storage primitives the adapter is built on.
///
/// The put calls resolve to the HTTP status the backend answered with;
/// `Err` is reserved for failures where no usable answer arrived.
#[async_trait]
pub trait ObjectClient: Send + Sync {
    fn name(&self) -> &'static str;

    async fn put_file(
        &self,
        src: &Path,
        dest: &str,
        headers: &Headers,
    ) -> Result<u16, ClientError>;

    async fn put_buffer(
        &self,
        content: Vec<u8>,
        dest: &str,
        headers: &Headers,
    ) -> Result<u16, ClientError>;

    async fn get_object(&self, path: &str) -> Result<ObjectBody, ClientError>;

    async fn delete_object(&self, path: &str) -> Result<(), ClientError>;
}
