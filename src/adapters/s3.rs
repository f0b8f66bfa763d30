use crate::config::S3Settings;
use crate::domain::model::Headers;
use crate::domain::ports::{ObjectBody, ObjectClient};
use crate::utils::error::ClientError;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::interceptors::BeforeDeserializationInterceptorContextRef;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{ConfigBag, Credentials, Intercept, Region, RuntimeComponents};
use aws_sdk_s3::error::{BoxError, DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::put_object::builders::PutObjectFluentBuilder;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::StorageClass;
use aws_sdk_s3::Client;
use std::path::Path;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

const CREDENTIALS_SOURCE: &str = "registry-s3-store";

/// Object client for a single S3 (or S3-compatible) bucket.
#[derive(Debug, Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
}

impl S3Client {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build the SDK client. Static keys are used when both are set, the
    /// default AWS credential chain otherwise.
    pub async fn from_settings(settings: &S3Settings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .retry_config(RetryConfig::standard().with_max_attempts(settings.max_attempts));

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&settings.access_key_id, &settings.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key_id.clone(),
                secret_access_key.clone(),
                None,
                None,
                CREDENTIALS_SOURCE,
            ));
        }

        if let Some(endpoint) = &settings.endpoint {
            loader = loader.endpoint_url(endpoint.clone());
        }

        let shared = loader.load().await;
        let config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(settings.force_path_style)
            .build();

        tracing::debug!(
            bucket = %settings.bucket,
            region = %settings.region,
            endpoint = ?settings.endpoint,
            "Created S3 client"
        );
        Self::new(Client::from_conf(config), settings.bucket.clone())
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn send_put(
        &self,
        request: PutObjectFluentBuilder,
        headers: &Headers,
    ) -> Result<u16, ClientError> {
        let recorder = StatusRecorder::default();
        let result = apply_headers(request, headers)
            .customize()
            .interceptor(recorder.clone())
            .send()
            .await;

        match result {
            // The SDK resolves Ok for any 2xx, so report the status actually received.
            Ok(_) => recorder.status().ok_or_else(|| ClientError::Transport {
                message: "no response status received".to_string(),
            }),
            Err(SdkError::ServiceError(ctx)) => Ok(ctx.raw().status().as_u16()),
            Err(err) => Err(classify(err)),
        }
    }
}

/// Records the HTTP status of the last response seen for one request.
#[derive(Debug, Clone, Default)]
struct StatusRecorder {
    status: Arc<AtomicU16>,
}

impl StatusRecorder {
    fn status(&self) -> Option<u16> {
        match self.status.load(Ordering::SeqCst) {
            0 => None,
            status => Some(status),
        }
    }
}

impl Intercept for StatusRecorder {
    fn name(&self) -> &'static str {
        "StatusRecorder"
    }

    fn read_before_deserialization(
        &self,
        context: &BeforeDeserializationInterceptorContextRef<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> Result<(), BoxError> {
        self.status
            .store(context.response().status().as_u16(), Ordering::SeqCst);
        Ok(())
    }
}

fn apply_headers(mut request: PutObjectFluentBuilder, headers: &Headers) -> PutObjectFluentBuilder {
    for (name, value) in headers {
        let lower = name.to_ascii_lowercase();
        request = match lower.as_str() {
            "x-amz-storage-class" => request.storage_class(StorageClass::from(value.as_str())),
            "content-type" => request.content_type(value),
            "content-encoding" => request.content_encoding(value),
            "content-disposition" => request.content_disposition(value),
            "cache-control" => request.cache_control(value),
            other => match other.strip_prefix("x-amz-meta-") {
                Some(meta_key) => request.metadata(meta_key, value),
                None => {
                    tracing::warn!(header = %name, "Ignoring unsupported upload header");
                    request
                }
            },
        };
    }
    request
}

fn classify<E>(err: SdkError<E, HttpResponse>) -> ClientError
where
    E: std::error::Error + 'static,
{
    let message = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::ServiceError(ctx) => ClientError::Status {
            status: ctx.raw().status().as_u16(),
            message,
        },
        SdkError::ResponseError(ctx) => ClientError::Status {
            status: ctx.raw().status().as_u16(),
            message,
        },
        SdkError::ConstructionFailure(_) => ClientError::Request { message },
        _ => ClientError::Transport { message },
    }
}

#[async_trait]
impl ObjectClient for S3Client {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn put_file(
        &self,
        src: &Path,
        dest: &str,
        headers: &Headers,
    ) -> Result<u16, ClientError> {
        let body = ByteStream::from_path(src)
            .await
            .map_err(|e| ClientError::Io(std::io::Error::other(e)))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(dest)
            .body(body);
        self.send_put(request, headers).await
    }

    async fn put_buffer(
        &self,
        content: Vec<u8>,
        dest: &str,
        headers: &Headers,
    ) -> Result<u16, ClientError> {
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(dest)
            .body(ByteStream::from(content));
        self.send_put(request, headers).await
    }

    async fn get_object(&self, path: &str) -> Result<ObjectBody, ClientError> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await;

        match result {
            Ok(output) => Ok(Box::pin(output.body.into_async_read())),
            Err(SdkError::ServiceError(ctx))
                if ctx.err().is_no_such_key() || ctx.raw().status().as_u16() == 404 =>
            {
                Err(ClientError::NotFound {
                    path: path.to_string(),
                })
            }
            Err(err) => Err(classify(err)),
        }
    }

    async fn delete_object(&self, path: &str) -> Result<(), ClientError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map(|_| ())
            .map_err(classify)
    }
}
