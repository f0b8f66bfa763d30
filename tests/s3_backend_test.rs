#![cfg(feature = "s3")]

use httpmock::prelude::*;
use registry_s3_store::{S3Settings, StorageAdapter, StoreConfig, StoreError, UploadDescriptor};
use tempfile::TempDir;

const BUCKET: &str = "cnpm-packages";

const ACCESS_DENIED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>AccessDenied</Code><Message>Access Denied</Message><RequestId>4442587FB7D0A2F9</RequestId></Error>"#;

const NO_SUCH_KEY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>NoSuchKey</Code><Message>The specified key does not exist.</Message><Key>pkgs/missing</Key><RequestId>4442587FB7D0A2F9</RequestId></Error>"#;

fn settings(endpoint: String) -> S3Settings {
    let mut settings = S3Settings::new(BUCKET);
    settings.endpoint = Some(endpoint);
    settings.access_key_id = Some("AKIDEXAMPLE".to_string());
    settings.secret_access_key = Some("wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string());
    settings.force_path_style = true;
    settings
}

async fn adapter(endpoint: String, storage_class: Option<&str>) -> StorageAdapter {
    let mut config = StoreConfig::s3("pkgs", settings(endpoint));
    if let Some(storage_class) = storage_class {
        config = config.with_storage_class(storage_class);
    }
    StorageAdapter::connect(config).await.unwrap()
}

fn tarball(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("pkg-1.0.0.tgz");
    std::fs::write(&path, b"fake tarball bytes").unwrap();
    path
}

#[tokio::test]
async fn test_upload_sends_storage_class() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    let put_mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/cnpm-packages/pkgs/lodash-4.17.21.tgz")
                .header("x-amz-storage-class", "STANDARD_IA");
            then.status(200).header("ETag", "\"d41d8cd98f00b204e9800998ecf8427e\"");
        })
        .await;

    let adapter = adapter(server.base_url(), Some("STANDARD_IA")).await;
    let result = adapter
        .upload(
            tarball(&temp_dir),
            &UploadDescriptor::new("lodash-4.17.21.tgz"),
        )
        .await
        .unwrap();

    assert_eq!(result.key, "lodash-4.17.21.tgz");
    put_mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_buffer_sends_gzip_without_storage_class() {
    let server = MockServer::start_async().await;
    let put_mock = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/cnpm-packages/pkgs/a-b_c")
                .header("content-type", "application/x-gzip")
                .matches(|req| {
                    req.headers.as_ref().map_or(true, |headers| {
                        headers
                            .iter()
                            .all(|(name, _)| !name.eq_ignore_ascii_case("x-amz-storage-class"))
                    })
                });
            then.status(200);
        })
        .await;

    let adapter = adapter(server.base_url(), Some("STANDARD_IA")).await;
    let result = adapter
        .upload_buffer(b"gzip bytes".to_vec(), &UploadDescriptor::new("a/b\\c"))
        .await
        .unwrap();

    assert_eq!(result.key, "a/b\\c");
    put_mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_buffer_no_content_answer_is_rejected() {
    let server = MockServer::start_async().await;
    let put_mock = server
        .mock_async(|when, then| {
            when.method(PUT).path("/cnpm-packages/pkgs/x");
            then.status(204);
        })
        .await;

    let adapter = adapter(server.base_url(), None).await;
    let err = adapter
        .upload_buffer(b"x".to_vec(), &UploadDescriptor::new("x"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::UploadStatusError {
            operation: "put_buffer",
            status: 204
        }
    ));
    put_mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_access_denied_reports_status() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    let put_mock = server
        .mock_async(|when, then| {
            when.method(PUT).path("/cnpm-packages/pkgs/x");
            then.status(403)
                .header("content-type", "application/xml")
                .body(ACCESS_DENIED);
        })
        .await;

    let adapter = adapter(server.base_url(), None).await;
    let err = adapter
        .upload(tarball(&temp_dir), &UploadDescriptor::new("x"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("403"));
    assert_eq!(err.status(), Some(403));
    put_mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_unreachable_endpoint_is_network_error() {
    let temp_dir = TempDir::new().unwrap();
    // Nothing listens on port 1.
    let adapter = adapter("http://127.0.0.1:1".to_string(), None).await;

    let err = adapter
        .upload(tarball(&temp_dir), &UploadDescriptor::new("x"))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Network error"));
    assert!(matches!(err, StoreError::NetworkError { .. }));
}

#[tokio::test]
async fn test_download_writes_body() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    let get_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/cnpm-packages/pkgs/react-18.2.0.tgz");
            then.status(200)
                .header("content-type", "application/x-gzip")
                .body(b"react tarball".to_vec());
        })
        .await;

    let adapter = adapter(server.base_url(), None).await;
    let dest = temp_dir.path().join("react.tgz");
    adapter.download("react-18.2.0.tgz", &dest).await.unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), b"react tarball");
    get_mock.assert_async().await;
}

#[tokio::test]
async fn test_download_missing_key() {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/cnpm-packages/pkgs/missing");
            then.status(404)
                .header("content-type", "application/xml")
                .body(NO_SUCH_KEY);
        })
        .await;

    let adapter = adapter(server.base_url(), None).await;
    let err = adapter
        .download("missing", temp_dir.path().join("missing.tgz"))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_remove_issues_one_delete() {
    let server = MockServer::start_async().await;
    let delete_mock = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/cnpm-packages/pkgs/left-pad-1.3.0.tgz");
            then.status(204);
        })
        .await;

    let adapter = adapter(server.base_url(), None).await;
    adapter.remove("left-pad-1.3.0.tgz").await.unwrap();

    delete_mock.assert_hits_async(1).await;
}
