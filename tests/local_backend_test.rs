use registry_s3_store::utils::validation::Validate;
use registry_s3_store::{StorageAdapter, StoreConfig, StoreError, UploadDescriptor};
use tempfile::TempDir;

async fn local_adapter(root: &TempDir, folder: &str) -> StorageAdapter {
    let config = StoreConfig::local(folder, root.path().join("store"));
    config.validate().unwrap();
    StorageAdapter::connect(config).await.unwrap()
}

#[tokio::test]
async fn test_upload_buffer_download_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let adapter = local_adapter(&temp_dir, "cnpm/packages").await;
    let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();

    let result = adapter
        .upload_buffer(content.clone(), &UploadDescriptor::new("express/-/express-4.18.2.tgz"))
        .await
        .unwrap();
    assert_eq!(result.key, "express/-/express-4.18.2.tgz");

    let stored = temp_dir
        .path()
        .join("store/cnpm/packages/express---express-4.18.2.tgz");
    assert!(stored.exists());

    let dest = temp_dir.path().join("downloaded.tgz");
    adapter
        .download("express/-/express-4.18.2.tgz", &dest)
        .await
        .unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), content);
}

#[tokio::test]
async fn test_upload_file_then_remove() {
    let temp_dir = TempDir::new().unwrap();
    let adapter = local_adapter(&temp_dir, "pkgs").await;
    let src = temp_dir.path().join("pkg.tgz");
    std::fs::write(&src, b"file contents").unwrap();

    adapter
        .upload(&src, &UploadDescriptor::new("a\\b").with_size(13))
        .await
        .unwrap();
    let stored = temp_dir.path().join("store/pkgs/a_b");
    assert_eq!(std::fs::read(&stored).unwrap(), b"file contents");

    adapter.remove("a\\b").await.unwrap();
    assert!(!stored.exists());

    let err = adapter
        .download("a\\b", temp_dir.path().join("out.tgz"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_download_overwrites_destination() {
    let temp_dir = TempDir::new().unwrap();
    let adapter = local_adapter(&temp_dir, "pkgs").await;
    adapter
        .upload_buffer(b"new".to_vec(), &UploadDescriptor::new("x"))
        .await
        .unwrap();

    let dest = temp_dir.path().join("out.tgz");
    std::fs::write(&dest, b"a much longer previous file").unwrap();
    adapter.download("x", &dest).await.unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), b"new");
}

#[tokio::test]
async fn test_dot_dot_key_is_rejected_by_local_backend() {
    let temp_dir = TempDir::new().unwrap();
    let adapter = local_adapter(&temp_dir, "").await;

    // The key maps to `..`, which the filesystem backend refuses.
    assert_eq!(adapter.storage_path(".."), "..");
    let err = adapter
        .upload_buffer(b"x".to_vec(), &UploadDescriptor::new(".."))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::BackendError(_)));
}
