use clap::Parser;
use registry_s3_store::config::Command;
use registry_s3_store::utils::{logger, validation::Validate};
use registry_s3_store::{CliConfig, StorageAdapter, StoreConfig, StoreError, UploadDescriptor};
use std::path::Path;

fn load_config(cli: &CliConfig) -> registry_s3_store::Result<StoreConfig> {
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path.display());
            StoreConfig::from_file(path)?
        }
        None => {
            tracing::debug!("No config file given, reading environment");
            StoreConfig::from_env()?
        }
    };
    config.validate()?;
    Ok(config)
}

async fn connect(config: StoreConfig) -> registry_s3_store::Result<StorageAdapter> {
    let adapter = StorageAdapter::connect(config).await?;
    tracing::info!("Using {} backend", adapter.backend_name());
    Ok(adapter)
}

/// Size is informational only; the upload itself reports unreadable files.
async fn file_size(file: &Path) -> Option<u64> {
    match tokio::fs::metadata(file).await {
        Ok(metadata) => Some(metadata.len()),
        Err(e) => {
            tracing::debug!("Could not stat {}: {}", file.display(), e);
            None
        }
    }
}

async fn run(cli: CliConfig) -> registry_s3_store::Result<()> {
    let config = load_config(&cli)?;
    if cli.verbose {
        tracing::debug!("Store config: {:?}", config);
    }

    match cli.command {
        Command::CheckConfig => {
            println!("✅ Configuration is valid ({:?} backend)", config.backend);
        }
        Command::Path { key } => {
            println!(
                "{}",
                registry_s3_store::core::storage_path(&config.folder, &key)
            );
        }
        Command::Upload { file, key } => {
            let adapter = connect(config).await?;
            let mut descriptor = UploadDescriptor::new(key);
            descriptor.size = file_size(&file).await;
            let result = adapter.upload(&file, &descriptor).await?;
            print_result(&result);
        }
        Command::UploadBuffer { file, key } => {
            let content = tokio::fs::read(&file)
                .await
                .map_err(|source| StoreError::LocalReadError {
                    path: file.display().to_string(),
                    source,
                })?;
            let adapter = connect(config).await?;
            let descriptor = UploadDescriptor::new(key).with_size(content.len() as u64);
            let result = adapter.upload_buffer(content, &descriptor).await?;
            print_result(&result);
        }
        Command::Download { key, dest } => {
            connect(config).await?.download(&key, &dest).await?;
            println!("📁 Saved {} to {}", key, dest.display());
        }
        Command::Remove { key } => {
            connect(config).await?.remove(&key).await?;
            println!("🗑️ Removed {}", key);
        }
    }

    Ok(())
}

fn print_result(result: &registry_s3_store::UploadResult) {
    match serde_json::to_string(result) {
        Ok(json) => println!("{}", json),
        Err(_) => println!("{}", result.key),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if let Err(e) = run(cli).await {
        tracing::error!("❌ Operation failed: {}", e);
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    Ok(())
}
