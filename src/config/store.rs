use crate::utils::error::{Result, StoreError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    S3,
    Local,
}

impl std::str::FromStr for BackendKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "s3" => Ok(BackendKind::S3),
            "local" => Ok(BackendKind::Local),
            other => Err(StoreError::InvalidConfigValueError {
                field: "backend".to_string(),
                value: other.to_string(),
                reason: "Backend must be one of: s3, local".to_string(),
            }),
        }
    }
}

/// Adapter configuration. Built once and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: BackendKind,
    /// Prefix every sanitized key is joined onto.
    #[serde(default)]
    pub folder: String,
    /// Sent as `x-amz-storage-class` on file uploads.
    #[serde(default)]
    pub storage_class: Option<String>,
    #[serde(default)]
    pub s3: Option<S3Settings>,
    #[serde(default)]
    pub local: Option<LocalSettings>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct S3Settings {
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint for S3-compatible stores (MinIO, Ceph, ...).
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key_id: Option<String>,
    #[serde(default)]
    pub secret_access_key: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
    /// Attempts per request made by the SDK. 1 disables SDK retries.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

// Keeps the secret key out of logs.
impl fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Settings")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("force_path_style", &self.force_path_style)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalSettings {
    pub root: PathBuf,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl S3Settings {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: default_region(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            force_path_style: false,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl StoreConfig {
    pub fn s3(folder: impl Into<String>, settings: S3Settings) -> Self {
        Self {
            backend: BackendKind::S3,
            folder: folder.into(),
            storage_class: None,
            s3: Some(settings),
            local: None,
        }
    }

    pub fn local(folder: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            backend: BackendKind::Local,
            folder: folder.into(),
            storage_class: None,
            s3: None,
            local: Some(LocalSettings { root: root.into() }),
        }
    }

    pub fn with_storage_class(mut self, storage_class: impl Into<String>) -> Self {
        self.storage_class = Some(storage_class.into());
        self
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| StoreError::ConfigError {
            message: format!("Failed to read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| StoreError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Reads `STORE_*`, `S3_*` and the standard AWS key variables.
    pub fn from_env() -> Result<Self> {
        let backend = match env::var("STORE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => BackendKind::default(),
        };
        let folder = env::var("STORE_FOLDER").unwrap_or_default();
        let storage_class = env::var("STORE_STORAGE_CLASS").ok();

        let mut config = match backend {
            BackendKind::S3 => {
                let bucket = env::var("S3_BUCKET").map_err(|_| StoreError::MissingConfigError {
                    field: "S3_BUCKET".to_string(),
                })?;
                let mut settings = S3Settings::new(bucket);
                if let Ok(region) = env::var("S3_REGION") {
                    settings.region = region;
                }
                settings.endpoint = env::var("S3_ENDPOINT").ok();
                settings.access_key_id = env::var("AWS_ACCESS_KEY_ID").ok();
                settings.secret_access_key = env::var("AWS_SECRET_ACCESS_KEY").ok();
                settings.force_path_style = parse_env("S3_FORCE_PATH_STYLE")?.unwrap_or(false);
                settings.max_attempts =
                    parse_env("S3_MAX_ATTEMPTS")?.unwrap_or(DEFAULT_MAX_ATTEMPTS);
                StoreConfig::s3(folder, settings)
            }
            BackendKind::Local => {
                let root =
                    env::var("STORE_LOCAL_ROOT").map_err(|_| StoreError::MissingConfigError {
                        field: "STORE_LOCAL_ROOT".to_string(),
                    })?;
                StoreConfig::local(folder, root)
            }
        };
        config.storage_class = storage_class;
        Ok(config)
    }

    pub fn s3_settings(&self) -> Result<&S3Settings> {
        self.s3.as_ref().ok_or_else(|| StoreError::MissingConfigError {
            field: "s3".to_string(),
        })
    }

    pub fn local_settings(&self) -> Result<&LocalSettings> {
        self.local
            .as_ref()
            .ok_or_else(|| StoreError::MissingConfigError {
                field: "local".to_string(),
            })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| StoreError::InvalidConfigValueError {
                field: name.to_string(),
                value: raw.clone(),
                reason: "Value could not be parsed".to_string(),
            }),
        Err(_) => Ok(None),
    }
}

/// Replaces `${VAR}` with the value of the environment variable.
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| StoreError::ConfigError {
        message: format!("Invalid substitution pattern: {}", e),
    })?;

    let mut missing = Vec::new();
    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        env::var(var_name).unwrap_or_else(|_| {
            missing.push(var_name.to_string());
            String::new()
        })
    });

    if !missing.is_empty() {
        return Err(StoreError::ConfigError {
            message: format!("Undefined environment variables: {}", missing.join(", ")),
        });
    }

    Ok(result.into_owned())
}

impl Validate for StoreConfig {
    fn validate(&self) -> Result<()> {
        if let Some(storage_class) = &self.storage_class {
            validation::validate_storage_class("storage_class", storage_class)?;
        }

        match self.backend {
            BackendKind::S3 => {
                let s3 = self.s3_settings()?;
                validation::validate_s3_bucket_name("s3.bucket", &s3.bucket)?;
                validation::validate_aws_region("s3.region", &s3.region)?;
                if let Some(endpoint) = &s3.endpoint {
                    validation::validate_url("s3.endpoint", endpoint)?;
                }
                match (&s3.access_key_id, &s3.secret_access_key) {
                    (Some(_), Some(_)) | (None, None) => {}
                    _ => {
                        return Err(StoreError::ConfigError {
                            message: "s3.access_key_id and s3.secret_access_key must be set together"
                                .to_string(),
                        })
                    }
                }
                validation::validate_range("s3.max_attempts", s3.max_attempts, 1, 10)?;
            }
            BackendKind::Local => {
                let local = self.local_settings()?;
                validation::validate_path("local.root", &local.root.to_string_lossy())?;
            }
        }

        tracing::debug!("Store configuration validation passed");
        Ok(())
    }
}
