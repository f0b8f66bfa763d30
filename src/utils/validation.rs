use crate::utils::error::{Result, StoreError};
use url::Url;

/// Storage classes accepted by S3 for `x-amz-storage-class`.
pub const S3_STORAGE_CLASSES: &[&str] = &[
    "STANDARD",
    "REDUCED_REDUNDANCY",
    "STANDARD_IA",
    "ONEZONE_IA",
    "INTELLIGENT_TIERING",
    "GLACIER",
    "GLACIER_IR",
    "DEEP_ARCHIVE",
    "OUTPOSTS",
    "SNOW",
    "EXPRESS_ONEZONE",
];

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> StoreError {
    StoreError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

pub fn validate_s3_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    if bucket_name.is_empty() {
        return Err(invalid(
            field_name,
            bucket_name,
            "S3 bucket name cannot be empty",
        ));
    }

    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        return Err(invalid(
            field_name,
            bucket_name,
            "S3 bucket name must be between 3 and 63 characters",
        ));
    }

    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(invalid(
            field_name,
            bucket_name,
            "S3 bucket name can only contain lowercase letters, numbers, hyphens, and dots",
        ));
    }

    if bucket_name.starts_with('-') || bucket_name.ends_with('-') {
        return Err(invalid(
            field_name,
            bucket_name,
            "S3 bucket name cannot start or end with a hyphen",
        ));
    }

    Ok(())
}

pub fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    validate_non_empty_string(field_name, region)?;

    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(invalid(
            field_name,
            region,
            "AWS region can only contain lowercase letters, numbers, and hyphens",
        ));
    }

    Ok(())
}

pub fn validate_storage_class(field_name: &str, storage_class: &str) -> Result<()> {
    if !S3_STORAGE_CLASSES.contains(&storage_class) {
        return Err(invalid(
            field_name,
            storage_class,
            format!(
                "Unknown storage class. Allowed values: {}",
                S3_STORAGE_CLASSES.join(", ")
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("endpoint", "https://s3.example.com").is_ok());
        assert!(validate_url("endpoint", "http://127.0.0.1:9000").is_ok());
        assert!(validate_url("endpoint", "").is_err());
        assert!(validate_url("endpoint", "invalid-url").is_err());
        assert!(validate_url("endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_s3_bucket_name() {
        assert!(validate_s3_bucket_name("bucket", "cnpm-packages").is_ok());
        assert!(validate_s3_bucket_name("bucket", "ab").is_err());
        assert!(validate_s3_bucket_name("bucket", "Packages").is_err());
        assert!(validate_s3_bucket_name("bucket", "-packages").is_err());
    }

    #[test]
    fn test_validate_storage_class() {
        assert!(validate_storage_class("storage_class", "STANDARD_IA").is_ok());
        assert!(validate_storage_class("storage_class", "standard").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("max_attempts", 3u32, 1, 10).is_ok());
        assert!(validate_range("max_attempts", 0u32, 1, 10).is_err());
    }
}
