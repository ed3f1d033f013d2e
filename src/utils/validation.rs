use crate::utils::error::{Result, StarmapError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Returns the parsed URL when `location` is an http(s) URL, `None` for plain paths.
pub fn parse_remote_location(field_name: &str, location: &str) -> Result<Option<Url>> {
    if !(location.starts_with("http://") || location.starts_with("https://")) {
        return Ok(None);
    }

    match Url::parse(location) {
        Ok(url) => {
            if url.path_segments().and_then(|mut s| s.next_back()).map_or(true, str::is_empty) {
                return Err(StarmapError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: location.to_string(),
                    reason: "URL must end with a file name".to_string(),
                });
            }
            Ok(Some(url))
        }
        Err(e) => Err(StarmapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: location.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(StarmapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(StarmapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_extension(field_name: &str, path: &str, allowed_extensions: &[&str]) -> Result<()> {
    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension {
        Some(ext) if allowed_extensions.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(StarmapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                ext,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(StarmapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "File has no extension".to_string(),
        }),
    }
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN 也會落入此分支
    if !(value >= min && value <= max) {
        return Err(StarmapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_positive(field_name: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(StarmapError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a positive number".to_string(),
        });
    }
    Ok(())
}

/// Parses `#rrggbb` into its RGB components.
pub fn parse_hex_color(field_name: &str, value: &str) -> Result<(u8, u8, u8)> {
    let invalid = || StarmapError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: "Colors must look like #rrggbb".to_string(),
    };

    let hex = value.strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok((channel(0)?, channel(2)?, channel(4)?))
}
