use crate::core::ConfigProvider;
use crate::utils::error::{ExperimentError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ExperimentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ExperimentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number<T>(field_name: &str, value: T, min_value: T) -> Result<()>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min_value {
        return Err(ExperimentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_file_extension(field_name: &str, file: &str, extension: &str) -> Result<()> {
    match std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(ext) if ext.eq_ignore_ascii_case(extension) => Ok(()),
        Some(ext) => Err(ExperimentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!("Unsupported file extension: {}. Expected: {}", ext, extension),
        }),
        None => Err(ExperimentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ExperimentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
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
        return Err(ExperimentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_unique_names<'a>(
    field_name: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        validate_non_empty_string(field_name, name)?;
        if !seen.insert(name) {
            return Err(ExperimentError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: name.to_string(),
                reason: "Names must be unique".to_string(),
            });
        }
    }
    Ok(())
}

/// Checks shared by every experiment configuration source.
pub fn validate_experiment<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    if config.circles().is_empty() {
        return Err(ExperimentError::MissingConfigError {
            field: "circles".to_string(),
        });
    }
    if config.regions().is_empty() {
        return Err(ExperimentError::MissingConfigError {
            field: "regions".to_string(),
        });
    }
    validate_unique_names("regions.name", config.regions().iter().map(|r| r.name.as_str()))?;

    let sweep = config.sweep();
    validate_positive_number("sweep.start", sweep.start, 1)?;
    validate_positive_number("sweep.step", sweep.step, 1)?;
    validate_range("sweep.end", sweep.end, sweep.start, u64::MAX)?;

    validate_positive_number("workers", config.workers(), 1)?;

    let exact = config.exact_area();
    if !exact.is_finite() || exact <= 0.0 {
        return Err(ExperimentError::InvalidConfigValueError {
            field: "exact_area".to_string(),
            value: exact.to_string(),
            reason: "Reference area must be a positive finite number".to_string(),
        });
    }

    validate_path("output_path", config.output_path())?;
    if config.output_formats().is_empty() {
        return Err(ExperimentError::MissingConfigError {
            field: "output_formats".to_string(),
        });
    }
    if let Some(archive) = config.archive_name() {
        validate_path("archive", archive)?;
        validate_file_extension("archive", archive, "zip")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output_path", "./output").is_ok());
        assert!(validate_path("output_path", "").is_err());
        assert!(validate_path("output_path", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("workers", 5usize, 1).is_ok());
        assert!(validate_positive_number("workers", 0usize, 1).is_err());
        assert!(validate_positive_number("sweep.step", 0u64, 1).is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension("archive", "results.zip", "zip").is_ok());
        assert!(validate_file_extension("archive", "results.ZIP", "zip").is_ok());
        assert!(validate_file_extension("archive", "results.tar", "zip").is_err());
        assert!(validate_file_extension("archive", "results", "zip").is_err());
    }

    #[test]
    fn test_validate_unique_names() {
        assert!(validate_unique_names("regions.name", ["wide", "narrow"]).is_ok());
        assert!(validate_unique_names("regions.name", ["wide", "wide"]).is_err());
        assert!(validate_unique_names("regions.name", ["wide", "  "]).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("sweep.end", 10u64, 5, 20).is_ok());
        assert!(validate_range("sweep.end", 4u64, 5, 20).is_err());
    }
}
