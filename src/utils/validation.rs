use crate::domain::ports::ColumnMapping;
use crate::utils::error::{BurndownError, Result};
use std::collections::HashSet;

pub const SUPPORTED_OUTPUT_FORMATS: [&str; 3] = ["csv", "tsv", "json"];
pub const SUPPORTED_INPUT_EXTENSIONS: [&str; 2] = ["csv", "tsv"];

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(BurndownError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(BurndownError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extensions(field_name: &str, files: &[String], allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        let extension = std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension {
            Some(extension) if allowed_set.contains(extension.as_str()) => {}
            Some(extension) => {
                return Err(BurndownError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(BurndownError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_output_formats(field_name: &str, formats: &[String]) -> Result<()> {
    if formats.is_empty() {
        return Err(BurndownError::MissingConfigError {
            field: field_name.to_string(),
        });
    }

    let mut seen: HashSet<&str> = HashSet::new();
    for format in formats {
        if !SUPPORTED_OUTPUT_FORMATS.contains(&format.as_str()) {
            return Err(BurndownError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    SUPPORTED_OUTPUT_FORMATS.join(", ")
                ),
            });
        }
        if !seen.insert(format.as_str()) {
            return Err(BurndownError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: format.clone(),
                reason: "Format listed more than once".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_archive_name(field_name: &str, name: Option<&str>) -> Result<()> {
    match name {
        Some(name) if !name.ends_with(".zip") || name.len() == ".zip".len() => {
            Err(BurndownError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: name.to_string(),
                reason: "Archive name must be a file name ending in .zip".to_string(),
            })
        }
        _ => Ok(()),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(BurndownError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_columns(field_name: &str, columns: &ColumnMapping) -> Result<()> {
    for column in columns.required() {
        validate_non_empty_string(field_name, column)?;
    }

    let unique: HashSet<&str> = columns.required().into_iter().collect();
    if unique.len() != 3 {
        return Err(BurndownError::ConfigValidationError {
            field: field_name.to_string(),
            message: "The three date columns must have distinct names".to_string(),
        });
    }
    Ok(())
}
