//! rx-project: scenario file format and validation.
//!
//! A scenario is read from YAML (`.yaml`, `.yml`) or JSON (`.json`), migrated
//! to [`LATEST_VERSION`] and validated before it is returned.

pub mod migrate;
pub mod schema;
pub mod validate;

pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::*;
pub use validate::{ValidationError, validate_scenario};

use std::path::Path;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("Unsupported file format: {path}")]
    UnsupportedFormat { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

fn format_of(path: &Path) -> ProjectResult<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            Ok(Format::Yaml)
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
        _ => Err(ProjectError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

fn finish(scenario: Scenario) -> ProjectResult<Scenario> {
    let scenario = migrate_to_latest(scenario)?;
    validate_scenario(&scenario)?;
    Ok(scenario)
}

/// Parse, migrate and validate a YAML scenario. Blank input is the default.
pub fn from_yaml_str(content: &str) -> ProjectResult<Scenario> {
    if content.trim().is_empty() {
        return finish(Scenario::default());
    }
    finish(serde_yaml::from_str(content)?)
}

/// Parse, migrate and validate a JSON scenario.
pub fn from_json_str(content: &str) -> ProjectResult<Scenario> {
    finish(serde_json::from_str(content)?)
}

pub fn to_yaml_string(scenario: &Scenario) -> ProjectResult<String> {
    validate_scenario(scenario)?;
    Ok(serde_yaml::to_string(scenario)?)
}

pub fn to_json_string(scenario: &Scenario) -> ProjectResult<String> {
    validate_scenario(scenario)?;
    Ok(serde_json::to_string_pretty(scenario)?)
}

pub fn load_yaml(path: &Path) -> ProjectResult<Scenario> {
    from_yaml_str(&std::fs::read_to_string(path)?)
}

pub fn save_yaml(path: &Path, scenario: &Scenario) -> ProjectResult<()> {
    std::fs::write(path, to_yaml_string(scenario)?)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<Scenario> {
    from_json_str(&std::fs::read_to_string(path)?)
}

pub fn save_json(path: &Path, scenario: &Scenario) -> ProjectResult<()> {
    std::fs::write(path, to_json_string(scenario)?)?;
    Ok(())
}

/// Load a scenario, picking the format from the file extension.
pub fn load(path: &Path) -> ProjectResult<Scenario> {
    match format_of(path)? {
        Format::Yaml => load_yaml(path),
        Format::Json => load_json(path),
    }
}

/// Save a scenario, picking the format from the file extension.
pub fn save(path: &Path, scenario: &Scenario) -> ProjectResult<()> {
    match format_of(path)? {
        Format::Yaml => save_yaml(path, scenario),
        Format::Json => save_json(path, scenario),
    }
}
