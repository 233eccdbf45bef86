//! Loading spec documents from text and files.

use std::fmt;
use std::path::Path;

use openws_core::JsonValue;
use openws_core::logging::{debug, targets};

use crate::spec::{DocumentError, SpecDocument};

/// Serialization format of a spec document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpecFormat {
    /// JSON (the default).
    #[default]
    Json,
    /// YAML.
    Yaml,
    /// TOML.
    Toml,
}

impl SpecFormat {
    /// Picks a format from a file extension, falling back to JSON.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => SpecFormat::Yaml,
            Some("toml") => SpecFormat::Toml,
            _ => SpecFormat::Json,
        }
    }
}

impl std::str::FromStr for SpecFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            _ => Err(format!("Unknown format: {s}. Expected: json, yaml, toml")),
        }
    }
}

/// Failure to load a spec document.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The text is not valid JSON.
    Json(serde_json::Error),
    /// The text is not valid YAML.
    Yaml(serde_yaml::Error),
    /// The text is not valid TOML.
    Toml(toml::de::Error),
    /// The text parsed but is not a valid spec document.
    Document(DocumentError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "I/O error: {e}"),
            LoadError::Json(e) => write!(f, "JSON error: {e}"),
            LoadError::Yaml(e) => write!(f, "YAML error: {e}"),
            LoadError::Toml(e) => write!(f, "TOML error: {e}"),
            LoadError::Document(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Json(e) => Some(e),
            LoadError::Yaml(e) => Some(e),
            LoadError::Toml(e) => Some(e),
            LoadError::Document(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Io(err)
    }
}

impl From<DocumentError> for LoadError {
    fn from(err: DocumentError) -> Self {
        LoadError::Document(err)
    }
}

/// Parses text into an untyped JSON value without validating it.
pub fn parse_value(text: &str, format: SpecFormat) -> Result<JsonValue, LoadError> {
    match format {
        SpecFormat::Json => serde_json::from_str(text).map_err(LoadError::Json),
        SpecFormat::Yaml => serde_yaml::from_str(text).map_err(LoadError::Yaml),
        SpecFormat::Toml => toml::from_str(text).map_err(LoadError::Toml),
    }
}

/// Parses and validates a spec document from text.
pub fn load_spec_str(text: &str, format: SpecFormat) -> Result<SpecDocument, LoadError> {
    let value = parse_value(text, format)?;
    Ok(SpecDocument::from_value(value)?)
}

/// Reads, parses and validates a spec document from a file.
///
/// The format is chosen by extension (see [`SpecFormat::from_path`]).
pub fn load_spec_file(path: impl AsRef<Path>) -> Result<SpecDocument, LoadError> {
    let path = path.as_ref();
    let format = SpecFormat::from_path(path);
    debug!(target: targets::SPEC, "loading {} as {:?}", path.display(), format);
    let text = std::fs::read_to_string(path)?;
    load_spec_str(&text, format)
}
