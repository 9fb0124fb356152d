//! Reading and writing net descriptions as JSON, RON or YAML. The format is
//! picked from the file extension.
use std::fs;
use std::path::Path;

use ron::ser::PrettyConfig;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::net::model::{ModelError, NetDescription, NetModel};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),
    #[error("ron parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported net description format `{0}` (expected json, ron, yaml or yml)")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Ron,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Ok(Format::Json),
            "ron" => Ok(Format::Ron),
            "yaml" | "yml" => Ok(Format::Yaml),
            _ => Err(IoError::UnsupportedFormat(ext)),
        }
    }

    pub fn render<T: Serialize>(self, value: &T) -> Result<String, IoError> {
        match self {
            Format::Json => Ok(serde_json::to_string_pretty(value)?),
            Format::Ron => {
                let mut pretty = PrettyConfig::default();
                pretty.new_line = "\n".into();
                Ok(ron::ser::to_string_pretty(value, pretty)?)
            }
            Format::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }

    pub fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, IoError> {
        match self {
            Format::Json => Ok(serde_json::from_str(content)?),
            Format::Ron => Ok(ron::from_str(content)?),
            Format::Yaml => Ok(serde_yaml::from_str(content)?),
        }
    }
}

pub fn read_description<P: AsRef<Path>>(path: P) -> Result<NetDescription, IoError> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    let content = fs::read_to_string(path)?;
    format.parse(&content)
}

/// Reads and validates a net in one step.
pub fn read_model<P: AsRef<Path>>(path: P) -> Result<NetModel, IoError> {
    let description = read_description(path)?;
    Ok(NetModel::from_description(&description)?)
}

pub fn write_description<P: AsRef<Path>>(
    path: P,
    description: &NetDescription,
) -> Result<(), IoError> {
    let path = path.as_ref();
    let content = Format::from_path(path)?.render(description)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::model::ArcKind;

    const JSON: &str = r#"{
        "name": "demo",
        "places": [ { "name": "A", "marking": 1 }, { "name": "B" } ],
        "transitions": [ { "name": "T" } ],
        "arcs": [
            { "source": "A", "target": "T" },
            { "source": "B", "target": "T", "kind": "inhibitor" }
        ]
    }"#;

    #[test]
    fn parses_json_with_defaults() {
        let description: NetDescription = Format::Json.parse(JSON).unwrap();
        assert_eq!(description.places[1].marking, 0);
        assert_eq!(description.arcs[0].kind, ArcKind::Normal);
        assert_eq!(description.arcs[1].kind, ArcKind::Inhibitor);
    }

    #[test]
    fn all_formats_agree() {
        let description: NetDescription = Format::Json.parse(JSON).unwrap();
        for format in [Format::Json, Format::Ron, Format::Yaml] {
            let text = format.render(&description).unwrap();
            let back: NetDescription = format.parse(&text).unwrap();
            assert_eq!(back, description, "{format:?}");
        }
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(Format::from_path(Path::new("n.YML")).unwrap(), Format::Yaml);
        assert!(matches!(
            Format::from_path(Path::new("n.pnml")),
            Err(IoError::UnsupportedFormat(ext)) if ext == "pnml"
        ));
    }
}
